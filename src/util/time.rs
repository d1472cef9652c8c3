//! Time utilities for the render loop and fire gate

use std::time::{Duration, Instant};

/// Client start time, the zero point of the session clock
static SESSION_START: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

/// Initialize session start time (call once at startup)
pub fn init_session_clock() {
    SESSION_START.get_or_init(Instant::now);
}

/// Milliseconds since the session clock started (monotonic)
pub fn session_millis() -> u64 {
    SESSION_START
        .get_or_init(Instant::now)
        .elapsed()
        .as_millis() as u64
}

/// Highest accepted render loop rate (ticks per second)
pub const MAX_FRAME_RATE: u32 = 1000;

/// Duration of one render loop tick at the given frame rate. The rate is
/// clamped to `1..=MAX_FRAME_RATE`, so the interval is never zero.
pub fn frame_interval(frame_rate: u32) -> Duration {
    Duration::from_micros(1_000_000 / frame_rate.clamp(1, MAX_FRAME_RATE) as u64)
}
