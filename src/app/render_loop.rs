//! Per-frame task: sample input, refresh the HUD, uplink on our turn

use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

use crate::hud::{InputShape, PanelChange};
use crate::input::{ControllerSnapshot, GamepadSource, InputSampler, InputSource};
use crate::util::time::frame_interval;

use super::AppState;

/// What one frame did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    pub source: InputSource,
    pub panel: PanelChange,
    /// Snapshot went out on the socket
    pub sent: bool,
}

pub struct RenderLoop {
    app: AppState,
    sampler: InputSampler,
    /// Created once, rewritten in place every frame
    snapshot: ControllerSnapshot,
}

impl RenderLoop {
    pub fn new(app: AppState, gamepad: Box<dyn GamepadSource>) -> Self {
        let sampler = InputSampler::new(gamepad, app.keyboard.clone());
        Self {
            app,
            sampler,
            snapshot: ControllerSnapshot::neutral(),
        }
    }

    pub fn snapshot(&self) -> &ControllerSnapshot {
        &self.snapshot
    }

    /// Run one frame. Sampling and HUD work happen even while disconnected.
    pub fn tick(&mut self) -> FrameReport {
        let source = self.sampler.sample(&mut self.snapshot);

        let (latest, my_turn) = {
            let session = self.app.session.lock();
            (session.latest(), session.is_my_turn())
        };

        let panel = self
            .app
            .hud
            .lock()
            .update(latest.as_deref(), InputShape::RawBytes(&self.snapshot));
        if panel == PanelChange::Rebuilt {
            debug!("Enemy panel rebuilt");
        }

        let sent = my_turn && self.app.transport.send_controller(&self.snapshot);

        FrameReport { source, panel, sent }
    }

    /// Tick at the configured frame rate forever. Late ticks are skipped.
    pub async fn run(mut self) {
        let mut ticker = interval(frame_interval(self.app.config.frame_rate));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            self.tick();
        }
    }
}
