//! Fire-rate gate and the visual effects of an accepted shot

/// Weapon class cooldowns, keyed by magazine size
pub const INTERCEPTOR_MAX_AMMO: u32 = 60;
pub const JUGGERNAUT_MAX_AMMO: u32 = 10;

pub const INTERCEPTOR_COOLDOWN_MS: u64 = 200;
pub const JUGGERNAUT_COOLDOWN_MS: u64 = 1000;
pub const DEFAULT_COOLDOWN_MS: u64 = 500;

/// Length of the screen shake on an accepted shot
pub const SHAKE_DURATION_MS: u64 = 100;

/// Cooldown for the weapon class implied by `max_ammo`
pub fn cooldown_for_max_ammo(max_ammo: u32) -> u64 {
    match max_ammo {
        INTERCEPTOR_MAX_AMMO => INTERCEPTOR_COOLDOWN_MS,
        JUGGERNAUT_MAX_AMMO => JUGGERNAUT_COOLDOWN_MS,
        _ => DEFAULT_COOLDOWN_MS,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Ready,
    CoolingDown,
}

/// Minimum spacing between accepted shots. There is no timer: the
/// cooldown is checked when the next shot is attempted.
#[derive(Debug, Clone)]
pub struct FireGate {
    last_fire_ms: Option<u64>,
    cooldown_ms: u64,
}

impl FireGate {
    pub fn new(cooldown_ms: u64) -> Self {
        Self {
            last_fire_ms: None,
            cooldown_ms,
        }
    }

    pub fn cooldown_ms(&self) -> u64 {
        self.cooldown_ms
    }

    pub fn set_cooldown_ms(&mut self, cooldown_ms: u64) {
        self.cooldown_ms = cooldown_ms;
    }

    pub fn last_fire_ms(&self) -> Option<u64> {
        self.last_fire_ms
    }

    pub fn state(&self, now_ms: u64) -> GateState {
        match self.last_fire_ms {
            Some(last) if now_ms.saturating_sub(last) < self.cooldown_ms => GateState::CoolingDown,
            _ => GateState::Ready,
        }
    }

    /// Accept the shot if ammo is left and the cooldown has fully elapsed.
    /// A shot exactly `cooldown_ms` after the previous one is accepted.
    pub fn try_fire(&mut self, now_ms: u64, ammo: u32) -> bool {
        if self.state(now_ms) == GateState::CoolingDown || ammo == 0 {
            return false;
        }
        self.last_fire_ms = Some(now_ms);
        true
    }
}

impl Default for FireGate {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN_MS)
    }
}

/// Cooldown bar: reset to empty on a shot, filling linearly for the cooldown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownFill {
    pub started_ms: u64,
    pub duration_ms: u64,
}

impl CooldownFill {
    /// Fill percent at `now_ms`, 0..=100
    pub fn percent(&self, now_ms: u64) -> f32 {
        if self.duration_ms == 0 {
            return 100.0;
        }
        let elapsed = now_ms.saturating_sub(self.started_ms) as f32;
        (elapsed / self.duration_ms as f32 * 100.0).min(100.0)
    }
}

/// One-shot effects played on every accepted shot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FireEffects {
    /// Bumped per shot; a presenter replays the flash when it changes
    pub muzzle_flash_seq: u64,
    /// Screen shake runs until this instant
    pub shake_until_ms: Option<u64>,
}

impl FireEffects {
    pub fn trigger(&mut self, now_ms: u64) {
        self.muzzle_flash_seq += 1;
        self.shake_until_ms = Some(now_ms + SHAKE_DURATION_MS);
    }

    pub fn is_shaking(&self, now_ms: u64) -> bool {
        self.shake_until_ms.is_some_and(|until| now_ms < until)
    }
}
