//! Combat HUD: ammo counter, enemy panel, speedometer and fire effects

use tracing::debug;

use crate::input::snapshot::{ControllerSnapshot, AXIS_NEUTRAL};
use crate::ws::protocol::{EnemyStatus, GameStateSnapshot};

use super::fire::{cooldown_for_max_ammo, CooldownFill, FireEffects, FireGate};

/// At or below this many rounds the counter turns red
pub const LOW_AMMO_THRESHOLD: u32 = 5;

/// Magazine size assumed when the server omits it
pub const DEFAULT_MAX_AMMO: u32 = 30;

/// Per-update smoothing factor of the speedometer
pub const SPEED_SMOOTHING: f32 = 0.1;

/// Input as the HUD receives it
#[derive(Debug, Clone, Copy)]
pub enum InputShape<'a> {
    /// The controller snapshot as sent to the vehicle
    RawBytes(&'a ControllerSnapshot),
    /// Native gamepad axes in [-1, 1]
    AxesVector(&'a [f32]),
}

impl InputShape<'_> {
    /// (forward, turn) magnitudes on a 0..=127 scale
    fn magnitudes(&self) -> (f32, f32) {
        match self {
            Self::RawBytes(snap) => (
                (snap.axis(1) as f32 - AXIS_NEUTRAL as f32).abs(),
                (snap.axis(0) as f32 - AXIS_NEUTRAL as f32).abs(),
            ),
            Self::AxesVector(axes) => {
                let axis = |i: usize| axes.get(i).copied().unwrap_or(0.0);
                ((axis(1) * 127.0).abs(), (axis(0) * 127.0).abs())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AmmoIndicator {
    pub current: u32,
    pub max: u32,
    /// Zero-padded to two digits
    pub text: String,
    /// e.g. "/ 30"
    pub max_text: String,
    pub low: bool,
}

impl Default for AmmoIndicator {
    fn default() -> Self {
        Self {
            current: 0,
            max: 0,
            text: "00".to_string(),
            max_text: String::new(),
            low: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnemyRow {
    pub id: String,
    pub name: String,
    pub hp_text: String,
    /// Health bar fill, 0..=100
    pub bar_percent: f32,
}

impl EnemyRow {
    fn build(enemy: &EnemyStatus) -> Self {
        Self {
            id: enemy.id.clone(),
            name: enemy.name.clone(),
            hp_text: hp_text(enemy),
            bar_percent: health_percent(enemy.hp, enemy.max_hp),
        }
    }

    /// In-place refresh only touches the health fields
    fn refresh(&mut self, enemy: &EnemyStatus) {
        self.hp_text = hp_text(enemy);
        self.bar_percent = health_percent(enemy.hp, enemy.max_hp);
    }
}

fn hp_text(enemy: &EnemyStatus) -> String {
    format!("{}/{}", enemy.hp, enemy.max_hp)
}

/// `hp / max_hp * 100` clamped to 0..=100; an empty pool reads 0
pub fn health_percent(hp: u32, max_hp: u32) -> f32 {
    if max_hp == 0 {
        return 0.0;
    }
    (hp as f32 / max_hp as f32 * 100.0).clamp(0.0, 100.0)
}

/// What happened to the enemy panel during an update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelChange {
    Rebuilt,
    UpdatedInPlace,
    Untouched,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Speedometer {
    /// Smoothed speed, never snapped
    pub speed: f32,
}

impl Speedometer {
    pub fn step(&mut self, input: InputShape<'_>) {
        let (forward, turn) = input.magnitudes();
        let target = ((forward + turn) / 1.2).min(100.0);
        self.speed += (target - self.speed) * SPEED_SMOOTHING;
    }

    /// Displayed value, floored
    pub fn text(&self) -> String {
        (self.speed.floor() as i64).to_string()
    }

    pub fn bar_percent(&self) -> f32 {
        self.speed.min(100.0)
    }
}

/// Everything the combat HUD shows
#[derive(Debug, Clone, Default)]
pub struct HudView {
    pub ammo: AmmoIndicator,
    pub enemies: Vec<EnemyRow>,
    pub speedometer: Speedometer,
    pub cooldown: Option<CooldownFill>,
    pub effects: FireEffects,
}

/// Owns the HUD view and the fire gate that depends on it
#[derive(Debug, Default)]
pub struct HudRenderer {
    view: HudView,
    gate: FireGate,
}

impl HudRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> &HudView {
        &self.view
    }

    pub fn cooldown_ms(&self) -> u64 {
        self.gate.cooldown_ms()
    }

    /// Apply the latest game state (if any) and local input
    pub fn update(&mut self, state: Option<&GameStateSnapshot>, input: InputShape<'_>) -> PanelChange {
        let mut panel = PanelChange::Untouched;

        if let Some(state) = state {
            if let Some(ammo) = state.ammo {
                self.update_ammo(ammo, state.max_ammo);
            }
            if let Some(enemies) = &state.enemies {
                panel = self.update_enemies(enemies);
            }
        }

        self.view.speedometer.step(input);
        panel
    }

    fn update_ammo(&mut self, ammo: u32, max_ammo: Option<u32>) {
        let max = max_ammo.filter(|&m| m > 0).unwrap_or(DEFAULT_MAX_AMMO);
        let cooldown = cooldown_for_max_ammo(max);
        if cooldown != self.gate.cooldown_ms() {
            debug!(max_ammo = max, cooldown_ms = cooldown, "Weapon cooldown changed");
        }
        self.gate.set_cooldown_ms(cooldown);

        self.view.ammo = AmmoIndicator {
            current: ammo,
            max,
            text: format!("{:02}", ammo),
            max_text: format!("/ {}", max),
            low: ammo <= LOW_AMMO_THRESHOLD,
        };
    }

    fn update_enemies(&mut self, enemies: &[EnemyStatus]) -> PanelChange {
        if self.view.enemies.len() != enemies.len() {
            self.view.enemies = enemies.iter().map(EnemyRow::build).collect();
            return PanelChange::Rebuilt;
        }

        // Matched by position, not by id
        for (row, enemy) in self.view.enemies.iter_mut().zip(enemies) {
            row.refresh(enemy);
        }
        PanelChange::UpdatedInPlace
    }

    /// Try to fire with the client-predicted ammo count. Ammo is not
    /// decremented here; the next server state carries the real count.
    pub fn attempt_fire(&mut self, now_ms: u64) -> bool {
        if !self.gate.try_fire(now_ms, self.view.ammo.current) {
            return false;
        }

        self.view.cooldown = Some(CooldownFill {
            started_ms: now_ms,
            duration_ms: self.gate.cooldown_ms(),
        });
        self.view.effects.trigger(now_ms);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_ammo(ammo: u32, max_ammo: Option<u32>) -> GameStateSnapshot {
        GameStateSnapshot {
            ammo: Some(ammo),
            max_ammo,
            ..Default::default()
        }
    }

    fn enemy(id: &str, hp: u32) -> EnemyStatus {
        EnemyStatus {
            id: id.to_string(),
            name: id.to_string(),
            hp,
            max_hp: 100,
        }
    }

    fn with_enemies(enemies: Vec<EnemyStatus>) -> GameStateSnapshot {
        GameStateSnapshot {
            enemies: Some(enemies),
            ..Default::default()
        }
    }

    fn idle() -> ControllerSnapshot {
        ControllerSnapshot::neutral()
    }

    #[test]
    fn ammo_text_and_low_warning() {
        let mut hud = HudRenderer::new();
        let input = idle();

        hud.update(Some(&with_ammo(3, Some(30))), InputShape::RawBytes(&input));
        assert_eq!(hud.view().ammo.text, "03");
        assert!(hud.view().ammo.low);

        hud.update(Some(&with_ammo(6, Some(30))), InputShape::RawBytes(&input));
        assert_eq!(hud.view().ammo.text, "06");
        assert!(!hud.view().ammo.low);
        assert_eq!(hud.view().ammo.max_text, "/ 30");

        hud.update(Some(&with_ammo(5, None)), InputShape::RawBytes(&input));
        assert!(hud.view().ammo.low);
        assert_eq!(hud.view().ammo.max, DEFAULT_MAX_AMMO);
    }

    #[test]
    fn loadout_change_updates_cooldown_live() {
        let mut hud = HudRenderer::new();
        let input = idle();

        hud.update(Some(&with_ammo(60, Some(60))), InputShape::RawBytes(&input));
        assert_eq!(hud.cooldown_ms(), 200);
        hud.update(Some(&with_ammo(10, Some(10))), InputShape::RawBytes(&input));
        assert_eq!(hud.cooldown_ms(), 1000);
        hud.update(Some(&with_ammo(10, Some(0))), InputShape::RawBytes(&input));
        assert_eq!(hud.cooldown_ms(), 500);
    }

    #[test]
    fn state_without_ammo_keeps_previous_counter() {
        let mut hud = HudRenderer::new();
        let input = idle();
        hud.update(Some(&with_ammo(12, Some(30))), InputShape::RawBytes(&input));
        hud.update(Some(&GameStateSnapshot::default()), InputShape::RawBytes(&input));
        hud.update(None, InputShape::RawBytes(&input));
        assert_eq!(hud.view().ammo.text, "12");
    }

    #[test]
    fn enemy_panel_rebuilds_only_on_count_change() {
        let mut hud = HudRenderer::new();
        let input = idle();

        let change = hud.update(
            Some(&with_enemies(vec![enemy("ALPHA", 100), enemy("BRAVO", 80)])),
            InputShape::RawBytes(&input),
        );
        assert_eq!(change, PanelChange::Rebuilt);

        // Same count: rows keep their identity and only health moves
        let change = hud.update(
            Some(&with_enemies(vec![enemy("CHARLIE", 40), enemy("BRAVO", 80)])),
            InputShape::RawBytes(&input),
        );
        assert_eq!(change, PanelChange::UpdatedInPlace);
        let rows = &hud.view().enemies;
        assert_eq!(rows[0].id, "ALPHA");
        assert_eq!(rows[0].hp_text, "40/100");
        assert_eq!(rows[0].bar_percent, 40.0);

        let change = hud.update(
            Some(&with_enemies(vec![enemy("A", 1), enemy("B", 2), enemy("C", 3)])),
            InputShape::RawBytes(&input),
        );
        assert_eq!(change, PanelChange::Rebuilt);
        assert_eq!(hud.view().enemies[2].id, "C");

        let change = hud.update(Some(&GameStateSnapshot::default()), InputShape::RawBytes(&input));
        assert_eq!(change, PanelChange::Untouched);
        assert_eq!(hud.view().enemies.len(), 3);
    }

    #[test]
    fn health_percent_is_clamped() {
        assert_eq!(health_percent(50, 200), 25.0);
        assert_eq!(health_percent(0, 100), 0.0);
        assert_eq!(health_percent(150, 100), 100.0);
        assert_eq!(health_percent(10, 0), 0.0);
    }

    #[test]
    fn speed_eases_toward_target() {
        let mut speedo = Speedometer::default();
        let axes = [0.0, 1.0];
        // |1.0 * 127| / 1.2 is past the cap, so the target is 100
        speedo.step(InputShape::AxesVector(&axes));
        assert!((speedo.speed - 10.0).abs() < 1e-4);
        assert_eq!(speedo.text(), "10");

        speedo.step(InputShape::AxesVector(&axes));
        assert!((speedo.speed - 19.0).abs() < 1e-4);

        for _ in 0..500 {
            speedo.step(InputShape::AxesVector(&axes));
        }
        assert!(speedo.speed <= 100.0);
        assert_eq!(speedo.bar_percent(), speedo.speed.min(100.0));
    }

    #[test]
    fn raw_bytes_measure_from_center() {
        let mut hud = HudRenderer::new();
        let mut input = idle();
        input.set_axis(0, 127 + 24);
        input.set_axis(1, 127 - 36);
        // (36 + 24) / 1.2 = 50, one step gives 5
        hud.update(None, InputShape::RawBytes(&input));
        assert!((hud.view().speedometer.speed - 5.0).abs() < 1e-4);
    }

    #[test]
    fn short_axes_vector_reads_missing_as_zero() {
        let mut speedo = Speedometer::default();
        speedo.step(InputShape::AxesVector(&[]));
        assert_eq!(speedo.speed, 0.0);
    }

    #[test]
    fn fire_starts_cooldown_and_effects() {
        let mut hud = HudRenderer::new();
        let input = idle();
        hud.update(Some(&with_ammo(1, Some(30))), InputShape::RawBytes(&input));

        assert!(hud.attempt_fire(10_000));
        let view = hud.view();
        assert_eq!(view.cooldown, Some(CooldownFill { started_ms: 10_000, duration_ms: 500 }));
        assert_eq!(view.effects.muzzle_flash_seq, 1);

        assert!(!hud.attempt_fire(10_499));
        assert_eq!(hud.view().effects.muzzle_flash_seq, 1);
        assert!(hud.attempt_fire(10_500));
        assert_eq!(hud.view().effects.muzzle_flash_seq, 2);
    }

    #[test]
    fn no_ammo_no_fire() {
        let mut hud = HudRenderer::new();
        assert!(!hud.attempt_fire(0));
        assert!(hud.view().cooldown.is_none());
        assert_eq!(hud.view().effects, FireEffects::default());
    }
}
