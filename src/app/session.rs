//! Local session: who we are and what the server last told us

use std::sync::Arc;

use crate::hud::SessionView;
use crate::ws::protocol::GameStateSnapshot;

/// Name used when the player joins without typing one
pub const ANONYMOUS_NAME: &str = "Anonymous";

#[derive(Debug, Default)]
pub struct LocalSession {
    name: Option<String>,
    latest: Option<Arc<GameStateSnapshot>>,
    view: Option<SessionView>,
}

impl LocalSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Record the pilot name as typed; empty or blank names become
    /// "Anonymous". The server matches names exactly, so no trimming.
    pub fn set_name(&mut self, name: &str) -> &str {
        let name = if name.trim().is_empty() { ANONYMOUS_NAME } else { name };
        self.name = Some(name.to_string());
        self.refresh_view();
        self.name.as_deref().unwrap_or(ANONYMOUS_NAME)
    }

    /// Replace the game state wholesale. Returns true when turn ownership flipped.
    pub fn apply_state(&mut self, state: GameStateSnapshot) -> bool {
        let was_my_turn = self.is_my_turn();
        self.latest = Some(Arc::new(state));
        self.refresh_view();
        was_my_turn != self.is_my_turn()
    }

    pub fn latest(&self) -> Option<Arc<GameStateSnapshot>> {
        self.latest.clone()
    }

    pub fn view(&self) -> Option<&SessionView> {
        self.view.as_ref()
    }

    /// Active run whose pilot is us
    pub fn is_my_turn(&self) -> bool {
        match (&self.latest, &self.name) {
            (Some(state), Some(name)) => state.is_piloted_by(name),
            _ => false,
        }
    }

    fn refresh_view(&mut self) {
        self.view = self
            .latest
            .as_deref()
            .map(|state| SessionView::render(state, self.name.as_deref()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn piloted_by(player: &str, active: bool) -> GameStateSnapshot {
        GameStateSnapshot {
            active,
            player: Some(player.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn turn_needs_a_name_and_an_active_run() {
        let mut session = LocalSession::new();
        session.apply_state(piloted_by("", true));
        assert!(!session.is_my_turn());

        session.set_name("Goose");
        assert!(!session.is_my_turn());

        assert!(session.apply_state(piloted_by("Goose", true)));
        assert!(session.is_my_turn());
        assert!(session.view().unwrap().is_my_turn);

        assert!(session.apply_state(piloted_by("Goose", false)));
        assert!(!session.is_my_turn());
    }

    #[test]
    fn state_is_replaced_not_merged() {
        let mut session = LocalSession::new();
        session.apply_state(GameStateSnapshot {
            ammo: Some(9),
            queue: vec!["Goose".into()],
            ..Default::default()
        });
        session.apply_state(GameStateSnapshot::default());
        let latest = session.latest().unwrap();
        assert!(latest.ammo.is_none());
        assert!(latest.queue.is_empty());
    }

    #[test]
    fn blank_name_is_anonymous() {
        let mut session = LocalSession::new();
        assert_eq!(session.set_name("   "), ANONYMOUS_NAME);
        assert_eq!(session.set_name(" Iceman "), " Iceman ");

        // the untrimmed name is the one the server reports back as pilot
        session.apply_state(piloted_by(" Iceman ", true));
        assert!(session.is_my_turn());
    }

    #[test]
    fn empty_pilot_name_is_not_us_before_joining() {
        let mut session = LocalSession::new();
        session.apply_state(GameStateSnapshot {
            active: true,
            player: Some(String::new()),
            queue: vec![String::new()],
            ..Default::default()
        });
        assert!(!session.is_my_turn());

        let view = session.view().unwrap();
        assert!(!view.is_my_turn);
        assert!(!view.pilot_controls_visible);
        assert_eq!(view.status.label(), "SPECTATING");
    }
}
