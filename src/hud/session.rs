//! Lobby and session panel: pilot status, queue, buttons and leaderboard

use crate::ws::protocol::GameStateSnapshot;

/// Names shown in the queue preview
pub const QUEUE_PREVIEW_LEN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerStatus {
    Piloting,
    /// 1-based queue position
    InQueue(usize),
    Spectating,
}

impl PlayerStatus {
    pub fn label(&self) -> String {
        match self {
            Self::Piloting => "PILOTING".to_string(),
            Self::InQueue(pos) => format!("IN QUEUE (#{})", pos),
            Self::Spectating => "SPECTATING".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinButton {
    pub label: &'static str,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueInfo {
    pub count: usize,
    pub preview: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardRow {
    pub rank: usize,
    pub name: String,
    pub score: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaderboardView {
    /// "No records yet"
    Empty,
    Rows(Vec<LeaderboardRow>),
}

/// Derived lobby view for one game state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub timer_text: String,
    pub score_text: String,
    pub pilot_name: String,
    pub is_my_turn: bool,
    pub status: PlayerStatus,
    /// Abort button and debug scoring controls
    pub pilot_controls_visible: bool,
    pub join_button: JoinButton,
    pub name_input_enabled: bool,
    pub start_panel_visible: bool,
    pub game_panel_visible: bool,
    pub queue: Option<QueueInfo>,
    pub leaderboard: LeaderboardView,
}

impl SessionView {
    /// Build the view for `local_name`; with no name set we are never the
    /// pilot and never in the queue
    pub fn render(state: &GameStateSnapshot, local_name: Option<&str>) -> Self {
        let is_my_turn = local_name.is_some_and(|name| state.is_piloted_by(name));
        let queue_position = local_name.and_then(|name| state.queue_position(name));

        let status = match (is_my_turn, queue_position) {
            (true, _) => PlayerStatus::Piloting,
            (false, Some(pos)) => PlayerStatus::InQueue(pos),
            (false, None) => PlayerStatus::Spectating,
        };

        let join_button = if queue_position.is_some() {
            JoinButton { label: "WAITING FOR TURN...", enabled: false }
        } else {
            JoinButton { label: "JOIN MISSION QUEUE", enabled: true }
        };

        let name_input_enabled = queue_position.is_none() && !(state.active && is_my_turn);

        let (start_panel_visible, game_panel_visible) = if state.active {
            (!is_my_turn, true)
        } else {
            (true, false)
        };

        Self {
            timer_text: state.time_left.to_string(),
            score_text: state.score.to_string(),
            pilot_name: state.player.clone().unwrap_or_else(|| "None".to_string()),
            is_my_turn,
            status,
            pilot_controls_visible: is_my_turn,
            join_button,
            name_input_enabled,
            start_panel_visible,
            game_panel_visible,
            queue: queue_info(&state.queue),
            leaderboard: leaderboard(state),
        }
    }
}

fn queue_info(queue: &[String]) -> Option<QueueInfo> {
    if queue.is_empty() {
        return None;
    }

    let mut preview = queue
        .iter()
        .take(QUEUE_PREVIEW_LEN)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if queue.len() > QUEUE_PREVIEW_LEN {
        preview.push_str("...");
    }

    Some(QueueInfo { count: queue.len(), preview })
}

fn leaderboard(state: &GameStateSnapshot) -> LeaderboardView {
    if state.leaderboard.is_empty() {
        return LeaderboardView::Empty;
    }
    LeaderboardView::Rows(
        state
            .leaderboard
            .iter()
            .enumerate()
            .map(|(i, entry)| LeaderboardRow {
                rank: i + 1,
                name: entry.name.clone(),
                score: entry.score,
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ws::protocol::LeaderboardEntry;

    fn state(active: bool, player: Option<&str>, queue: &[&str]) -> GameStateSnapshot {
        GameStateSnapshot {
            active,
            time_left: 45,
            score: 300,
            player: player.map(str::to_string),
            queue: queue.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn piloting() {
        let view = SessionView::render(&state(true, Some("Goose"), &[]), Some("Goose"));
        assert!(view.is_my_turn);
        assert_eq!(view.status.label(), "PILOTING");
        assert!(view.pilot_controls_visible);
        assert!(!view.start_panel_visible);
        assert!(view.game_panel_visible);
        assert!(!view.name_input_enabled);
        assert_eq!(view.timer_text, "45");
        assert_eq!(view.score_text, "300");
    }

    #[test]
    fn waiting_in_queue() {
        let view = SessionView::render(&state(true, Some("Viper"), &["Iceman", "Goose"]), Some("Goose"));
        assert!(!view.is_my_turn);
        assert_eq!(view.status, PlayerStatus::InQueue(2));
        assert_eq!(view.status.label(), "IN QUEUE (#2)");
        assert_eq!(view.join_button, JoinButton { label: "WAITING FOR TURN...", enabled: false });
        assert!(!view.name_input_enabled);
        assert!(view.start_panel_visible);
        assert!(!view.pilot_controls_visible);
        assert_eq!(view.pilot_name, "Viper");
    }

    #[test]
    fn spectating_an_idle_lobby() {
        let view = SessionView::render(&state(false, None, &[]), Some("Goose"));
        assert_eq!(view.status.label(), "SPECTATING");
        assert_eq!(view.pilot_name, "None");
        assert!(view.join_button.enabled);
        assert!(view.name_input_enabled);
        assert!(view.start_panel_visible);
        assert!(!view.game_panel_visible);
        assert!(view.queue.is_none());
        assert_eq!(view.leaderboard, LeaderboardView::Empty);
    }

    #[test]
    fn inactive_game_is_never_my_turn() {
        let view = SessionView::render(&state(false, Some("Goose"), &[]), Some("Goose"));
        assert!(!view.is_my_turn);
    }

    #[test]
    fn no_local_name_never_matches_an_empty_pilot() {
        let view = SessionView::render(&state(true, Some(""), &[""]), None);
        assert!(!view.is_my_turn);
        assert_eq!(view.status, PlayerStatus::Spectating);
        assert!(!view.pilot_controls_visible);
        assert!(view.join_button.enabled);
        assert!(view.start_panel_visible);
    }

    #[test]
    fn queue_preview_truncates() {
        let view = SessionView::render(&state(true, Some("X"), &["A", "B", "C"]), Some("Z"));
        assert_eq!(view.queue, Some(QueueInfo { count: 3, preview: "A, B, C".to_string() }));

        let view = SessionView::render(&state(true, Some("X"), &["A", "B", "C", "D"]), Some("Z"));
        assert_eq!(view.queue, Some(QueueInfo { count: 4, preview: "A, B, C...".to_string() }));
    }

    #[test]
    fn leaderboard_ranks_in_order() {
        let mut s = state(false, None, &[]);
        s.leaderboard = vec![
            LeaderboardEntry { name: "Viper".into(), score: 900 },
            LeaderboardEntry { name: "Goose".into(), score: 400 },
        ];
        let LeaderboardView::Rows(rows) = SessionView::render(&s, Some("Goose")).leaderboard else {
            panic!("expected rows");
        };
        assert_eq!(rows[1], LeaderboardRow { rank: 2, name: "Goose".into(), score: 400 });
    }
}
