//! Application state shared by the render loop, transport and console

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::info;

use crate::config::Config;
use crate::hud::HudRenderer;
use crate::input::KeyboardState;
use crate::util::time::session_millis;
use crate::video::{feed_for, VideoPipe};
use crate::ws::protocol::{ClientAction, GameStateSnapshot};
use crate::ws::Transport;

use super::session::LocalSession;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub transport: Arc<Transport>,
    pub session: Arc<Mutex<LocalSession>>,
    pub hud: Arc<Mutex<HudRenderer>>,
    pub keyboard: Arc<Mutex<KeyboardState>>,
    pub video: Arc<VideoPipe>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);

        let transport = Arc::new(Transport::new(
            config.server_url.clone(),
            config.reconnect_delay,
        ));
        let video = feed_for(config.frame_output.as_deref());

        Self {
            config,
            transport,
            session: Arc::new(Mutex::new(LocalSession::new())),
            hud: Arc::new(Mutex::new(HudRenderer::new())),
            keyboard: Arc::new(Mutex::new(KeyboardState::new())),
            video: Arc::new(VideoPipe::new(video)),
        }
    }

    /// Install a new server state
    pub fn apply_game_state(&self, state: GameStateSnapshot) {
        let mut session = self.session.lock();
        if session.apply_state(state) {
            if session.is_my_turn() {
                info!("Your turn: controller uplink active");
            } else {
                info!("Turn over: controller uplink idle");
            }
        }
    }

    /// Join the pilot queue. Falls back to PLAYER_NAME, then "Anonymous".
    pub fn join_queue(&self, name: Option<&str>) -> bool {
        let requested = name
            .filter(|n| !n.trim().is_empty())
            .or(self.config.player_name.as_deref())
            .unwrap_or("");
        let name = self.session.lock().set_name(requested).to_string();
        info!(name = %name, "Joining queue");
        self.transport.send_action(&ClientAction::JoinQueue { name })
    }

    pub fn stop_game(&self) -> bool {
        self.transport.send_action(&ClientAction::StopGame)
    }

    pub fn add_score(&self, score: i64) -> bool {
        self.transport.send_action(&ClientAction::AddScore { score })
    }

    /// Fire-rate gated shot at the current session time
    pub fn attempt_fire(&self) -> bool {
        self.hud.lock().attempt_fire(session_millis())
    }
}
