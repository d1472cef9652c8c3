//! Builders shared by tests

use std::time::Duration;

use crate::config::Config;

use super::AppState;

pub fn test_app() -> AppState {
    test_app_with("ws://127.0.0.1:1/ws/client", Duration::from_millis(2000))
}

pub fn test_app_with(url: &str, reconnect_delay: Duration) -> AppState {
    AppState::new(Config {
        server_url: url.to_string(),
        log_level: "debug".to_string(),
        player_name: None,
        reconnect_delay,
        frame_rate: 60,
        frame_output: None,
    })
}
