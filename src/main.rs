//! Pilot Client - player side of the remote pilot arcade
//!
//! This is the main entry point for the client. It handles:
//! - The WebSocket link to the game server (state, video, reconnects)
//! - Sampling keyboard/gamepad input into the 8-byte controller snapshot
//! - Keeping the HUD and lobby view models current
//! - A console for joining the queue, firing and driving the keyboard

mod app;
mod config;
mod console;
mod hud;
mod input;
mod util;
mod video;
mod ws;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::{AppState, RenderLoop};
use crate::config::Config;
use crate::input::{GamepadSource, NoGamepad};
use crate::util::time::init_session_clock;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config.log_level);

    // Fire gate and effects run on the session clock
    init_session_clock();

    info!("Starting Pilot Client");
    info!("Game server: {}", config.server_url);

    let state = AppState::new(config);

    // Video writer task: frames are displayed off the socket reader
    let video_handle = tokio::spawn(state.video.clone().run());

    // Transport task: connect, dispatch, reconnect
    let transport = state.transport.clone();
    let transport_handle = tokio::spawn(transport.run(state.clone()));

    // Render loop task: sample input, update HUD, uplink on our turn
    let gamepad = select_gamepad(state.config.frame_rate).await;
    let render_loop = RenderLoop::new(state.clone(), gamepad);
    let render_handle = tokio::spawn(render_loop.run());

    if let Some(name) = state.config.player_name.as_deref() {
        info!("Type `join` to enter the queue as {}", name);
    }

    tokio::select! {
        _ = console::run(state.clone()) => {
            info!("Quit requested");
        }
        _ = shutdown_signal() => {}
    }

    render_handle.abort();
    transport_handle.abort();
    video_handle.abort();

    info!("Client shutdown complete");
    Ok(())
}

/// Physical gamepad when one can be polled, keyboard emulation otherwise
#[cfg(feature = "gamepad")]
async fn select_gamepad(frame_rate: u32) -> Box<dyn GamepadSource> {
    use crate::input::GilrsGamepad;
    use crate::util::time::frame_interval;

    match GilrsGamepad::spawn(frame_interval(frame_rate)).await {
        Ok(pad) => {
            info!("Gamepad input enabled");
            Box::new(pad)
        }
        Err(e) => {
            warn!(error = %e, "Gamepad input unavailable, using keyboard only");
            Box::new(NoGamepad)
        }
    }
}

#[cfg(not(feature = "gamepad"))]
async fn select_gamepad(_frame_rate: u32) -> Box<dyn GamepadSource> {
    warn!("Built without the `gamepad` feature, using keyboard only");
    Box::new(NoGamepad)
}

/// Initialize tracing/logging
fn init_tracing(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        }
    }
}
