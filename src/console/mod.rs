//! Console driver: stdin commands for the lobby, weapon and keyboard

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::app::AppState;
use crate::hud::session::LeaderboardView;
use crate::input::Key;
use crate::util::time::session_millis;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Join the queue, optionally under a new name
    Join(Option<String>),
    Stop,
    Score(i64),
    Fire,
    Press(Key),
    Release(Key),
    Status,
    Quit,
}

/// Parse one console line; blank lines are `None`
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "join" => Command::Join(Some(rest.to_string()).filter(|r| !r.is_empty())),
        "stop" => Command::Stop,
        "score" => Command::Score(
            rest.parse()
                .map_err(|_| CommandError::InvalidScore(rest.to_string()))?,
        ),
        "fire" => Command::Fire,
        "press" => Command::Press(parse_key(rest)?),
        "release" => Command::Release(parse_key(rest)?),
        "status" => Command::Status,
        "quit" | "exit" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

fn parse_key(name: &str) -> Result<Key, CommandError> {
    Key::from_name(name).ok_or_else(|| CommandError::UnknownKey(name.to_string()))
}

/// Run a command. Returns false when the client should exit.
pub fn execute(app: &AppState, command: Command) -> bool {
    match command {
        Command::Join(name) => {
            if !app.join_queue(name.as_deref()) {
                warn!("Not connected, join request dropped");
            }
        }
        Command::Stop => {
            app.stop_game();
        }
        Command::Score(points) => {
            app.add_score(points);
        }
        Command::Fire => {
            let fired = app.attempt_fire();
            info!(fired, "Fire");
        }
        Command::Press(key) => app.keyboard.lock().press(key),
        Command::Release(key) => app.keyboard.lock().release(key),
        Command::Status => log_status(app),
        Command::Quit => return false,
    }
    true
}

fn log_status(app: &AppState) {
    info!(connection = app.transport.state().label(), "Status");

    if let Some(view) = app.session.lock().view() {
        info!(
            status = %view.status.label(),
            pilot = %view.pilot_name,
            time_left = %view.timer_text,
            score = %view.score_text,
            "Session"
        );
        if let Some(queue) = &view.queue {
            info!(count = queue.count, names = %queue.preview, "Queue");
        }
        match &view.leaderboard {
            LeaderboardView::Empty => info!("Leaderboard: No records yet"),
            LeaderboardView::Rows(rows) => {
                for row in rows {
                    info!(rank = row.rank, name = %row.name, score = row.score, "Leaderboard");
                }
            }
        }
    }

    let hud = app.hud.lock();
    let view = hud.view();
    let now = session_millis();
    info!(
        ammo = %view.ammo.text,
        max = %view.ammo.max_text,
        low_ammo = view.ammo.low,
        speed = %view.speedometer.text(),
        cooldown_pct = view.cooldown.map(|c| c.percent(now)).unwrap_or(100.0),
        "HUD"
    );
    for enemy in &view.enemies {
        info!(id = %enemy.id, name = %enemy.name, hp = %enemy.hp_text, "Enemy");
    }
}

/// Read commands from stdin until `quit`. If stdin closes the console goes
/// quiet and the client keeps running.
pub async fn run(app: AppState) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match parse_command(&line) {
                Ok(Some(command)) => {
                    if !execute(&app, command) {
                        return;
                    }
                }
                Ok(None) => {}
                Err(e) => warn!(error = %e, "Bad command"),
            },
            Ok(None) => {
                info!("Console input closed");
                break;
            }
            Err(e) => {
                warn!(error = %e, "Failed to read console input");
                break;
            }
        }
    }

    std::future::pending::<()>().await;
}

/// Console command errors
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("Unknown key: {0:?}")]
    UnknownKey(String),

    #[error("Score must be a whole number, got {0:?}")]
    InvalidScore(String),
}
