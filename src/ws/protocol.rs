//! WebSocket protocol message definitions
//! These are the wire types for client-server communication

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Messages sent from server to client (text frames)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    /// Full game state, replaces whatever the client held before
    GameState(GameStateSnapshot),

    /// Any message type this client does not handle
    #[serde(other)]
    Unknown,
}

/// Server-pushed game state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameStateSnapshot {
    /// Is a pilot currently playing
    #[serde(default)]
    pub active: bool,
    /// Seconds left in the current run
    #[serde(default, deserialize_with = "whole_i64")]
    pub time_left: i64,
    /// Score of the current run
    #[serde(default, deserialize_with = "whole_i64")]
    pub score: i64,
    /// Name of the current pilot
    #[serde(default)]
    pub player: Option<String>,
    /// Waiting players, front of the queue first
    #[serde(default)]
    pub queue: Vec<String>,
    /// Best runs, best first
    #[serde(default)]
    pub leaderboard: Vec<LeaderboardEntry>,
    /// Rounds left in the current weapon
    #[serde(
        default,
        deserialize_with = "opt_count_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub ammo: Option<u32>,
    /// Magazine size, also identifies the weapon class
    #[serde(
        default,
        deserialize_with = "opt_count_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_ammo: Option<u32>,
    /// Targets currently tracked by the vehicle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enemies: Option<Vec<EnemyStatus>>,
}

impl GameStateSnapshot {
    /// Whether `name` is the active pilot
    pub fn is_piloted_by(&self, name: &str) -> bool {
        self.active && self.player.as_deref() == Some(name)
    }

    /// 1-based queue position of `name`
    pub fn queue_position(&self, name: &str) -> Option<usize> {
        self.queue.iter().position(|n| n == name).map(|i| i + 1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    #[serde(deserialize_with = "whole_i64")]
    pub score: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyStatus {
    pub id: String,
    pub name: String,
    #[serde(deserialize_with = "count_u32")]
    pub hp: u32,
    #[serde(deserialize_with = "count_u32")]
    pub max_hp: u32,
}

// The server computes these fields with plain JS arithmetic, so any JSON
// number may arrive: fractions are floored, counts are clamped at zero.

fn json_number<E: de::Error>(value: Value) -> Result<f64, E> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| E::custom(format!("number out of range: {}", n))),
        other => Err(E::invalid_type(unexpected(&other), &"a number")),
    }
}

fn unexpected(value: &Value) -> de::Unexpected<'_> {
    match value {
        Value::Null => de::Unexpected::Unit,
        Value::Bool(b) => de::Unexpected::Bool(*b),
        Value::String(s) => de::Unexpected::Str(s.as_str()),
        Value::Array(_) => de::Unexpected::Seq,
        Value::Object(_) => de::Unexpected::Map,
        Value::Number(_) => de::Unexpected::Other("number"),
    }
}

fn to_count(n: f64) -> u32 {
    // `as` saturates and maps NaN to 0
    n.floor().max(0.0) as u32
}

fn whole_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    if let Some(whole) = value.as_i64() {
        return Ok(whole);
    }
    Ok(json_number::<D::Error>(value)?.floor() as i64)
}

fn count_u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let n = json_number::<D::Error>(Value::deserialize(deserializer)?)?;
    Ok(to_count(n))
}

fn opt_count_u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        value => json_number::<D::Error>(value).map(|n| Some(to_count(n))),
    }
}

/// Messages sent from client to server (text frames)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientAction {
    /// Enter the pilot queue under a display name
    JoinQueue { name: String },

    /// Abort the current run
    StopGame,

    /// Debug scoring
    AddScore { score: i64 },
}

/// Protocol decode errors
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Malformed server message: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Decode a text frame from the server
pub fn decode_server_text(text: &str) -> Result<ServerMsg, ProtocolError> {
    Ok(serde_json::from_str(text)?)
}

/// Encode an action for a text frame
pub fn encode_action(action: &ClientAction) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(action)?)
}
