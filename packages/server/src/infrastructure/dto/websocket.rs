//! WebSocket message DTOs.
//!
//! Wire format is one JSON object per text frame:
//!
//! ```text
//! request  (client → server): { "id"?, "event" | "type", "data" }
//! reply    (server → client): { "id", "data" } | { "id", "error" }
//! push     (server → client): { "type", "data" }
//! ```
//!
//! Field names are camelCase on the wire.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ========================================
// Envelopes
// ========================================

/// Inbound request envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    /// Legacy spelling of `event`.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RequestEnvelope {
    pub fn new(id: Option<String>, event: &str, data: Value) -> Self {
        Self {
            id,
            event: Some(event.to_string()),
            kind: None,
            data: Some(data),
        }
    }

    /// Message kind: `event`, falling back to `type`.
    pub fn kind(&self) -> Option<&str> {
        self.event.as_deref().or(self.kind.as_deref())
    }

    /// Payload, `{}` when absent.
    pub fn payload(&self) -> Value {
        match &self.data {
            Some(Value::Null) | None => Value::Object(Default::default()),
            Some(data) => data.clone(),
        }
    }
}

/// Correlated reply. Exactly one of `data` / `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplyEnvelope<T> {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ReplyEnvelope<T> {
    pub fn success(id: String, data: T) -> Self {
        Self {
            id,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(id: String, error: String) -> Self {
        Self {
            id,
            data: None,
            error: Some(error),
        }
    }
}

/// Uncorrelated push.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PushEnvelope<T> {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: T,
}

/// Anything the server may send, as seen by a client.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct IncomingEnvelope {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

// ========================================
// Snapshots
// ========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerStatusDto {
    Online,
    Offline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatusDto {
    Waiting,
    Playing,
    Ended,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDto {
    pub id: String,
    pub name: String,
    pub is_host: bool,
    pub status: PlayerStatusDto,
    pub is_ready: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_id: Option<String>,
    pub joined_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDto {
    pub id: String,
    pub host_id: String,
    pub script_id: String,
    pub max_players: usize,
    pub players: Vec<PlayerDto>,
    pub status: RoomStatusDto,
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_started_at: Option<i64>,
    pub current_phase: String,
    #[serde(default)]
    pub discovered_clues: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptSummaryDto {
    pub id: String,
    pub title: String,
    pub description: String,
    pub max_players: usize,
    pub min_players: usize,
    pub estimated_time: u32,
    pub difficulty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Value>,
}

// ========================================
// Request payloads
// ========================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomPayload {
    /// Taken as-is; non-string values are stringified, a missing one is empty.
    #[serde(default, deserialize_with = "opaque_string")]
    pub script_id: String,
    /// Anything other than a positive integer counts as absent.
    #[serde(
        default,
        deserialize_with = "lenient_capacity",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_players: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomPayload {
    pub room_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetReadyPayload {
    pub ready: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseUpdatePayload {
    pub phase: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClueFoundPayload {
    pub clue_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatPayload {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptGetPayload {
    pub script_id: String,
}

fn opaque_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn lenient_capacity<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(Value::as_u64)
        .filter(|n| *n > 0)
        .and_then(|n| usize::try_from(n).ok()))
}

// ========================================
// Reply payloads
// ========================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomReply {
    pub room_id: String,
    pub room: RoomDto,
    pub player: PlayerDto,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRoomReply {
    pub room: RoomDto,
    pub player: PlayerDto,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckReply {
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetReadyReply {
    pub success: bool,
    pub is_ready: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartGameReply {
    pub success: bool,
    pub room: RoomDto,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseUpdateReply {
    pub success: bool,
    pub phase: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClueFoundReply {
    pub success: bool,
    pub clue_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptListReply {
    pub scripts: Vec<ScriptSummaryDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptGetReply {
    pub script: Value,
}

/// Reply data for every request kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReplyData {
    Created(CreateRoomReply),
    Joined(JoinRoomReply),
    Ack(AckReply),
    Ready(SetReadyReply),
    Started(StartGameReply),
    Phase(PhaseUpdateReply),
    Clue(ClueFoundReply),
    Scripts(ScriptListReply),
    Script(ScriptGetReply),
}

// ========================================
// Push payloads
// ========================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedData {
    pub message: String,
    pub timestamp: i64,
    pub connection_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerJoinedData {
    pub player: PlayerDto,
    pub room: RoomDto,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerLeftData {
    pub player_id: String,
    pub player_name: String,
    pub room: RoomDto,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostChangedData {
    pub new_host_id: String,
    pub room: RoomDto,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerReadyData {
    pub player_id: String,
    pub player_name: String,
    pub is_ready: bool,
    pub room: RoomDto,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStartedData {
    pub room: RoomDto,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseChangedData {
    pub phase: String,
    pub player_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClueDiscoveredData {
    pub clue_id: String,
    pub player_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageData {
    pub player_id: String,
    pub player_name: String,
    pub message: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorData {
    pub message: String,
}
