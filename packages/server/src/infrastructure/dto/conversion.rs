//! Conversion logic between domain entities and DTOs.

use jubensha_shared::time::timestamp_to_rfc3339;
use serde::Serialize;

use crate::domain::{
    Player, PlayerStatus, Room, RoomStatus, ScriptSummary, ServerEvent,
};
use crate::infrastructure::dto::{http, websocket as dto};

// ========================================
// Domain Entity → WebSocket DTO
// ========================================

impl From<PlayerStatus> for dto::PlayerStatusDto {
    fn from(status: PlayerStatus) -> Self {
        match status {
            PlayerStatus::Online => Self::Online,
        }
    }
}

impl From<RoomStatus> for dto::RoomStatusDto {
    fn from(status: RoomStatus) -> Self {
        match status {
            RoomStatus::Waiting => Self::Waiting,
            RoomStatus::Playing => Self::Playing,
        }
    }
}

impl From<&Player> for dto::PlayerDto {
    fn from(model: &Player) -> Self {
        Self {
            id: model.id.as_str().to_string(),
            name: model.name.as_str().to_string(),
            is_host: model.is_host,
            status: model.status.into(),
            is_ready: model.is_ready,
            character_id: model.character_id.as_ref().map(|c| c.as_str().to_string()),
            joined_at: model.joined_at.value(),
        }
    }
}

impl From<&Room> for dto::RoomDto {
    fn from(model: &Room) -> Self {
        Self {
            id: model.id.as_str().to_string(),
            host_id: model.host_id.as_str().to_string(),
            script_id: model.script_id.as_str().to_string(),
            max_players: model.max_players,
            players: model.players.iter().map(dto::PlayerDto::from).collect(),
            status: model.status.into(),
            created_at: model.created_at.value(),
            game_started_at: model.game_started_at.map(|t| t.value()),
            current_phase: model.progress.phase.as_str().to_string(),
            discovered_clues: model
                .progress
                .discovered_clues
                .iter()
                .map(|c| c.as_str().to_string())
                .collect(),
        }
    }
}

impl From<&ScriptSummary> for dto::ScriptSummaryDto {
    fn from(model: &ScriptSummary) -> Self {
        Self {
            id: model.id.as_str().to_string(),
            title: model.title.clone(),
            description: model.description.clone(),
            max_players: model.max_players,
            min_players: model.min_players,
            estimated_time: model.estimated_time,
            difficulty: model.difficulty.clone(),
            theme: model.theme.clone(),
        }
    }
}

// ========================================
// Domain Entity → HTTP DTO
// ========================================

fn status_label(status: RoomStatus) -> String {
    match status {
        RoomStatus::Waiting => "waiting",
        RoomStatus::Playing => "playing",
    }
    .to_string()
}

impl From<&Room> for http::RoomSummaryDto {
    fn from(model: &Room) -> Self {
        Self {
            id: model.id.as_str().to_string(),
            script_id: model.script_id.as_str().to_string(),
            host_id: model.host_id.as_str().to_string(),
            status: status_label(model.status),
            player_count: model.players.len(),
            max_players: model.max_players,
            created_at: timestamp_to_rfc3339(model.created_at.value()),
        }
    }
}

impl From<&Room> for http::RoomDetailDto {
    fn from(model: &Room) -> Self {
        Self {
            id: model.id.as_str().to_string(),
            script_id: model.script_id.as_str().to_string(),
            host_id: model.host_id.as_str().to_string(),
            status: status_label(model.status),
            max_players: model.max_players,
            players: model
                .players
                .iter()
                .map(|p| http::PlayerDetailDto {
                    id: p.id.as_str().to_string(),
                    name: p.name.as_str().to_string(),
                    is_host: p.is_host,
                    is_ready: p.is_ready,
                    character_id: p.character_id.as_ref().map(|c| c.as_str().to_string()),
                    joined_at: timestamp_to_rfc3339(p.joined_at.value()),
                })
                .collect(),
            current_phase: model.progress.phase.as_str().to_string(),
            discovered_clues: model
                .progress
                .discovered_clues
                .iter()
                .map(|c| c.as_str().to_string())
                .collect(),
            created_at: timestamp_to_rfc3339(model.created_at.value()),
            game_started_at: model.game_started_at.map(|t| timestamp_to_rfc3339(t.value())),
        }
    }
}

// ========================================
// ServerEvent → push envelope
// ========================================

const CONNECTED_MESSAGE: &str = "Connected successfully";

/// Serialize any DTO to a JSON string.
pub fn encode_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(value)
}

fn push<T: Serialize>(event: &ServerEvent, data: T) -> Result<String, serde_json::Error> {
    encode_json(&dto::PushEnvelope {
        kind: event.kind().to_string(),
        data,
    })
}

/// Encode a server event as a `{ type, data }` push envelope.
pub fn encode_event(event: &ServerEvent) -> Result<String, serde_json::Error> {
    match event {
        ServerEvent::Connected {
            connection_id,
            timestamp,
        } => push(
            event,
            dto::ConnectedData {
                message: CONNECTED_MESSAGE.to_string(),
                timestamp: timestamp.value(),
                connection_id: connection_id.as_str().to_string(),
            },
        ),
        ServerEvent::PlayerJoined { player, room } => push(
            event,
            dto::PlayerJoinedData {
                player: player.into(),
                room: room.into(),
            },
        ),
        ServerEvent::PlayerLeft {
            player_id,
            player_name,
            room,
        } => push(
            event,
            dto::PlayerLeftData {
                player_id: player_id.as_str().to_string(),
                player_name: player_name.as_str().to_string(),
                room: room.into(),
            },
        ),
        ServerEvent::HostChanged { new_host_id, room } => push(
            event,
            dto::HostChangedData {
                new_host_id: new_host_id.as_str().to_string(),
                room: room.into(),
            },
        ),
        ServerEvent::PlayerReady {
            player_id,
            player_name,
            is_ready,
            room,
        } => push(
            event,
            dto::PlayerReadyData {
                player_id: player_id.as_str().to_string(),
                player_name: player_name.as_str().to_string(),
                is_ready: *is_ready,
                room: room.into(),
            },
        ),
        ServerEvent::GameStarted { room } => {
            push(event, dto::GameStartedData { room: room.into() })
        }
        ServerEvent::PhaseChanged { phase, player_id } => push(
            event,
            dto::PhaseChangedData {
                phase: phase.as_str().to_string(),
                player_id: player_id.as_str().to_string(),
            },
        ),
        ServerEvent::ClueDiscovered { clue_id, player_id } => push(
            event,
            dto::ClueDiscoveredData {
                clue_id: clue_id.as_str().to_string(),
                player_id: player_id.as_str().to_string(),
            },
        ),
        ServerEvent::ChatMessage {
            player_id,
            player_name,
            message,
            timestamp,
        } => push(
            event,
            dto::ChatMessageData {
                player_id: player_id.as_str().to_string(),
                player_name: player_name.as_str().to_string(),
                message: message.clone(),
                timestamp: timestamp.value(),
            },
        ),
        ServerEvent::Error { message } => push(
            event,
            dto::ErrorData {
                message: message.clone(),
            },
        ),
    }
}
