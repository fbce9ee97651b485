//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

/// Room entry of `GET /api/rooms`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummaryDto {
    pub id: String,
    pub script_id: String,
    pub host_id: String,
    pub status: String,
    pub player_count: usize,
    pub max_players: usize,
    pub created_at: String,
}

/// Player entry of `GET /api/rooms/{room_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerDetailDto {
    pub id: String,
    pub name: String,
    pub is_host: bool,
    pub is_ready: bool,
    pub character_id: Option<String>,
    pub joined_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomDetailDto {
    pub id: String,
    pub script_id: String,
    pub host_id: String,
    pub status: String,
    pub max_players: usize,
    pub players: Vec<PlayerDetailDto>,
    pub current_phase: String,
    pub discovered_clues: Vec<String>,
    pub created_at: String,
    pub game_started_at: Option<String>,
}
