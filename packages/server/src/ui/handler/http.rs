//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::Value;

use crate::{
    domain::GameError,
    infrastructure::dto::{
        http::{RoomDetailDto, RoomSummaryDto},
        websocket::ScriptSummaryDto,
    },
    ui::state::AppState,
};

/// Health check endpoint
pub async fn health_check() -> Json<Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get list of rooms
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummaryDto>> {
    let rooms = state.get_rooms_usecase.execute().await;

    // Domain Model から DTO への変換
    Json(rooms.iter().map(RoomSummaryDto::from).collect())
}

/// Get room detail by ID
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomDetailDto>, StatusCode> {
    match state.get_rooms_usecase.get(&room_id).await {
        Ok(room) => Ok(Json(RoomDetailDto::from(&room))),
        Err(GameError::RoomNotFound) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to load room {}: {}", room_id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get list of scripts
pub async fn get_scripts(State(state): State<Arc<AppState>>) -> Json<Vec<ScriptSummaryDto>> {
    let summaries = state.browse_scripts_usecase.list();
    Json(summaries.iter().map(ScriptSummaryDto::from).collect())
}

/// Get a full script document by ID
pub async fn get_script(
    State(state): State<Arc<AppState>>,
    Path(script_id): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    state
        .browse_scripts_usecase
        .get(&script_id)
        .map(|script| Json(script.document))
        .map_err(|_| StatusCode::NOT_FOUND)
}
