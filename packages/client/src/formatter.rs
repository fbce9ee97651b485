//! Message formatting utilities for client display.

use jubensha_server::infrastructure::dto::websocket::{
    ChatMessageData, ClueDiscoveredData, ConnectedData, ErrorData, GameStartedData,
    HostChangedData, PhaseChangedData, PlayerDto, PlayerJoinedData, PlayerLeftData,
    PlayerReadyData, RoomDto,
};
use jubensha_shared::time::timestamp_to_rfc3339;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::session::PushedEvent;

const RULE: &str = "============================================================";

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format any pushed event
    ///
    /// Events whose payload does not match the expected shape are shown raw.
    pub fn format_event(event: &PushedEvent) -> String {
        let formatted = match event.kind.as_str() {
            "connected" => decode::<ConnectedData>(&event.data).map(|d| {
                format!("\n* {} ({})\n", d.message, timestamp_to_rfc3339(d.timestamp))
            }),
            "room:playerJoined" => decode::<PlayerJoinedData>(&event.data).map(|d| {
                format!(
                    "\n+ {} joined ({}/{})\n",
                    d.player.name,
                    d.room.players.len(),
                    d.room.max_players
                )
            }),
            "room:playerLeft" => decode::<PlayerLeftData>(&event.data).map(|d| {
                format!(
                    "\n- {} left ({}/{})\n",
                    d.player_name,
                    d.room.players.len(),
                    d.room.max_players
                )
            }),
            "room:hostChanged" => decode::<HostChangedData>(&event.data).map(|d| {
                let host = find_player(&d.room, &d.new_host_id)
                    .map(|p| p.name.as_str())
                    .unwrap_or(d.new_host_id.as_str());
                format!("\n* {} is now the host\n", host)
            }),
            "room:playerReady" => decode::<PlayerReadyData>(&event.data).map(|d| {
                let state = if d.is_ready { "ready" } else { "not ready" };
                format!("\n* {} is {}\n", d.player_name, state)
            }),
            "game:started" => {
                decode::<GameStartedData>(&event.data).map(|d| Self::format_game_started(&d.room))
            }
            "game:phaseChanged" => decode::<PhaseChangedData>(&event.data)
                .map(|d| format!("\n>> Phase: {}\n", d.phase)),
            "game:clueDiscovered" => decode::<ClueDiscoveredData>(&event.data)
                .map(|d| format!("\n? Clue found: {}\n", d.clue_id)),
            "chat:message" => decode::<ChatMessageData>(&event.data).map(|d| {
                Self::format_chat_message(&d.player_name, &d.message, d.timestamp)
            }),
            "error" => decode::<ErrorData>(&event.data).map(|d| format!("\n! {}\n", d.message)),
            _ => None,
        };

        formatted.unwrap_or_else(|| Self::format_raw_message(&event.kind, &event.data))
    }

    /// Format the room overview
    ///
    /// # Arguments
    ///
    /// * `room` - Room snapshot
    /// * `me` - The current player's ID (to mark as "me")
    pub fn format_room(room: &RoomDto, me: Option<&str>) -> String {
        let mut output = String::new();
        output.push_str(&format!("\n\n{}\n", RULE));
        output.push_str(&format!(
            "Room {} [{}] script={} phase={}\n",
            room.id,
            status_label(room),
            room.script_id,
            room.current_phase
        ));

        for player in &room.players {
            let mut tags = Vec::new();
            if player.is_host {
                tags.push("host".to_string());
            }
            if player.is_ready {
                tags.push("ready".to_string());
            }
            if let Some(character_id) = &player.character_id {
                tags.push(format!("as {}", character_id));
            }
            if me == Some(player.id.as_str()) {
                tags.push("me".to_string());
            }
            let suffix = if tags.is_empty() {
                String::new()
            } else {
                format!(" ({})", tags.join(", "))
            };
            output.push_str(&format!("{}{}\n", player.name, suffix));
        }

        output.push_str(&format!("{}\n", RULE));
        output
    }

    fn format_game_started(room: &RoomDto) -> String {
        let mut output = String::from("\n>> Game started\n");
        for player in &room.players {
            if let Some(character_id) = &player.character_id {
                output.push_str(&format!("   {} plays {}\n", player.name, character_id));
            }
        }
        output
    }

    /// Format a chat message
    ///
    /// # Arguments
    ///
    /// * `from` - Display name of the sender
    /// * `content` - The message content
    /// * `sent_at` - Server timestamp (milliseconds)
    pub fn format_chat_message(from: &str, content: &str, sent_at: i64) -> String {
        format!(
            "\n\n------------------------------------------------------------\n\
             @{}: {}\n\
             sent at {}\n\
             ------------------------------------------------------------\n",
            from,
            content,
            timestamp_to_rfc3339(sent_at)
        )
    }

    /// Format a message with an unknown kind or shape
    pub fn format_raw_message(kind: &str, data: &Value) -> String {
        format!("\n← Received {}: {}\n", kind, data)
    }
}

fn decode<T: DeserializeOwned>(data: &Value) -> Option<T> {
    serde_json::from_value(data.clone()).ok()
}

fn find_player<'a>(room: &'a RoomDto, player_id: &str) -> Option<&'a PlayerDto> {
    room.players.iter().find(|p| p.id == player_id)
}

fn status_label(room: &RoomDto) -> String {
    serde_json::to_value(&room.status)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}
