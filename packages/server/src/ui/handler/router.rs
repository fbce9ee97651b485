//! Message router.
//!
//! Decodes one inbound text frame into a [`ClientMessage`], runs the matching
//! use case under the dispatch lock and writes the reply back to the sender.
//!
//! Reply rules:
//!
//! * request with an `id` → `{ id, data }` or `{ id, error }`
//! * request without an `id` → success is pushed as `{ type: <kind>, data }`,
//!   failure as an `error` event
//! * unknown kinds and unparsable frames are logged and dropped

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    domain::{ClueId, ConnectionId, GameError, Phase, Removal, ScriptId, ServerEvent},
    infrastructure::dto::{
        encode_event, encode_json,
        websocket::{
            AckReply, ChatPayload, ClueFoundPayload, ClueFoundReply, CreateRoomPayload,
            CreateRoomReply, JoinRoomPayload, JoinRoomReply, PhaseUpdatePayload,
            PhaseUpdateReply, PushEnvelope, ReplyData, ReplyEnvelope, RequestEnvelope,
            ScriptGetPayload, ScriptGetReply, ScriptListReply, SetReadyPayload, SetReadyReply,
            StartGameReply,
        },
    },
    ui::state::AppState,
    usecase::{CreateRoomInput, PendingBroadcast},
};

/// Recognized client → server messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    CreateRoom(CreateRoomInput),
    JoinRoom {
        room_id: String,
        player_name: Option<String>,
    },
    LeaveRoom,
    SetReady {
        ready: bool,
    },
    StartGame,
    UpdatePhase(Phase),
    ClueFound(ClueId),
    Chat {
        message: String,
    },
    ListScripts,
    GetScript {
        script_id: String,
    },
}

impl ClientMessage {
    /// Decode a message from its kind and payload.
    ///
    /// Returns `None` for an unrecognized kind. A recognized kind whose
    /// payload does not fit yields `GameError::InvalidPayload`.
    pub fn parse(kind: &str, payload: Value) -> Option<Result<Self, GameError>> {
        let message = match kind {
            "room:create" => decode::<CreateRoomPayload>(kind, payload).map(|p| {
                ClientMessage::CreateRoom(CreateRoomInput {
                    script_id: ScriptId::opaque(p.script_id),
                    max_players: p.max_players,
                    player_name: p.player_name,
                })
            }),
            "room:join" => decode::<JoinRoomPayload>(kind, payload).map(|p| {
                ClientMessage::JoinRoom {
                    room_id: p.room_id,
                    player_name: p.player_name,
                }
            }),
            "room:leave" => Ok(ClientMessage::LeaveRoom),
            "room:setReady" => decode::<SetReadyPayload>(kind, payload)
                .map(|p| ClientMessage::SetReady { ready: p.ready }),
            "game:start" => Ok(ClientMessage::StartGame),
            "game:phaseUpdate" => decode::<PhaseUpdatePayload>(kind, payload)
                .map(|p| ClientMessage::UpdatePhase(Phase::new(p.phase))),
            "game:clueFound" => decode::<ClueFoundPayload>(kind, payload).and_then(|p| {
                ClueId::new(p.clue_id)
                    .map(ClientMessage::ClueFound)
                    .map_err(|e| invalid(kind, e))
            }),
            "chat:message" => decode::<ChatPayload>(kind, payload)
                .map(|p| ClientMessage::Chat { message: p.message }),
            "script:list" => Ok(ClientMessage::ListScripts),
            "script:get" => decode::<ScriptGetPayload>(kind, payload).map(|p| {
                ClientMessage::GetScript {
                    script_id: p.script_id,
                }
            }),
            _ => return None,
        };
        Some(message)
    }
}

fn decode<T: DeserializeOwned>(kind: &str, payload: Value) -> Result<T, GameError> {
    serde_json::from_value(payload).map_err(|e| invalid(kind, e))
}

fn invalid(kind: &str, reason: impl ToString) -> GameError {
    GameError::InvalidPayload {
        kind: kind.to_string(),
        reason: reason.to_string(),
    }
}

/// Handle one inbound text frame from `connection_id`.
pub async fn route_message(state: &AppState, connection_id: &ConnectionId, text: &str) {
    let envelope = match serde_json::from_str::<RequestEnvelope>(text) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::warn!("Dropping malformed message from '{}': {}", connection_id, e);
            return;
        }
    };
    let Some(kind) = envelope.kind().map(str::to_string) else {
        tracing::warn!("Dropping message without kind from '{}'", connection_id);
        return;
    };
    let Some(parsed) = ClientMessage::parse(&kind, envelope.payload()) else {
        tracing::warn!("Unknown message kind '{}' from '{}'", kind, connection_id);
        return;
    };

    tracing::debug!("Routing '{}' from '{}'", kind, connection_id);

    let _guard = state.dispatch_lock.lock().await;

    let (outcome, pending) = match parsed {
        Ok(message) => match dispatch(state, connection_id, message).await {
            Ok((data, pending)) => (Ok(data), pending),
            Err(e) => (Err(e), None),
        },
        Err(e) => (Err(e), None),
    };

    reply(state, connection_id, envelope.id, &kind, outcome).await;

    // ルームへの配信は要求者への応答の後
    if let Some(pending) = pending {
        state.broadcaster.deliver(pending).await;
    }
}

/// Run the disconnect path for a closed connection.
pub async fn disconnect(state: &AppState, connection_id: &ConnectionId) -> Option<Removal> {
    let _guard = state.dispatch_lock.lock().await;
    state
        .disconnect_participant_usecase
        .execute(connection_id)
        .await
}

async fn dispatch(
    state: &AppState,
    connection_id: &ConnectionId,
    message: ClientMessage,
) -> Result<(ReplyData, Option<PendingBroadcast>), GameError> {
    let data = match message {
        ClientMessage::CreateRoom(input) => {
            let (room, player) = state
                .create_room_usecase
                .execute(connection_id, input)
                .await?;
            ReplyData::Created(CreateRoomReply {
                room_id: room.id.as_str().to_string(),
                room: (&room).into(),
                player: (&player).into(),
            })
        }
        ClientMessage::JoinRoom {
            room_id,
            player_name,
        } => {
            let (room, player) = state
                .join_room_usecase
                .execute(connection_id, &room_id, player_name)
                .await?;
            ReplyData::Joined(JoinRoomReply {
                room: (&room).into(),
                player: (&player).into(),
            })
        }
        ClientMessage::LeaveRoom => {
            state.leave_room_usecase.execute(connection_id).await;
            ReplyData::Ack(AckReply { success: true })
        }
        ClientMessage::SetReady { ready } => {
            let (player, pending) = state
                .set_ready_usecase
                .execute(connection_id, ready)
                .await?;
            let data = ReplyData::Ready(SetReadyReply {
                success: true,
                is_ready: player.is_ready,
            });
            return Ok((data, Some(pending)));
        }
        ClientMessage::StartGame => {
            let (room, pending) = state.start_game_usecase.execute(connection_id).await?;
            let data = ReplyData::Started(StartGameReply {
                success: true,
                room: (&room).into(),
            });
            return Ok((data, Some(pending)));
        }
        ClientMessage::UpdatePhase(phase) => {
            let (phase, pending) = state
                .update_phase_usecase
                .execute(connection_id, phase)
                .await?;
            let data = ReplyData::Phase(PhaseUpdateReply {
                success: true,
                phase: phase.into_string(),
            });
            return Ok((data, Some(pending)));
        }
        ClientMessage::ClueFound(clue_id) => {
            let (clue_id, pending) = state
                .discover_clue_usecase
                .execute(connection_id, clue_id)
                .await?;
            let data = ReplyData::Clue(ClueFoundReply {
                success: true,
                clue_id: clue_id.into_string(),
            });
            return Ok((data, Some(pending)));
        }
        ClientMessage::Chat { message } => {
            let pending = state
                .send_chat_usecase
                .prepare(connection_id, message)
                .await;
            let data = ReplyData::Ack(AckReply {
                success: pending.is_some(),
            });
            return Ok((data, pending));
        }
        ClientMessage::ListScripts => ReplyData::Scripts(ScriptListReply {
            scripts: state
                .browse_scripts_usecase
                .list()
                .iter()
                .map(Into::into)
                .collect(),
        }),
        ClientMessage::GetScript { script_id } => {
            let script = state.browse_scripts_usecase.get(&script_id)?;
            ReplyData::Script(ScriptGetReply {
                script: script.document,
            })
        }
    };
    Ok((data, None))
}

async fn reply(
    state: &AppState,
    connection_id: &ConnectionId,
    id: Option<String>,
    kind: &str,
    outcome: Result<ReplyData, GameError>,
) {
    if let Err(e) = &outcome {
        tracing::warn!("'{}' from '{}' failed: {}", kind, connection_id, e);
    }

    let encoded = match (id, outcome) {
        (Some(id), Ok(data)) => encode_json(&ReplyEnvelope::success(id, data)),
        (Some(id), Err(e)) => encode_json(&ReplyEnvelope::<ReplyData>::failure(id, e.to_string())),
        (None, Ok(data)) => encode_json(&PushEnvelope {
            kind: kind.to_string(),
            data,
        }),
        (None, Err(e)) => encode_event(&ServerEvent::Error {
            message: e.to_string(),
        }),
    };

    let content = match encoded {
        Ok(content) => content,
        Err(e) => {
            tracing::error!("Failed to encode reply to '{}': {}", connection_id, e);
            return;
        }
    };
    if let Err(e) = state.message_pusher.push_to(connection_id, &content).await {
        tracing::warn!("Failed to reply to '{}': {}", connection_id, e);
    }
}
