//! WebSocket client session.
//!
//! `GameClient` is the requesting side of the protocol: every request gets a
//! random id, is parked in a pending table, and resolves when the reply with
//! the same id arrives or the timeout elapses. Everything else the server
//! sends is forwarded to the event stream.

use std::{collections::HashMap, sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use jubensha_server::infrastructure::dto::websocket::{
    AckReply, ClueFoundReply, CreateRoomReply, IncomingEnvelope, JoinRoomReply, PhaseUpdateReply,
    RequestEnvelope, ScriptGetReply, ScriptListReply, SetReadyReply, StartGameReply,
};
use rand::Rng;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

use crate::error::ClientError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

type Pending = Arc<Mutex<HashMap<String, oneshot::Sender<Result<Value, String>>>>>;

/// Server push as seen by the client.
#[derive(Debug, Clone, PartialEq)]
pub struct PushedEvent {
    pub kind: String,
    pub data: Value,
}

/// Stream of pushed events. Ends when the connection closes.
pub type EventStream = mpsc::UnboundedReceiver<PushedEvent>;

/// Handle to one server connection. Cheap to clone.
#[derive(Clone)]
pub struct GameClient {
    outbound: mpsc::UnboundedSender<Message>,
    pending: Pending,
    timeout: Duration,
}

impl GameClient {
    /// Connect with the default request timeout.
    pub async fn connect(url: &str) -> Result<(Self, EventStream), ClientError> {
        Self::connect_with_timeout(url, DEFAULT_TIMEOUT).await
    }

    pub async fn connect_with_timeout(
        url: &str,
        timeout: Duration,
    ) -> Result<(Self, EventStream), ClientError> {
        let (ws_stream, _response) = connect_async(url)
            .await
            .map_err(|e| ClientError::ConnectionError(e.to_string()))?;
        tracing::info!("Connected to {}", url);

        let (mut write, mut read) = ws_stream.split();
        let (outbound, mut outbound_rx) = mpsc::unbounded_channel::<Message>();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let pending: Pending = Arc::new(Mutex::new(HashMap::new()));

        // Writer
        tokio::spawn(async move {
            while let Some(message) = outbound_rx.recv().await {
                if let Err(e) = write.send(message).await {
                    tracing::warn!("Failed to send message: {}", e);
                    break;
                }
            }
        });

        // Reader
        let pending_for_read = pending.clone();
        tokio::spawn(async move {
            while let Some(message) = read.next().await {
                match message {
                    Ok(Message::Text(text)) => {
                        dispatch_incoming(text.as_str(), &pending_for_read, &events_tx).await;
                    }
                    Ok(Message::Close(_)) => {
                        tracing::info!("Server closed the connection");
                        break;
                    }
                    Err(e) => {
                        tracing::warn!("WebSocket read error: {}", e);
                        break;
                    }
                    _ => {}
                }
            }
            // 待機中のリクエストは Closed で終わらせる
            pending_for_read.lock().await.clear();
        });

        let client = Self {
            outbound,
            pending,
            timeout,
        };
        Ok((client, events_rx))
    }

    /// Send a correlated request and wait for its reply `data`.
    pub async fn request(&self, kind: &str, data: Value) -> Result<Value, ClientError> {
        let id = request_id();
        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(id.clone(), tx);

        let envelope = RequestEnvelope::new(Some(id.clone()), kind, data);
        let text = match serde_json::to_string(&envelope) {
            Ok(text) => text,
            Err(e) => {
                self.pending.lock().await.remove(&id);
                return Err(e.into());
            }
        };
        if self.outbound.send(Message::Text(text.into())).is_err() {
            self.pending.lock().await.remove(&id);
            return Err(ClientError::Closed);
        }

        match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(Ok(data))) => Ok(data),
            Ok(Ok(Err(message))) => Err(ClientError::Server(message)),
            Ok(Err(_)) => Err(ClientError::Closed),
            Err(_) => {
                self.pending.lock().await.remove(&id);
                Err(ClientError::Timeout(kind.to_string()))
            }
        }
    }

    async fn request_as<T: DeserializeOwned>(
        &self,
        kind: &str,
        data: Value,
    ) -> Result<T, ClientError> {
        let reply = self.request(kind, data).await?;
        serde_json::from_value(reply).map_err(|source| ClientError::UnexpectedReply {
            kind: kind.to_string(),
            source,
        })
    }

    pub async fn create_room(
        &self,
        script_id: &str,
        max_players: Option<usize>,
        player_name: Option<&str>,
    ) -> Result<CreateRoomReply, ClientError> {
        let mut data = json!({ "scriptId": script_id });
        if let Some(max_players) = max_players {
            data["maxPlayers"] = json!(max_players);
        }
        if let Some(player_name) = player_name {
            data["playerName"] = json!(player_name);
        }
        self.request_as("room:create", data).await
    }

    pub async fn join_room(
        &self,
        room_id: &str,
        player_name: Option<&str>,
    ) -> Result<JoinRoomReply, ClientError> {
        let mut data = json!({ "roomId": room_id });
        if let Some(player_name) = player_name {
            data["playerName"] = json!(player_name);
        }
        self.request_as("room:join", data).await
    }

    pub async fn leave_room(&self) -> Result<AckReply, ClientError> {
        self.request_as("room:leave", json!({})).await
    }

    pub async fn set_ready(&self, ready: bool) -> Result<SetReadyReply, ClientError> {
        self.request_as("room:setReady", json!({ "ready": ready }))
            .await
    }

    pub async fn start_game(&self) -> Result<StartGameReply, ClientError> {
        self.request_as("game:start", json!({})).await
    }

    pub async fn update_phase(&self, phase: &str) -> Result<PhaseUpdateReply, ClientError> {
        self.request_as("game:phaseUpdate", json!({ "phase": phase }))
            .await
    }

    pub async fn report_clue(&self, clue_id: &str) -> Result<ClueFoundReply, ClientError> {
        self.request_as("game:clueFound", json!({ "clueId": clue_id }))
            .await
    }

    pub async fn send_chat(&self, message: &str) -> Result<AckReply, ClientError> {
        self.request_as("chat:message", json!({ "message": message }))
            .await
    }

    pub async fn list_scripts(&self) -> Result<ScriptListReply, ClientError> {
        self.request_as("script:list", json!({})).await
    }

    pub async fn get_script(&self, script_id: &str) -> Result<ScriptGetReply, ClientError> {
        self.request_as("script:get", json!({ "scriptId": script_id }))
            .await
    }

    /// Close the connection.
    pub fn close(&self) {
        let _ = self.outbound.send(Message::Close(None));
    }
}

async fn dispatch_incoming(
    text: &str,
    pending: &Pending,
    events: &mpsc::UnboundedSender<PushedEvent>,
) {
    let envelope = match serde_json::from_str::<IncomingEnvelope>(text) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::warn!("Ignoring unparsable message: {}", e);
            return;
        }
    };

    if let Some(id) = &envelope.id {
        let waiter = pending.lock().await.remove(id);
        match waiter {
            Some(waiter) => {
                let outcome = match envelope.error {
                    Some(error) => Err(error),
                    None => Ok(envelope.data.unwrap_or(Value::Null)),
                };
                let _ = waiter.send(outcome);
            }
            None => tracing::debug!("Reply '{}' arrived after its request gave up", id),
        }
        return;
    }

    match envelope.kind.or(envelope.event) {
        Some(kind) => {
            let _ = events.send(PushedEvent {
                kind,
                data: envelope.data.unwrap_or(Value::Null),
            });
        }
        None => tracing::warn!("Ignoring message without type"),
    }
}

/// Random base36 request id.
fn request_id() -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    (0..9)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_is_base36() {
        // テスト項目: リクエスト ID が 9 文字の base36 文字列になる
        // given (前提条件):

        // when (操作):
        let id = request_id();

        // then (期待する結果):
        assert_eq!(id.len(), 9);
        assert!(id.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[tokio::test]
    async fn test_reply_resolves_pending_request() {
        // テスト項目: id 付きの応答が待機中のリクエストに渡される
        // given (前提条件):
        let pending: Pending = Arc::new(Mutex::new(HashMap::new()));
        let (events_tx, mut events_rx) = mpsc::unbounded_channel();
        let (tx, rx) = oneshot::channel();
        pending.lock().await.insert("abc".to_string(), tx);

        // when (操作):
        dispatch_incoming(
            r#"{"id":"abc","data":{"success":true}}"#,
            &pending,
            &events_tx,
        )
        .await;

        // then (期待する結果):
        assert_eq!(rx.await.unwrap(), Ok(json!({ "success": true })));
        assert!(pending.lock().await.is_empty());
        assert!(events_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_error_reply_is_server_error() {
        // テスト項目: error 付きの応答はエラー文言として渡される
        // given (前提条件):
        let pending: Pending = Arc::new(Mutex::new(HashMap::new()));
        let (events_tx, _events_rx) = mpsc::unbounded_channel();
        let (tx, rx) = oneshot::channel();
        pending.lock().await.insert("abc".to_string(), tx);

        // when (操作):
        dispatch_incoming(r#"{"id":"abc","error":"Room is full"}"#, &pending, &events_tx).await;

        // then (期待する結果):
        assert_eq!(rx.await.unwrap(), Err("Room is full".to_string()));
    }

    #[tokio::test]
    async fn test_push_goes_to_event_stream() {
        // テスト項目: id のないメッセージはイベントとして流れる
        // given (前提条件):
        let pending: Pending = Arc::new(Mutex::new(HashMap::new()));
        let (events_tx, mut events_rx) = mpsc::unbounded_channel();

        // when (操作):
        dispatch_incoming(
            r#"{"type":"game:phaseChanged","data":{"phase":"READING","playerId":"p1"}}"#,
            &pending,
            &events_tx,
        )
        .await;

        // then (期待する結果):
        let event = events_rx.try_recv().unwrap();
        assert_eq!(event.kind, "game:phaseChanged");
        assert_eq!(event.data["phase"], "READING");
    }
}
