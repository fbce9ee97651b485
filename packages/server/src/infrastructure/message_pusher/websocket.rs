//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 接続ごとの `PusherChannel` を管理
//! - イベントのエンコードと送信（push_to, push_event, broadcast）
//! - heartbeat 用の ping と強制切断（送信キューを経由しない）
//!
//! ## 設計ノート
//!
//! WebSocket の受付と sender の生成は UI 層（`ui/handler/websocket.rs`）で行う。
//! ここでは受け取った sender にフレームを積むだけで、ソケットへの書き込みは
//! 接続ごとの writer タスクが担当する。チャンネルは unbounded なので、
//! 送信がロックを保持したまま待たされることはない。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    domain::{
        ConnectionId, MessagePushError, MessagePusher, OutboundFrame, PusherChannel, ServerEvent,
    },
    infrastructure::dto::encode_event,
};

/// WebSocket を使った MessagePusher 実装
pub struct WebSocketMessagePusher {
    /// Key: connection_id, Value: writer タスクへのチャンネル
    clients: Arc<Mutex<HashMap<ConnectionId, PusherChannel>>>,
}

impl WebSocketMessagePusher {
    pub fn new() -> Self {
        Self {
            clients: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    async fn send_frame(
        &self,
        connection_id: &ConnectionId,
        frame: OutboundFrame,
    ) -> Result<(), MessagePushError> {
        let clients = self.clients.lock().await;
        let sender = clients
            .get(connection_id)
            .ok_or_else(|| MessagePushError::ConnectionNotFound(connection_id.to_string()))?;
        sender.send(frame)
    }
}

impl Default for WebSocketMessagePusher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel) {
        let mut clients = self.clients.lock().await;
        tracing::debug!("Connection '{}' registered to MessagePusher", connection_id);
        clients.insert(connection_id, sender);
    }

    async fn unregister_client(&self, connection_id: &ConnectionId) {
        let mut clients = self.clients.lock().await;
        clients.remove(connection_id);
        tracing::debug!(
            "Connection '{}' unregistered from MessagePusher",
            connection_id
        );
    }

    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError> {
        self.send_frame(connection_id, OutboundFrame::Text(content.to_string()))
            .await?;
        tracing::debug!("Pushed message to connection '{}'", connection_id);
        Ok(())
    }

    async fn push_event(
        &self,
        connection_id: &ConnectionId,
        event: &ServerEvent,
    ) -> Result<(), MessagePushError> {
        let content = encode_event(event).map_err(|e| MessagePushError::Encode(e.to_string()))?;
        self.push_to(connection_id, &content).await
    }

    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        event: &ServerEvent,
    ) -> Result<(), MessagePushError> {
        let content = encode_event(event).map_err(|e| MessagePushError::Encode(e.to_string()))?;
        let clients = self.clients.lock().await;

        for target in targets {
            match clients.get(&target) {
                // ブロードキャストでは一部の送信失敗を許容
                Some(sender) => {
                    if let Err(e) = sender.send(OutboundFrame::Text(content.clone())) {
                        tracing::warn!("Failed to push {} to '{}': {}", event.kind(), target, e);
                    } else {
                        tracing::debug!("Broadcasted {} to '{}'", event.kind(), target);
                    }
                }
                None => {
                    tracing::warn!(
                        "Connection '{}' not found during broadcast, skipping",
                        target
                    );
                }
            }
        }

        Ok(())
    }

    async fn ping(&self, connection_id: &ConnectionId) -> Result<(), MessagePushError> {
        self.send_frame(connection_id, OutboundFrame::Ping).await
    }

    async fn close(&self, connection_id: &ConnectionId) -> Result<(), MessagePushError> {
        let clients = self.clients.lock().await;
        let sender = clients
            .get(connection_id)
            .ok_or_else(|| MessagePushError::ConnectionNotFound(connection_id.to_string()))?;
        sender.terminate();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Phase, PlayerId, PusherReceiver, pusher_channel};

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - push_to / push_event: 特定の接続への送信
    // - broadcast: 複数接続への送信と部分失敗の許容
    // - ping: 制御フレームの送信
    // - close: 送信キューを経由しない強制切断
    //
    // 【なぜこのテストが必要か】
    // - MessagePusher は UseCase から呼ばれる通信層の中核
    // - 切断済みの接続が混ざってもブロードキャスト全体は失敗してはならない
    // ========================================

    fn conn(id: &str) -> ConnectionId {
        ConnectionId::new(id.to_string()).unwrap()
    }

    fn phase_event() -> ServerEvent {
        ServerEvent::PhaseChanged {
            phase: Phase::new("READING"),
            player_id: PlayerId::new("p1".to_string()).unwrap(),
        }
    }

    async fn create_test_pusher_with(
        ids: &[&str],
    ) -> (WebSocketMessagePusher, Vec<PusherReceiver>) {
        let pusher = WebSocketMessagePusher::new();
        let mut receivers = Vec::new();
        for id in ids {
            let (tx, rx) = pusher_channel();
            pusher.register_client(conn(id), tx).await;
            receivers.push(rx);
        }
        (pusher, receivers)
    }

    #[tokio::test]
    async fn test_push_to_success() {
        // テスト項目: 特定の接続にメッセージを送信できる
        // given (前提条件):
        let (pusher, mut receivers) = create_test_pusher_with(&["alice"]).await;

        // when (操作):
        let result = pusher.push_to(&conn("alice"), "Hello").await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(
            receivers[0].frames.recv().await,
            Some(OutboundFrame::Text("Hello".to_string()))
        );
    }

    #[tokio::test]
    async fn test_push_to_connection_not_found() {
        // テスト項目: 存在しない接続への送信はエラーを返す
        // given (前提条件):
        let (pusher, _receivers) = create_test_pusher_with(&[]).await;

        // when (操作):
        let result = pusher.push_to(&conn("nobody"), "Hello").await;

        // then (期待する結果):
        assert!(matches!(
            result,
            Err(MessagePushError::ConnectionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_push_event_encodes_envelope() {
        // テスト項目: イベントが { type, data } としてエンコードされて届く
        // given (前提条件):
        let (pusher, mut receivers) = create_test_pusher_with(&["alice"]).await;

        // when (操作):
        pusher
            .push_event(&conn("alice"), &phase_event())
            .await
            .unwrap();

        // then (期待する結果):
        let Some(OutboundFrame::Text(text)) = receivers[0].frames.recv().await else {
            panic!("expected a text frame");
        };
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["type"], "game:phaseChanged");
        assert_eq!(value["data"]["phase"], "READING");
    }

    #[tokio::test]
    async fn test_broadcast_skips_missing_and_closed_connections() {
        // テスト項目: 未登録・切断済みの接続が混ざってもブロードキャストは成功する
        // given (前提条件):
        let (pusher, mut receivers) = create_test_pusher_with(&["alice", "bob", "carol"]).await;
        // bob の writer タスクが終了した状態
        let bob_rx = receivers.remove(1);
        drop(bob_rx);

        // when (操作):
        let result = pusher
            .broadcast(
                vec![conn("alice"), conn("bob"), conn("carol"), conn("ghost")],
                &phase_event(),
            )
            .await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert!(matches!(
            receivers[0].frames.recv().await,
            Some(OutboundFrame::Text(_))
        ));
        assert!(matches!(
            receivers[1].frames.recv().await,
            Some(OutboundFrame::Text(_))
        ));
    }

    #[tokio::test]
    async fn test_ping_is_queued_and_close_skips_the_queue() {
        // テスト項目: ping はフレームとして積まれ、close はキューを経由せず切断要求になる
        // given (前提条件):
        let (pusher, mut receivers) = create_test_pusher_with(&["alice"]).await;

        // when (操作):
        pusher.ping(&conn("alice")).await.unwrap();
        pusher.close(&conn("alice")).await.unwrap();

        // then (期待する結果):
        assert_eq!(receivers[0].frames.recv().await, Some(OutboundFrame::Ping));
        assert!(receivers[0].frames.try_recv().is_err());
        assert!(receivers[0].kill.is_triggered());
    }

    #[tokio::test]
    async fn test_close_unknown_connection() {
        // テスト項目: 存在しない接続の close はエラーを返す
        // given (前提条件):
        let (pusher, _receivers) = create_test_pusher_with(&[]).await;

        // when (操作):
        let result = pusher.close(&conn("nobody")).await;

        // then (期待する結果):
        assert!(matches!(
            result,
            Err(MessagePushError::ConnectionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_unregister_client() {
        // テスト項目: 登録解除後は送信できない
        // given (前提条件):
        let (pusher, _receivers) = create_test_pusher_with(&["alice"]).await;

        // when (操作):
        pusher.unregister_client(&conn("alice")).await;

        // then (期待する結果):
        assert!(pusher.push_to(&conn("alice"), "Hello").await.is_err());
    }
}
