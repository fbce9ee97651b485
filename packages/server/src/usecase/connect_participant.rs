//! UseCase: 接続処理
//!
//! 新しい接続を Connection Registry と MessagePusher に登録し、
//! `connected` イベントを本人に送る。この時点ではどのルームにも属さない。

use std::sync::Arc;

use jubensha_shared::time::Clock;

use crate::domain::{
    ConnectionId, ConnectionRegistry, MessagePusher, PusherChannel, ServerEvent, Timestamp,
};

use super::now;

/// 接続のユースケース
pub struct ConnectParticipantUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl ConnectParticipantUseCase {
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            message_pusher,
            clock,
        }
    }

    /// 接続を登録し、接続時刻を返す
    ///
    /// # Arguments
    ///
    /// * `connection_id` - 新しい接続の ID
    /// * `sender` - 接続の writer タスクへのチャンネル
    pub async fn execute(&self, connection_id: ConnectionId, sender: PusherChannel) -> Timestamp {
        let connected_at = now(&*self.clock);

        self.registry
            .register(connection_id.clone(), connected_at)
            .await;
        self.message_pusher
            .register_client(connection_id.clone(), sender)
            .await;

        let event = ServerEvent::Connected {
            connection_id: connection_id.clone(),
            timestamp: connected_at,
        };
        if let Err(e) = self.message_pusher.push_event(&connection_id, &event).await {
            tracing::warn!("Failed to greet '{}': {}", connection_id, e);
        }

        connected_at
    }
}
