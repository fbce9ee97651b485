//! UseCase: 切断処理
//!
//! トランスポートの close / error、heartbeat による強制切断のどれでも呼ばれる。
//! ルームからの退出は `LeaveRoomUseCase` と同じ経路で行い、その後で接続を登録解除する。

use std::sync::Arc;

use crate::domain::{ConnectionId, ConnectionRegistry, MessagePusher, Removal};

use super::LeaveRoomUseCase;

/// 切断のユースケース
pub struct DisconnectParticipantUseCase {
    leave_room: Arc<LeaveRoomUseCase>,
    registry: Arc<dyn ConnectionRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectParticipantUseCase {
    pub fn new(
        leave_room: Arc<LeaveRoomUseCase>,
        registry: Arc<dyn ConnectionRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            leave_room,
            registry,
            message_pusher,
        }
    }

    /// 切断を実行
    ///
    /// # Returns
    ///
    /// * `Some(Removal)` - ルームに居たので退出させた
    /// * `None` - ルームには居なかった
    pub async fn execute(&self, connection_id: &ConnectionId) -> Option<Removal> {
        let removal = self.leave_room.execute(connection_id).await;

        self.message_pusher.unregister_client(connection_id).await;
        if self.registry.unregister(connection_id).await.is_none() {
            tracing::debug!("Connection '{}' was already unregistered", connection_id);
        }

        removal
    }
}
