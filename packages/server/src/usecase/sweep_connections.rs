//! UseCase: 生存確認（heartbeat）
//!
//! 一周期ごとに呼ばれる。前回の ping に応答しなかった接続を強制的に閉じ、
//! それ以外の接続には新しい ping を送る。強制切断は送信キューを経由しないので、
//! 相手が応答せず書き込みが詰まっていても接続は落ちる。後始末は通常の切断処理で行われる。

use std::sync::Arc;

use crate::domain::{ConnectionId, ConnectionRegistry, MessagePusher};

pub struct SweepConnectionsUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl SweepConnectionsUseCase {
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// pong を受けた接続を生存としてマーク
    pub async fn mark_alive(&self, connection_id: &ConnectionId) {
        self.registry.mark_alive(connection_id).await;
    }

    /// 一周期分の生存確認を行い、閉じた接続を返す
    pub async fn execute(&self) -> Vec<ConnectionId> {
        let stale = self.registry.sweep_liveness().await;

        for connection_id in &stale {
            tracing::info!("Connection '{}' missed a heartbeat, closing", connection_id);
            if let Err(e) = self.message_pusher.close(connection_id).await {
                tracing::warn!("Failed to close '{}': {}", connection_id, e);
            }
        }

        for connection_id in self.registry.connection_ids().await {
            if stale.contains(&connection_id) {
                continue;
            }
            if let Err(e) = self.message_pusher.ping(&connection_id).await {
                tracing::debug!("Failed to ping '{}': {}", connection_id, e);
            }
        }

        stale
    }
}
