//! UseCase: 準備状態の切り替え
//!
//! 準備状態は参考情報で、ゲーム開始の条件にはしない。

use std::sync::Arc;

use crate::domain::{ConnectionId, ConnectionRegistry, GameError, Player, RoomRepository, ServerEvent};

use super::{PendingBroadcast, require_binding};

pub struct SetReadyUseCase {
    repository: Arc<dyn RoomRepository>,
    registry: Arc<dyn ConnectionRegistry>,
}

impl SetReadyUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>, registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self {
            repository,
            registry,
        }
    }

    /// 準備状態を更新し、本人を含む全メンバー宛ての `room:playerReady` を返す
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        ready: bool,
    ) -> Result<(Player, PendingBroadcast), GameError> {
        let binding = require_binding(&*self.registry, connection_id).await?;
        let (player, room) = self
            .repository
            .set_ready(&binding.room_id, &binding.player_id, ready)
            .await?;

        tracing::info!(
            "Player '{}' in room {} is {}",
            player.name.as_str(),
            room.id,
            if ready { "ready" } else { "not ready" }
        );

        let event = ServerEvent::PlayerReady {
            player_id: player.id.clone(),
            player_name: player.name.clone(),
            is_ready: player.is_ready,
            room,
        };

        Ok((player, PendingBroadcast::new(binding.room_id, event)))
    }
}
