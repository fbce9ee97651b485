//! UseCase: 手がかり発見
//!
//! ルームの発見済み一覧には重複なく記録するが、配信は重複でも毎回行う。

use std::sync::Arc;

use crate::domain::{ClueId, ConnectionId, ConnectionRegistry, GameError, RoomRepository, ServerEvent};

use super::{PendingBroadcast, require_binding};

pub struct DiscoverClueUseCase {
    repository: Arc<dyn RoomRepository>,
    registry: Arc<dyn ConnectionRegistry>,
}

impl DiscoverClueUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>, registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self {
            repository,
            registry,
        }
    }

    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        clue_id: ClueId,
    ) -> Result<(ClueId, PendingBroadcast), GameError> {
        let binding = require_binding(&*self.registry, connection_id).await?;
        let first_time = self
            .repository
            .record_clue(&binding.room_id, clue_id.clone())
            .await?;

        tracing::info!(
            "Clue {} found in room {} by {}{}",
            clue_id,
            binding.room_id,
            binding.player_id,
            if first_time { "" } else { " (again)" }
        );

        let event = ServerEvent::ClueDiscovered {
            clue_id: clue_id.clone(),
            player_id: binding.player_id,
        };

        Ok((clue_id, PendingBroadcast::new(binding.room_id, event)))
    }
}
