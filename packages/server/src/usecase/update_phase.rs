//! UseCase: フェーズ更新
//!
//! サーバーはフェーズの順序を検証しない。どのフェーズへ進めるかは
//! クライアント側（`PhaseCursor`）の判断に任せ、受け取った値をそのまま記録して配信する。

use std::sync::Arc;

use crate::domain::{ConnectionId, ConnectionRegistry, GameError, Phase, RoomRepository, ServerEvent};

use super::{PendingBroadcast, require_binding};

pub struct UpdatePhaseUseCase {
    repository: Arc<dyn RoomRepository>,
    registry: Arc<dyn ConnectionRegistry>,
}

impl UpdatePhaseUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>, registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self {
            repository,
            registry,
        }
    }

    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        phase: Phase,
    ) -> Result<(Phase, PendingBroadcast), GameError> {
        let binding = require_binding(&*self.registry, connection_id).await?;
        self.repository
            .record_phase(&binding.room_id, phase.clone())
            .await?;

        tracing::info!("Room {} moved to phase {}", binding.room_id, phase.as_str());

        let event = ServerEvent::PhaseChanged {
            phase: phase.clone(),
            player_id: binding.player_id,
        };

        Ok((phase, PendingBroadcast::new(binding.room_id, event)))
    }
}
