//! UseCase: ゲーム開始処理
//!
//! ホストだけが開始できる。ホスト以外の人数に合わせてスクリプトの配役を決め、
//! それをシャッフルして参加順に割り当て、全員宛ての `game:started` を返す。
//! 配信は開始者への応答の後に呼び出し側が行う。

use std::sync::Arc;

use jubensha_shared::time::Clock;

use crate::domain::{
    ConnectionId, ConnectionRegistry, GameError, Room, RoomRepository, ScriptCatalog, ServerEvent,
};

use super::{PendingBroadcast, now, require_binding};

pub struct StartGameUseCase {
    repository: Arc<dyn RoomRepository>,
    registry: Arc<dyn ConnectionRegistry>,
    catalog: Arc<dyn ScriptCatalog>,
    clock: Arc<dyn Clock>,
}

impl StartGameUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        registry: Arc<dyn ConnectionRegistry>,
        catalog: Arc<dyn ScriptCatalog>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            registry,
            catalog,
            clock,
        }
    }

    /// ゲーム開始を実行
    ///
    /// # Returns
    ///
    /// * `Ok((Room, PendingBroadcast))` - キャラクター割り当て済みのスナップショットと `game:started`
    /// * `Err(GameError::NotAuthorized)` - ホスト以外が呼んだ
    /// * `Err(GameError::GameAlreadyStarted)` - 既に開始済み
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
    ) -> Result<(Room, PendingBroadcast), GameError> {
        let binding = require_binding(&*self.registry, connection_id).await?;
        let room = self.repository.get_room(&binding.room_id).await?;

        // 未登録のスクリプトなら割り当ては行わない
        let guests = room.players.iter().filter(|p| !p.is_host).count();
        let characters = self
            .catalog
            .get_script(&room.script_id)
            .map(|script| script.characters_for(guests))
            .unwrap_or_default();

        let room = self
            .repository
            .start_game(
                &binding.room_id,
                &binding.player_id,
                &characters,
                now(&*self.clock),
            )
            .await?;

        tracing::info!(
            "Game started in room {} with {} players ({} characters available)",
            room.id,
            room.players.len(),
            characters.len()
        );

        let event = ServerEvent::GameStarted { room: room.clone() };
        let pending = PendingBroadcast::new(room.id.clone(), event);

        Ok((room, pending))
    }
}
