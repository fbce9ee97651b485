//! UseCase: ルーム作成処理
//!
//! 新しいルームを作り、作成者をホストとして接続に紐付ける。
//! 既に別のルームに紐付いていた接続は、作成が成功した後でそのルームから退出する。

use std::sync::Arc;

use jubensha_shared::time::Clock;

use crate::domain::{
    Binding, ConnectionId, ConnectionRegistry, GameError, Player, PlayerName, Room,
    RoomRepository, ScriptCatalog, ScriptId, script,
};

use super::{LeaveRoomUseCase, now};

/// `room:create` の入力
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRoomInput {
    pub script_id: ScriptId,
    /// 正の整数のみ。`None` ならスクリプト、次に既定値を使う。
    pub max_players: Option<usize>,
    pub player_name: Option<String>,
}

/// ルーム作成のユースケース
pub struct CreateRoomUseCase {
    repository: Arc<dyn RoomRepository>,
    registry: Arc<dyn ConnectionRegistry>,
    leave_room: Arc<LeaveRoomUseCase>,
    catalog: Arc<dyn ScriptCatalog>,
    clock: Arc<dyn Clock>,
    default_max_players: usize,
}

impl CreateRoomUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        registry: Arc<dyn ConnectionRegistry>,
        leave_room: Arc<LeaveRoomUseCase>,
        catalog: Arc<dyn ScriptCatalog>,
        clock: Arc<dyn Clock>,
        default_max_players: usize,
    ) -> Self {
        Self {
            repository,
            registry,
            leave_room,
            catalog,
            clock,
            default_max_players,
        }
    }

    /// ルーム作成を実行
    ///
    /// # Returns
    ///
    /// * `Ok((Room, Player))` - 作成したルームのスナップショットとホスト
    /// * `Err(GameError::RoomIdExhausted)` - 空きのルーム ID が見つからなかった
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        input: CreateRoomInput,
    ) -> Result<(Room, Player), GameError> {
        // スクリプトが未登録でも作成は受け付ける
        let script = self.catalog.get_script(&input.script_id);
        if script.is_none() {
            tracing::warn!("Room created for unknown script '{}'", input.script_id);
        }

        let max_players = input
            .max_players
            .or_else(|| {
                script
                    .as_ref()
                    .map(|s| s.summary.max_players)
                    .filter(|n| *n > 0)
            })
            .unwrap_or(self.default_max_players);
        let created_at = now(&*self.clock);
        let host = Player::new(PlayerName::for_host(input.player_name), true, created_at);
        let host_id = host.id.clone();

        let room = self
            .repository
            .create_room(
                host,
                input.script_id,
                max_players,
                script::initial_phase(script.as_ref()),
                created_at,
            )
            .await?;
        let player = room
            .find_player(&host_id)
            .cloned()
            .ok_or(GameError::PlayerNotFound)?;

        let previous = self.registry.binding(connection_id).await;
        let binding = Binding {
            room_id: room.id.clone(),
            player_id: host_id,
        };
        if !self.registry.bind(connection_id, binding.clone()).await {
            // 接続が処理中に閉じられた
            tracing::warn!("Connection '{}' closed during room:create", connection_id);
            self.leave_room.depart(binding).await;
            return Err(GameError::NotInRoom);
        }
        if let Some(previous) = previous {
            self.leave_room.depart(previous).await;
        }

        tracing::info!(
            "Room {} created by '{}' (script {}, max {})",
            room.id,
            player.name.as_str(),
            room.script_id,
            room.max_players
        );

        Ok((room, player))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RoomStatus, script::MockScriptCatalog};
    use crate::usecase::testing::{DEFAULT_MAX_PLAYERS, NOW, TestContext};

    fn input(script: &str, max_players: Option<usize>, name: Option<&str>) -> CreateRoomInput {
        CreateRoomInput {
            script_id: ScriptId::new(script.to_string()).unwrap(),
            max_players,
            player_name: name.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_create_room_binds_host() {
        // テスト項目: 作成者がホストとして紐付けられる
        // given (前提条件):
        let ctx = TestContext::new();
        let _rx = ctx.connect("a").await;

        // when (操作):
        let (room, player) = ctx
            .create_room()
            .execute(&TestContext::conn("a"), input("esther-story", Some(2), Some("Alice")))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(room.id.as_str().len(), 6);
        assert!(room.id.as_str().chars().all(|c| c.is_ascii_digit()));
        assert!(player.is_host);
        assert_eq!(player.name.as_str(), "Alice");
        assert_eq!(room.max_players, 2);
        assert_eq!(room.status, RoomStatus::Waiting);
        assert_eq!(room.created_at.value(), NOW);
        assert_eq!(room.progress.phase.as_str(), "character_introduction");
        let binding = ctx.registry.binding(&TestContext::conn("a")).await.unwrap();
        assert_eq!(binding.room_id, room.id);
        assert_eq!(binding.player_id, player.id);
    }

    #[tokio::test]
    async fn test_create_room_defaults() {
        // テスト項目: 名前が空ならホスト既定名、maxPlayers 未指定ならスクリプトの値
        // given (前提条件):
        let ctx = TestContext::new();
        let _rx = ctx.connect("a").await;

        // when (操作):
        let (room, player) = ctx
            .create_room()
            .execute(&TestContext::conn("a"), input("esther-story", None, Some("  ")))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(player.name.as_str(), "房主");
        assert_eq!(room.max_players, 6);
    }

    #[tokio::test]
    async fn test_create_room_for_unknown_script_uses_config_default() {
        // テスト項目: 未登録スクリプトでも作成でき、既定の人数と IDLE フェーズになる
        // given (前提条件):
        let mut catalog = MockScriptCatalog::new();
        catalog.expect_get_script().returning(|_| None);
        let ctx = TestContext::with_catalog(Arc::new(catalog));
        let _rx = ctx.connect("a").await;

        // when (操作):
        let (room, _) = ctx
            .create_room()
            .execute(&TestContext::conn("a"), input("homebrew", None, None))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(room.max_players, DEFAULT_MAX_PLAYERS);
        assert_eq!(room.progress.phase.as_str(), "IDLE");
        assert_eq!(room.script_id.as_str(), "homebrew");
    }

    #[tokio::test]
    async fn test_create_room_while_in_other_room_leaves_it() {
        // テスト項目: 別ルームに居る接続が新しいルームを作ると、元のルームから退出する
        // given (前提条件):
        let ctx = TestContext::new();
        let _a_rx = ctx.connect("a").await;
        let mut b_rx = ctx.connect("b").await;
        let (first, _) = ctx.host_room("a", 4).await;
        ctx.join("b", &first).await;
        b_rx.drain();

        // when (操作):
        let (second, _) = ctx.host_room("a", 4).await;

        // then (期待する結果):
        assert_ne!(first.id, second.id);
        let first = ctx.repository.get_room(&first.id).await.unwrap();
        assert_eq!(first.players.len(), 1);
        assert_eq!(b_rx.kinds(), vec!["room:hostChanged", "room:playerLeft"]);
        assert_eq!(ctx.repository.count_players().await, 2);
    }
}
