//! UseCase: ルーム参加処理
//!
//! 参加に成功すると、参加者本人には応答でルームのスナップショットを返し、
//! 他のメンバーには `room:playerJoined`（新しいプレイヤーとスナップショット）を送る。

use std::sync::Arc;

use jubensha_shared::time::Clock;

use crate::domain::{
    Binding, ConnectionId, ConnectionRegistry, GameError, Player, PlayerName, Room, RoomId,
    RoomRepository, ServerEvent,
};

use super::{Broadcaster, LeaveRoomUseCase, now};

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    repository: Arc<dyn RoomRepository>,
    registry: Arc<dyn ConnectionRegistry>,
    broadcaster: Arc<Broadcaster>,
    leave_room: Arc<LeaveRoomUseCase>,
    clock: Arc<dyn Clock>,
}

impl JoinRoomUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        registry: Arc<dyn ConnectionRegistry>,
        broadcaster: Arc<Broadcaster>,
        leave_room: Arc<LeaveRoomUseCase>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            registry,
            broadcaster,
            leave_room,
            clock,
        }
    }

    /// ルーム参加を実行
    ///
    /// 形式が不正なルーム ID は存在しないルームとして扱う。
    /// 失敗した場合、ルームのメンバーも接続の紐付けも変化しない。
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        room_id: &str,
        player_name: Option<String>,
    ) -> Result<(Room, Player), GameError> {
        let room_id = RoomId::new(room_id.to_string()).map_err(|_| GameError::RoomNotFound)?;
        let player = Player::new(PlayerName::for_guest(player_name), false, now(&*self.clock));
        let player_id = player.id.clone();

        let room = self.repository.join_room(&room_id, player).await?;
        let player = room
            .find_player(&player_id)
            .cloned()
            .ok_or(GameError::PlayerNotFound)?;

        let previous = self.registry.binding(connection_id).await;
        let binding = Binding {
            room_id: room_id.clone(),
            player_id,
        };
        if !self.registry.bind(connection_id, binding.clone()).await {
            // 接続が処理中に閉じられた
            tracing::warn!("Connection '{}' closed during room:join", connection_id);
            self.leave_room.depart(binding).await;
            return Err(GameError::NotInRoom);
        }
        if let Some(previous) = previous {
            self.leave_room.depart(previous).await;
        }

        tracing::info!(
            "Player '{}' joined room {} ({}/{})",
            player.name.as_str(),
            room.id,
            room.players.len(),
            room.max_players
        );

        // 退出処理でホストが変わった可能性があるので、最新のスナップショットを使う
        let room = self.repository.get_room(&room_id).await?;
        let event = ServerEvent::PlayerJoined {
            player: player.clone(),
            room: room.clone(),
        };
        self.broadcaster
            .to_room(&room_id, &event, Some(connection_id))
            .await;

        Ok((room, player))
    }
}
