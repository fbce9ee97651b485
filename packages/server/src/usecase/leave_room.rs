//! UseCase: ルーム退出処理
//!
//! 明示的な `room:leave` と、切断（close / error / heartbeat 失敗）の両方が
//! この処理を通る。紐付けを先に外すので、同じ接続で二度呼ばれても
//! 二回目は何もしない。
//!
//! 退出後もルームが残る場合:
//! 1. ホストが抜けたなら `room:hostChanged` を残りのメンバーへ
//! 2. `room:playerLeft` を残りのメンバーへ
//!
//! 最後の一人が抜けたルームは削除され、通知は送らない。

use std::sync::Arc;

use crate::domain::{
    Binding, ConnectionId, ConnectionRegistry, Removal, RoomRepository, ServerEvent,
};

use super::Broadcaster;

/// ルーム退出のユースケース
pub struct LeaveRoomUseCase {
    repository: Arc<dyn RoomRepository>,
    registry: Arc<dyn ConnectionRegistry>,
    broadcaster: Arc<Broadcaster>,
}

impl LeaveRoomUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        registry: Arc<dyn ConnectionRegistry>,
        broadcaster: Arc<Broadcaster>,
    ) -> Self {
        Self {
            repository,
            registry,
            broadcaster,
        }
    }

    /// 接続の紐付けを外してルームから退出する
    ///
    /// # Returns
    ///
    /// * `Some(Removal)` - 退出した
    /// * `None` - 紐付けが無かった、またはプレイヤーが既にいなかった
    pub async fn execute(&self, connection_id: &ConnectionId) -> Option<Removal> {
        let binding = self.registry.unbind(connection_id).await?;
        self.depart(binding).await
    }

    /// 紐付け済みでないプレイヤーをルームから外し、残りのメンバーに通知する
    ///
    /// 呼び出し側は、事前に該当接続の紐付けを外すか別ルームへ付け替えておくこと。
    pub async fn depart(&self, binding: Binding) -> Option<Removal> {
        let removal = match self
            .repository
            .remove_player(&binding.room_id, &binding.player_id)
            .await
        {
            Ok(removal) => removal,
            Err(e) => {
                tracing::warn!(
                    "Stale binding {}/{} on leave: {}",
                    binding.room_id,
                    binding.player_id,
                    e
                );
                return None;
            }
        };

        let departed = &removal.departure.player;
        tracing::info!(
            "Player '{}' ({}) left room {}",
            departed.name.as_str(),
            departed.id,
            binding.room_id
        );

        match &removal.remaining {
            None => {
                tracing::info!("Room {} is empty and was removed", binding.room_id);
            }
            Some(room) => {
                if let Some(new_host_id) = &removal.departure.new_host {
                    tracing::info!("Host of room {} passed to {}", room.id, new_host_id);
                    let event = ServerEvent::HostChanged {
                        new_host_id: new_host_id.clone(),
                        room: room.clone(),
                    };
                    self.broadcaster.to_room(&room.id, &event, None).await;
                }

                let event = ServerEvent::PlayerLeft {
                    player_id: departed.id.clone(),
                    player_name: departed.name.clone(),
                    room: room.clone(),
                };
                self.broadcaster.to_room(&room.id, &event, None).await;
            }
        }

        Some(removal)
    }
}
