//! UseCase: チャット中継
//!
//! 送信者への応答を先に返し、その後で本人を含む全員に `chat:message` を配信する。
//! そのためここでは送信者を解決して配信待ちのイベントを作るだけで、配信は呼び出し側が行う。
//! ルームに居ない接続からのチャットはエラーにせず、何も配信しない。

use std::sync::Arc;

use jubensha_shared::time::Clock;

use crate::domain::{ConnectionId, ConnectionRegistry, RoomRepository, ServerEvent};

use super::{PendingBroadcast, now};

pub struct SendChatUseCase {
    repository: Arc<dyn RoomRepository>,
    registry: Arc<dyn ConnectionRegistry>,
    clock: Arc<dyn Clock>,
}

impl SendChatUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        registry: Arc<dyn ConnectionRegistry>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            registry,
            clock,
        }
    }

    /// 送信者を解決する。ルームに居なければ `None`。
    pub async fn prepare(
        &self,
        connection_id: &ConnectionId,
        message: String,
    ) -> Option<PendingBroadcast> {
        let binding = self.registry.binding(connection_id).await?;
        let Some((room_id, player)) = self.repository.find_player(&binding.player_id).await else {
            tracing::warn!(
                "Chat from '{}' dropped: player {} not found",
                connection_id,
                binding.player_id
            );
            return None;
        };

        tracing::debug!("Relaying chat in room {}", room_id);
        Some(PendingBroadcast::new(
            room_id,
            ServerEvent::ChatMessage {
                player_id: player.id,
                player_name: player.name,
                message,
                timestamp: now(&*self.clock),
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::testing::{NOW, TestContext};

    fn usecase(ctx: &TestContext) -> SendChatUseCase {
        SendChatUseCase::new(
            ctx.repository.clone(),
            ctx.registry.clone(),
            ctx.clock.clone(),
        )
    }

    #[tokio::test]
    async fn test_chat_reaches_everyone_including_sender() {
        // テスト項目: チャットは送信者を含む全員にサーバー時刻付きで届く
        // given (前提条件):
        let ctx = TestContext::new();
        let mut host_rx = ctx.connect("host").await;
        let mut guest_rx = ctx.connect("guest").await;
        let (room, host) = ctx.host_room("host", 4).await;
        ctx.join("guest", &room).await;
        host_rx.drain();

        // when (操作):
        let pending = usecase(&ctx)
            .prepare(&TestContext::conn("host"), "大家好".to_string())
            .await
            .unwrap();
        assert!(host_rx.drain().is_empty());
        ctx.broadcaster().deliver(pending).await;

        // then (期待する結果):
        for rx in [&mut host_rx, &mut guest_rx] {
            let pushed = rx.drain();
            assert_eq!(pushed.len(), 1);
            assert_eq!(pushed[0]["type"], "chat:message");
            assert_eq!(pushed[0]["data"]["playerId"], host.id.as_str());
            assert_eq!(pushed[0]["data"]["playerName"], "host");
            assert_eq!(pushed[0]["data"]["message"], "大家好");
            assert_eq!(pushed[0]["data"]["timestamp"], NOW);
        }
    }

    #[tokio::test]
    async fn test_chat_without_room_is_dropped() {
        // テスト項目: ルームに居ない接続のチャットは配信されない
        // given (前提条件):
        let ctx = TestContext::new();
        let mut rx = ctx.connect("lonely").await;

        // when (操作):
        let pending = usecase(&ctx)
            .prepare(&TestContext::conn("lonely"), "hello?".to_string())
            .await;

        // then (期待する結果):
        assert!(pending.is_none());
        assert!(rx.drain().is_empty());
    }
}
