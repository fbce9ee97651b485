//! Room-scoped fan-out.
//!
//! Delivery is best-effort: a connection whose writer has gone away is
//! skipped, never queued. Every broadcast carries current state, so a client
//! that missed one catches up on the next.

use std::sync::Arc;

use crate::domain::{ConnectionId, ConnectionRegistry, MessagePusher, RoomId, ServerEvent};

/// A room event held back until the requester has its reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingBroadcast {
    room_id: RoomId,
    event: ServerEvent,
}

impl PendingBroadcast {
    pub fn new(room_id: RoomId, event: ServerEvent) -> Self {
        Self { room_id, event }
    }
}

pub struct Broadcaster {
    registry: Arc<dyn ConnectionRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl Broadcaster {
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// Deliver `event` to every connection bound to `room_id` except `exclude`.
    ///
    /// Returns the connections the event was handed to.
    pub async fn to_room(
        &self,
        room_id: &RoomId,
        event: &ServerEvent,
        exclude: Option<&ConnectionId>,
    ) -> Vec<ConnectionId> {
        let targets: Vec<ConnectionId> = self
            .registry
            .connections_in_room(room_id)
            .await
            .into_iter()
            .filter(|id| Some(id) != exclude)
            .collect();

        if targets.is_empty() {
            tracing::debug!("No recipients for {} in room {}", event.kind(), room_id);
            return targets;
        }

        if let Err(e) = self
            .message_pusher
            .broadcast(targets.clone(), event)
            .await
        {
            tracing::warn!("Failed to broadcast {} to room {}: {}", event.kind(), room_id, e);
        }
        targets
    }

    /// Send a held-back event to the whole room, requester included.
    pub async fn deliver(&self, pending: PendingBroadcast) -> Vec<ConnectionId> {
        self.to_room(&pending.room_id, &pending.event, None).await
    }
}
