//! Connection Registry
//!
//! Tracks which room and player each live connection is bound to, plus the
//! liveness flag used by the heartbeat.

use async_trait::async_trait;

use super::value_object::{ConnectionId, PlayerId, RoomId, Timestamp};

/// Room/player association of a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub room_id: RoomId,
    pub player_id: PlayerId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub id: ConnectionId,
    pub binding: Option<Binding>,
    /// Cleared on every sweep, set again on pong.
    pub alive: bool,
    pub connected_at: Timestamp,
}

impl Connection {
    pub fn new(id: ConnectionId, connected_at: Timestamp) -> Self {
        Self {
            id,
            binding: None,
            alive: true,
            connected_at,
        }
    }
}

#[async_trait]
pub trait ConnectionRegistry: Send + Sync {
    async fn register(&self, connection_id: ConnectionId, connected_at: Timestamp);

    async fn unregister(&self, connection_id: &ConnectionId) -> Option<Connection>;

    /// Set the association. Returns `false` if the connection is unknown.
    async fn bind(&self, connection_id: &ConnectionId, binding: Binding) -> bool;

    /// Clear and return the association.
    async fn unbind(&self, connection_id: &ConnectionId) -> Option<Binding>;

    async fn binding(&self, connection_id: &ConnectionId) -> Option<Binding>;

    /// Every connection currently bound to `room_id`.
    async fn connections_in_room(&self, room_id: &RoomId) -> Vec<ConnectionId>;

    /// Every registered connection.
    async fn connection_ids(&self) -> Vec<ConnectionId>;

    async fn mark_alive(&self, connection_id: &ConnectionId);

    /// Start a liveness round.
    ///
    /// Returns the connections that did not answer the previous ping and
    /// clears the flag on all others.
    async fn sweep_liveness(&self) -> Vec<ConnectionId>;
}
