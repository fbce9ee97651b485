//! InMemory Connection Registry 実装
//!
//! 接続 ID → Connection のマップ。ルームへの紐付けと生存フラグを保持する。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{Binding, Connection, ConnectionId, ConnectionRegistry, RoomId, Timestamp};

/// インメモリ Connection Registry 実装
pub struct InMemoryConnectionRegistry {
    connections: Mutex<HashMap<ConnectionId, Connection>>,
}

impl InMemoryConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConnectionRegistry for InMemoryConnectionRegistry {
    async fn register(&self, connection_id: ConnectionId, connected_at: Timestamp) {
        let mut connections = self.connections.lock().await;
        connections.insert(
            connection_id.clone(),
            Connection::new(connection_id, connected_at),
        );
    }

    async fn unregister(&self, connection_id: &ConnectionId) -> Option<Connection> {
        self.connections.lock().await.remove(connection_id)
    }

    async fn bind(&self, connection_id: &ConnectionId, binding: Binding) -> bool {
        let mut connections = self.connections.lock().await;
        match connections.get_mut(connection_id) {
            Some(connection) => {
                connection.binding = Some(binding);
                true
            }
            None => false,
        }
    }

    async fn unbind(&self, connection_id: &ConnectionId) -> Option<Binding> {
        let mut connections = self.connections.lock().await;
        connections
            .get_mut(connection_id)
            .and_then(|connection| connection.binding.take())
    }

    async fn binding(&self, connection_id: &ConnectionId) -> Option<Binding> {
        let connections = self.connections.lock().await;
        connections
            .get(connection_id)
            .and_then(|connection| connection.binding.clone())
    }

    async fn connections_in_room(&self, room_id: &RoomId) -> Vec<ConnectionId> {
        let connections = self.connections.lock().await;
        let mut members: Vec<&Connection> = connections
            .values()
            .filter(|c| c.binding.as_ref().is_some_and(|b| &b.room_id == room_id))
            .collect();
        // Stable fan-out order.
        members.sort_by(|a, b| {
            a.connected_at
                .cmp(&b.connected_at)
                .then_with(|| a.id.as_str().cmp(b.id.as_str()))
        });
        members.into_iter().map(|c| c.id.clone()).collect()
    }

    async fn connection_ids(&self) -> Vec<ConnectionId> {
        self.connections.lock().await.keys().cloned().collect()
    }

    async fn mark_alive(&self, connection_id: &ConnectionId) {
        let mut connections = self.connections.lock().await;
        if let Some(connection) = connections.get_mut(connection_id) {
            connection.alive = true;
        }
    }

    async fn sweep_liveness(&self) -> Vec<ConnectionId> {
        let mut connections = self.connections.lock().await;
        let mut stale = Vec::new();
        for connection in connections.values_mut() {
            if connection.alive {
                connection.alive = false;
            } else {
                stale.push(connection.id.clone());
            }
        }
        stale
    }
}
