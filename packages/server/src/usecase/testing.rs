//! Shared fixtures for use case tests: real in-memory infrastructure wired
//! the same way the server wires it, with a fixed clock and a seeded RNG.

use std::sync::Arc;

use jubensha_shared::time::{Clock, FixedClock};
use rand::{SeedableRng, rngs::StdRng};
use serde_json::Value;

use crate::{
    domain::{
        ConnectionId, ConnectionRegistry, MessagePusher, OutboundFrame, Player, PusherReceiver,
        Room, ScriptCatalog, ScriptId, pusher_channel,
    },
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        repository::{InMemoryConnectionRegistry, InMemoryRoomRepository},
        script::StaticScriptCatalog,
    },
};

use super::{
    Broadcaster, CreateRoomInput, CreateRoomUseCase, JoinRoomUseCase, LeaveRoomUseCase, now,
};

pub(crate) const NOW: i64 = 1_700_000_000_000;
pub(crate) const DEFAULT_MAX_PLAYERS: usize = 6;

pub(crate) struct TestContext {
    pub repository: Arc<InMemoryRoomRepository>,
    pub registry: Arc<InMemoryConnectionRegistry>,
    pub message_pusher: Arc<WebSocketMessagePusher>,
    pub catalog: Arc<dyn ScriptCatalog>,
    pub clock: Arc<dyn Clock>,
}

/// Outbound side of a fake connection.
pub(crate) struct TestReceiver(PusherReceiver);

impl TestReceiver {
    /// Every text frame pushed so far, decoded.
    pub fn drain(&mut self) -> Vec<Value> {
        let mut messages = Vec::new();
        while let Ok(frame) = self.0.frames.try_recv() {
            if let OutboundFrame::Text(text) = frame {
                messages.push(serde_json::from_str(&text).unwrap());
            }
        }
        messages
    }

    /// Every raw frame pushed so far.
    pub fn frames(&mut self) -> Vec<OutboundFrame> {
        let mut frames = Vec::new();
        while let Ok(frame) = self.0.frames.try_recv() {
            frames.push(frame);
        }
        frames
    }

    /// Whether the connection was force-closed.
    pub fn is_terminated(&self) -> bool {
        self.0.kill.is_triggered()
    }

    /// `type` of every pushed message.
    pub fn kinds(&mut self) -> Vec<String> {
        self.drain()
            .into_iter()
            .map(|m| m["type"].as_str().unwrap_or_default().to_string())
            .collect()
    }
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_catalog(Arc::new(StaticScriptCatalog::builtin().unwrap()))
    }

    pub fn with_catalog(catalog: Arc<dyn ScriptCatalog>) -> Self {
        Self {
            repository: Arc::new(InMemoryRoomRepository::with_rng(StdRng::seed_from_u64(7))),
            registry: Arc::new(InMemoryConnectionRegistry::new()),
            message_pusher: Arc::new(WebSocketMessagePusher::new()),
            catalog,
            clock: Arc::new(FixedClock::new(NOW)),
        }
    }

    pub fn conn(id: &str) -> ConnectionId {
        ConnectionId::new(id.to_string()).unwrap()
    }

    pub fn esther() -> ScriptId {
        ScriptId::new("esther-story".to_string()).unwrap()
    }

    /// Register a fake connection in both the registry and the pusher.
    pub async fn connect(&self, id: &str) -> TestReceiver {
        let (tx, rx) = pusher_channel();
        self.registry
            .register(Self::conn(id), now(&*self.clock))
            .await;
        self.message_pusher.register_client(Self::conn(id), tx).await;
        TestReceiver(rx)
    }

    pub fn broadcaster(&self) -> Arc<Broadcaster> {
        Arc::new(Broadcaster::new(
            self.registry.clone(),
            self.message_pusher.clone(),
        ))
    }

    pub fn leave_room(&self) -> Arc<LeaveRoomUseCase> {
        Arc::new(LeaveRoomUseCase::new(
            self.repository.clone(),
            self.registry.clone(),
            self.broadcaster(),
        ))
    }

    pub fn create_room(&self) -> CreateRoomUseCase {
        CreateRoomUseCase::new(
            self.repository.clone(),
            self.registry.clone(),
            self.leave_room(),
            self.catalog.clone(),
            self.clock.clone(),
            DEFAULT_MAX_PLAYERS,
        )
    }

    pub fn join_room(&self) -> JoinRoomUseCase {
        JoinRoomUseCase::new(
            self.repository.clone(),
            self.registry.clone(),
            self.broadcaster(),
            self.leave_room(),
            self.clock.clone(),
        )
    }

    /// `connection` creates an esther-story room and becomes its host.
    pub async fn host_room(&self, connection: &str, max_players: usize) -> (Room, Player) {
        self.create_room()
            .execute(
                &Self::conn(connection),
                CreateRoomInput {
                    script_id: Self::esther(),
                    max_players: Some(max_players),
                    player_name: Some(connection.to_string()),
                },
            )
            .await
            .unwrap()
    }

    /// `connection` joins `room` under its own name.
    pub async fn join(&self, connection: &str, room: &Room) -> (Room, Player) {
        self.join_room()
            .execute(
                &Self::conn(connection),
                room.id.as_str(),
                Some(connection.to_string()),
            )
            .await
            .unwrap()
    }
}
