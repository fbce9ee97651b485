//! Server-pushed events.
//!
//! Every event that mentions room membership carries a full `Room` snapshot,
//! so a client that missed an earlier push recovers on the next one.

use super::{
    entity::{Player, Room},
    value_object::{ClueId, ConnectionId, Phase, PlayerId, PlayerName, Timestamp},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// Sent once when the connection opens.
    Connected {
        connection_id: ConnectionId,
        timestamp: Timestamp,
    },
    PlayerJoined {
        player: Player,
        room: Room,
    },
    PlayerLeft {
        player_id: PlayerId,
        player_name: PlayerName,
        room: Room,
    },
    HostChanged {
        new_host_id: PlayerId,
        room: Room,
    },
    PlayerReady {
        player_id: PlayerId,
        player_name: PlayerName,
        is_ready: bool,
        room: Room,
    },
    GameStarted {
        room: Room,
    },
    PhaseChanged {
        phase: Phase,
        player_id: PlayerId,
    },
    ClueDiscovered {
        clue_id: ClueId,
        player_id: PlayerId,
    },
    ChatMessage {
        player_id: PlayerId,
        player_name: PlayerName,
        message: String,
        timestamp: Timestamp,
    },
    /// Failure notice with no request id to correlate to.
    Error {
        message: String,
    },
}

impl ServerEvent {
    /// Wire name of the event (`type` field of the push envelope).
    pub fn kind(&self) -> &'static str {
        match self {
            ServerEvent::Connected { .. } => "connected",
            ServerEvent::PlayerJoined { .. } => "room:playerJoined",
            ServerEvent::PlayerLeft { .. } => "room:playerLeft",
            ServerEvent::HostChanged { .. } => "room:hostChanged",
            ServerEvent::PlayerReady { .. } => "room:playerReady",
            ServerEvent::GameStarted { .. } => "game:started",
            ServerEvent::PhaseChanged { .. } => "game:phaseChanged",
            ServerEvent::ClueDiscovered { .. } => "game:clueDiscovered",
            ServerEvent::ChatMessage { .. } => "chat:message",
            ServerEvent::Error { .. } => "error",
        }
    }
}
