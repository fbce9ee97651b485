//! Domain errors.
//!
//! `GameError` is the protocol-visible taxonomy: its `Display` text is sent
//! verbatim as the `error` field of a correlated reply.

use thiserror::Error;

/// Failure of a room or game operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("Room not found")]
    RoomNotFound,

    #[error("Room is full")]
    RoomFull,

    #[error("Game already started")]
    GameAlreadyStarted,

    /// A non-host attempted a host-only action.
    #[error("Only host can start the game")]
    NotAuthorized,

    /// The connection has no room association.
    #[error("Not in a room")]
    NotInRoom,

    /// Association present but the player record is gone; bookkeeping bug.
    #[error("Player not found")]
    PlayerNotFound,

    #[error("Script not found")]
    ScriptNotFound,

    #[error("Invalid payload for '{kind}': {reason}")]
    InvalidPayload { kind: String, reason: String },

    #[error("No free room id available")]
    RoomIdExhausted,
}

/// Validation failure when constructing a value object.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("Room id must be exactly 6 digits: '{0}'")]
    InvalidRoomId(String),

    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// Failure to deliver a message to a connection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("Connection not found: {0}")]
    ConnectionNotFound(String),

    #[error("Failed to push message: {0}")]
    PushFailed(String),

    #[error("Failed to encode message: {0}")]
    Encode(String),
}
