//! Value objects
//!
//! Identifiers and small validated values used by the room state machine.
//! Most of them are opaque strings; only `RoomId` carries a format rule.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ValueObjectError;

/// Unix timestamp in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// Room code: exactly six ASCII digits, suitable for dictation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomId(String);

impl RoomId {
    pub const LEN: usize = 6;

    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.len() != Self::LEN || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValueObjectError::InvalidRoomId(value));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for RoomId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Random room code generator.
///
/// Codes are drawn from `100000..=999999` so they never start with a zero.
pub struct RoomIdFactory;

impl RoomIdFactory {
    /// How many fresh codes `generate_unique` tries before giving up.
    pub const MAX_ATTEMPTS: usize = 32;

    pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> RoomId {
        RoomId(rng.gen_range(100_000..=999_999u32).to_string())
    }

    /// Draw codes until one is not taken according to `is_taken`.
    ///
    /// Returns `None` when every attempt collided.
    pub fn generate_unique<R, F>(rng: &mut R, mut is_taken: F) -> Option<RoomId>
    where
        R: Rng + ?Sized,
        F: FnMut(&RoomId) -> bool,
    {
        for _ in 0..Self::MAX_ATTEMPTS {
            let candidate = Self::generate_with(rng);
            if !is_taken(&candidate) {
                return Some(candidate);
            }
            tracing::debug!("Room id {} already in use, retrying", candidate);
        }
        None
    }
}

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: String) -> Result<Self, ValueObjectError> {
                if value.trim().is_empty() {
                    return Err(ValueObjectError::Empty(stringify!($name)));
                }
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValueObjectError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

opaque_id!(
    /// Player identity, unique for the lifetime of the process.
    PlayerId
);
opaque_id!(
    /// Handle of one live WebSocket connection.
    ConnectionId
);
opaque_id!(
    /// Identifier of a scenario in the script catalog.
    ScriptId
);
opaque_id!(
    /// Identifier of a scenario character.
    CharacterId
);
opaque_id!(
    /// Identifier of a clue; never validated against the script.
    ClueId
);

impl PlayerId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl ConnectionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl ScriptId {
    /// A script id as the client sent it, without validation.
    ///
    /// Rooms accept any script id; an unknown one simply resolves to no script.
    pub fn opaque(value: String) -> Self {
        Self(value)
    }
}

/// Phase token. Any string is accepted; ordering is client policy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Phase(String);

impl Phase {
    /// Phase sequence used when a script declares none.
    pub const DEFAULT_SEQUENCE: [&'static str; 6] =
        ["IDLE", "READING", "SEARCH", "DISCUSSION", "VOTE", "REVEAL"];

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn initial() -> Self {
        Self::new(Self::DEFAULT_SEQUENCE[0])
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Display name with the role-dependent default applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerName(String);

impl PlayerName {
    pub const DEFAULT_HOST: &'static str = "房主";
    pub const DEFAULT_GUEST: &'static str = "玩家";

    /// Name for a room creator; blank input falls back to `房主`.
    pub fn for_host(raw: Option<String>) -> Self {
        Self::or_default(raw, Self::DEFAULT_HOST)
    }

    /// Name for a joiner; blank input falls back to `玩家`.
    pub fn for_guest(raw: Option<String>) -> Self {
        Self::or_default(raw, Self::DEFAULT_GUEST)
    }

    fn or_default(raw: Option<String>, default: &str) -> Self {
        match raw {
            Some(name) if !name.trim().is_empty() => Self(name),
            _ => Self(default.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}
