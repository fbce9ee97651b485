//! Domain layer: entities, value objects, events and the traits the use
//! cases depend on.

pub mod assignment;
pub mod connection;
pub mod entity;
pub mod error;
pub mod event;
pub mod message_pusher;
pub mod repository;
pub mod script;
pub mod value_object;

pub use connection::{Binding, Connection, ConnectionRegistry};
pub use entity::{Departure, GameProgress, Player, PlayerStatus, Room, RoomStatus};
pub use error::{GameError, MessagePushError, ValueObjectError};
pub use event::ServerEvent;
pub use message_pusher::{
    KillSwitch, MessagePusher, OutboundFrame, PusherChannel, PusherReceiver, pusher_channel,
};
pub use repository::{Removal, RoomRepository};
pub use script::{
    CharacterConfig, OptionalCharacter, Script, ScriptCatalog, ScriptCharacter, ScriptSummary,
};
pub use value_object::{
    CharacterId, ClueId, ConnectionId, Phase, PlayerId, PlayerName, RoomId, RoomIdFactory,
    ScriptId, Timestamp,
};
