//! UseCase layer: one struct per client operation.
//!
//! Every use case depends only on the domain traits. Handlers are expected to
//! run one at a time (see `ui::handler::router`), so a use case may read the
//! connection binding and then mutate the room without further locking.

pub mod broadcaster;
pub mod browse_scripts;
pub mod connect_participant;
pub mod create_room;
pub mod disconnect_participant;
pub mod discover_clue;
pub mod get_rooms;
pub mod join_room;
pub mod leave_room;
pub mod send_chat;
pub mod set_ready;
pub mod start_game;
pub mod sweep_connections;
pub mod update_phase;

pub use broadcaster::{Broadcaster, PendingBroadcast};
pub use browse_scripts::BrowseScriptsUseCase;
pub use connect_participant::ConnectParticipantUseCase;
pub use create_room::{CreateRoomInput, CreateRoomUseCase};
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use discover_clue::DiscoverClueUseCase;
pub use get_rooms::GetRoomsUseCase;
pub use join_room::JoinRoomUseCase;
pub use leave_room::LeaveRoomUseCase;
pub use send_chat::SendChatUseCase;
pub use set_ready::SetReadyUseCase;
pub use start_game::StartGameUseCase;
pub use sweep_connections::SweepConnectionsUseCase;
pub use update_phase::UpdatePhaseUseCase;

use jubensha_shared::time::Clock;

use crate::domain::{Binding, ConnectionId, ConnectionRegistry, GameError, Timestamp};

pub(crate) fn now(clock: &dyn Clock) -> Timestamp {
    Timestamp::new(clock.now_millis())
}

/// Current binding of `connection_id`, or `NotInRoom`.
pub(crate) async fn require_binding(
    registry: &dyn ConnectionRegistry,
    connection_id: &ConnectionId,
) -> Result<Binding, GameError> {
    registry
        .binding(connection_id)
        .await
        .ok_or(GameError::NotInRoom)
}

#[cfg(test)]
pub(crate) mod testing;
