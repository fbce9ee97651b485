//! Server state and dependency wiring.

use std::sync::Arc;

use jubensha_shared::time::Clock;
use tokio::sync::Mutex;

use crate::{
    domain::{ConnectionRegistry, MessagePusher, RoomRepository, ScriptCatalog},
    usecase::{
        Broadcaster, BrowseScriptsUseCase, ConnectParticipantUseCase, CreateRoomUseCase,
        DisconnectParticipantUseCase, DiscoverClueUseCase, GetRoomsUseCase, JoinRoomUseCase,
        LeaveRoomUseCase, SendChatUseCase, SetReadyUseCase, StartGameUseCase,
        SweepConnectionsUseCase, UpdatePhaseUseCase,
    },
};

/// Shared application state
pub struct AppState {
    pub connect_participant_usecase: Arc<ConnectParticipantUseCase>,
    pub disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
    pub create_room_usecase: Arc<CreateRoomUseCase>,
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    pub leave_room_usecase: Arc<LeaveRoomUseCase>,
    pub set_ready_usecase: Arc<SetReadyUseCase>,
    pub start_game_usecase: Arc<StartGameUseCase>,
    pub update_phase_usecase: Arc<UpdatePhaseUseCase>,
    pub discover_clue_usecase: Arc<DiscoverClueUseCase>,
    pub send_chat_usecase: Arc<SendChatUseCase>,
    pub browse_scripts_usecase: Arc<BrowseScriptsUseCase>,
    pub get_rooms_usecase: Arc<GetRoomsUseCase>,
    pub sweep_connections_usecase: Arc<SweepConnectionsUseCase>,
    /// 応答の後に回したルーム配信を送る
    pub broadcaster: Arc<Broadcaster>,
    /// MessagePusher（応答の送信に使う）
    pub message_pusher: Arc<dyn MessagePusher>,
    /// Serializes every handler that touches rooms or bindings.
    pub dispatch_lock: Mutex<()>,
}

impl AppState {
    /// Wire every use case on top of the given infrastructure.
    pub fn build(
        repository: Arc<dyn RoomRepository>,
        registry: Arc<dyn ConnectionRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        catalog: Arc<dyn ScriptCatalog>,
        clock: Arc<dyn Clock>,
        default_max_players: usize,
    ) -> Self {
        let broadcaster = Arc::new(Broadcaster::new(registry.clone(), message_pusher.clone()));
        let leave_room_usecase = Arc::new(LeaveRoomUseCase::new(
            repository.clone(),
            registry.clone(),
            broadcaster.clone(),
        ));

        Self {
            connect_participant_usecase: Arc::new(ConnectParticipantUseCase::new(
                registry.clone(),
                message_pusher.clone(),
                clock.clone(),
            )),
            disconnect_participant_usecase: Arc::new(DisconnectParticipantUseCase::new(
                leave_room_usecase.clone(),
                registry.clone(),
                message_pusher.clone(),
            )),
            create_room_usecase: Arc::new(CreateRoomUseCase::new(
                repository.clone(),
                registry.clone(),
                leave_room_usecase.clone(),
                catalog.clone(),
                clock.clone(),
                default_max_players,
            )),
            join_room_usecase: Arc::new(JoinRoomUseCase::new(
                repository.clone(),
                registry.clone(),
                broadcaster.clone(),
                leave_room_usecase.clone(),
                clock.clone(),
            )),
            set_ready_usecase: Arc::new(SetReadyUseCase::new(
                repository.clone(),
                registry.clone(),
            )),
            start_game_usecase: Arc::new(StartGameUseCase::new(
                repository.clone(),
                registry.clone(),
                catalog.clone(),
                clock.clone(),
            )),
            update_phase_usecase: Arc::new(UpdatePhaseUseCase::new(
                repository.clone(),
                registry.clone(),
            )),
            discover_clue_usecase: Arc::new(DiscoverClueUseCase::new(
                repository.clone(),
                registry.clone(),
            )),
            send_chat_usecase: Arc::new(SendChatUseCase::new(
                repository.clone(),
                registry.clone(),
                clock,
            )),
            browse_scripts_usecase: Arc::new(BrowseScriptsUseCase::new(catalog)),
            get_rooms_usecase: Arc::new(GetRoomsUseCase::new(repository)),
            sweep_connections_usecase: Arc::new(SweepConnectionsUseCase::new(
                registry,
                message_pusher.clone(),
            )),
            leave_room_usecase,
            broadcaster,
            message_pusher,
            dispatch_lock: Mutex::new(()),
        }
    }
}
