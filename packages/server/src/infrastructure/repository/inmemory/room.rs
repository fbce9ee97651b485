//! InMemory Room Repository 実装
//!
//! ドメイン層が定義する RoomRepository trait の具体的な実装。
//! Room Store（ルーム ID → Room）と Player Directory（プレイヤー ID → ルーム ID）を
//! 一つの Mutex の内側に置き、両者が常に同期した状態で更新されるようにする。
//!
//! 不変条件: Player Directory にいるプレイヤーは、ちょうど一つのルームのメンバーである。

use std::collections::HashMap;

use async_trait::async_trait;
use rand::{SeedableRng, rngs::StdRng};
use tokio::sync::Mutex;

use crate::domain::{
    CharacterId, ClueId, GameError, Phase, Player, PlayerId, Removal, Room, RoomId,
    RoomIdFactory, RoomRepository, ScriptId, Timestamp,
};

struct Store {
    rooms: HashMap<RoomId, Room>,
    /// Player Directory
    players: HashMap<PlayerId, RoomId>,
    /// Room codes and character shuffles.
    rng: StdRng,
}

impl Store {
    fn room_mut(&mut self, room_id: &RoomId) -> Result<&mut Room, GameError> {
        self.rooms.get_mut(room_id).ok_or(GameError::RoomNotFound)
    }
}

/// インメモリ Room Repository 実装
pub struct InMemoryRoomRepository {
    store: Mutex<Store>,
}

impl InMemoryRoomRepository {
    /// 新しい InMemoryRoomRepository を作成
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// 乱数生成器を指定して作成（テストで結果を固定するため）
    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            store: Mutex::new(Store {
                rooms: HashMap::new(),
                players: HashMap::new(),
                rng,
            }),
        }
    }

    /// Player Directory の件数
    #[cfg(test)]
    pub async fn count_players(&self) -> usize {
        self.store.lock().await.players.len()
    }

    /// Room Store の件数
    #[cfg(test)]
    pub async fn count_rooms(&self) -> usize {
        self.store.lock().await.rooms.len()
    }
}

impl Default for InMemoryRoomRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn create_room(
        &self,
        host: Player,
        script_id: ScriptId,
        max_players: usize,
        initial_phase: Phase,
        created_at: Timestamp,
    ) -> Result<Room, GameError> {
        let mut store = self.store.lock().await;
        let Store { rooms, rng, .. } = &mut *store;
        let room_id = RoomIdFactory::generate_unique(rng, |id| rooms.contains_key(id))
            .ok_or(GameError::RoomIdExhausted)?;

        let room = Room::new(
            room_id.clone(),
            host,
            script_id,
            max_players,
            initial_phase,
            created_at,
        );
        store.players.insert(room.host_id.clone(), room_id.clone());
        store.rooms.insert(room_id, room.clone());

        Ok(room)
    }

    async fn join_room(&self, room_id: &RoomId, player: Player) -> Result<Room, GameError> {
        let mut store = self.store.lock().await;
        let player_id = player.id.clone();
        let room = store.room_mut(room_id)?;
        room.add_player(player)?;
        let snapshot = room.clone();
        store.players.insert(player_id, room_id.clone());

        Ok(snapshot)
    }

    async fn remove_player(
        &self,
        room_id: &RoomId,
        player_id: &PlayerId,
    ) -> Result<Removal, GameError> {
        let mut store = self.store.lock().await;
        let room = store.room_mut(room_id)?;
        let departure = room
            .remove_player(player_id)
            .ok_or(GameError::PlayerNotFound)?;
        let remaining = if departure.room_emptied {
            None
        } else {
            Some(room.clone())
        };

        store.players.remove(player_id);
        if departure.room_emptied {
            store.rooms.remove(room_id);
            tracing::debug!("Room {} removed from store", room_id);
        }

        Ok(Removal {
            departure,
            remaining,
        })
    }

    async fn set_ready(
        &self,
        room_id: &RoomId,
        player_id: &PlayerId,
        ready: bool,
    ) -> Result<(Player, Room), GameError> {
        let mut store = self.store.lock().await;
        let room = store.room_mut(room_id)?;
        let player = room.set_ready(player_id, ready)?.clone();
        Ok((player, room.clone()))
    }

    async fn start_game(
        &self,
        room_id: &RoomId,
        actor: &PlayerId,
        characters: &[CharacterId],
        now: Timestamp,
    ) -> Result<Room, GameError> {
        let mut store = self.store.lock().await;
        let Store { rooms, rng, .. } = &mut *store;
        let room = rooms.get_mut(room_id).ok_or(GameError::RoomNotFound)?;
        room.start_game(actor, characters, rng, now)?;
        Ok(room.clone())
    }

    async fn record_phase(&self, room_id: &RoomId, phase: Phase) -> Result<Room, GameError> {
        let mut store = self.store.lock().await;
        let room = store.room_mut(room_id)?;
        room.record_phase(phase);
        Ok(room.clone())
    }

    async fn record_clue(&self, room_id: &RoomId, clue_id: ClueId) -> Result<bool, GameError> {
        let mut store = self.store.lock().await;
        let room = store.room_mut(room_id)?;
        Ok(room.record_clue(clue_id))
    }

    async fn get_room(&self, room_id: &RoomId) -> Result<Room, GameError> {
        let store = self.store.lock().await;
        store
            .rooms
            .get(room_id)
            .cloned()
            .ok_or(GameError::RoomNotFound)
    }

    async fn list_rooms(&self) -> Vec<Room> {
        let store = self.store.lock().await;
        let mut rooms: Vec<Room> = store.rooms.values().cloned().collect();
        rooms.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.as_str().cmp(b.id.as_str()))
        });
        rooms
    }

    async fn find_player(&self, player_id: &PlayerId) -> Option<(RoomId, Player)> {
        let store = self.store.lock().await;
        let room_id = store.players.get(player_id)?;
        let player = store.rooms.get(room_id)?.find_player(player_id)?.clone();
        Some((room_id.clone(), player))
    }
}
