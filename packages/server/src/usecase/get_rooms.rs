//! UseCase: ルーム情報の取得（HTTP API 用）

use std::sync::Arc;

use crate::domain::{GameError, Room, RoomId, RoomRepository};

pub struct GetRoomsUseCase {
    repository: Arc<dyn RoomRepository>,
}

impl GetRoomsUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// 全ルーム（作成順）
    pub async fn execute(&self) -> Vec<Room> {
        self.repository.list_rooms().await
    }

    pub async fn get(&self, room_id: &str) -> Result<Room, GameError> {
        let room_id = RoomId::new(room_id.to_string()).map_err(|_| GameError::RoomNotFound)?;
        self.repository.get_room(&room_id).await
    }
}
