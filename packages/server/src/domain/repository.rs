//! Repository trait 定義
//!
//! Room Store と Player Directory へのインターフェース。
//! 各メソッドは一つの状態遷移を丸ごと（ロック一回で）適用するため、
//! UseCase 側で読み取りと書き込みの間に他の接続の処理が割り込むことはない。

use async_trait::async_trait;

use super::{
    entity::{Departure, Player, Room},
    error::GameError,
    value_object::{CharacterId, ClueId, Phase, PlayerId, RoomId, ScriptId, Timestamp},
};

/// Outcome of removing a player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    pub departure: Departure,
    /// Snapshot after removal; `None` when the room was deleted.
    pub remaining: Option<Room>,
}

/// Room Repository trait
///
/// UseCase 層はこの trait に依存し、Infrastructure 層の具体的な実装には依存しない。
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// 新しいルームを作成（ルーム ID の採番もここで行う）
    async fn create_room(
        &self,
        host: Player,
        script_id: ScriptId,
        max_players: usize,
        initial_phase: Phase,
        created_at: Timestamp,
    ) -> Result<Room, GameError>;

    /// 参加者を追加し、追加後のスナップショットを返す
    async fn join_room(&self, room_id: &RoomId, player: Player) -> Result<Room, GameError>;

    /// 参加者を削除（ホスト継承・空ルーム削除を含む）
    async fn remove_player(
        &self,
        room_id: &RoomId,
        player_id: &PlayerId,
    ) -> Result<Removal, GameError>;

    /// 準備状態を更新
    async fn set_ready(
        &self,
        room_id: &RoomId,
        player_id: &PlayerId,
        ready: bool,
    ) -> Result<(Player, Room), GameError>;

    /// ゲーム開始（キャラクター割り当てを含む）
    async fn start_game(
        &self,
        room_id: &RoomId,
        actor: &PlayerId,
        characters: &[CharacterId],
        now: Timestamp,
    ) -> Result<Room, GameError>;

    /// 現在のフェーズを記録
    async fn record_phase(&self, room_id: &RoomId, phase: Phase) -> Result<Room, GameError>;

    /// 発見済み手がかりを記録（新規なら true）
    async fn record_clue(&self, room_id: &RoomId, clue_id: ClueId) -> Result<bool, GameError>;

    /// ルームのスナップショットを取得
    async fn get_room(&self, room_id: &RoomId) -> Result<Room, GameError>;

    /// 全ルームのスナップショットを取得（作成順）
    async fn list_rooms(&self) -> Vec<Room>;

    /// Player Directory からプレイヤーを引く
    async fn find_player(&self, player_id: &PlayerId) -> Option<(RoomId, Player)>;
}
