//! Domain entities: `Player` and `Room`.
//!
//! All membership rules live on `Room` so that a repository can apply a
//! whole transition under one lock:
//!
//! - exactly one host while the room has members
//! - `players.len() <= max_players` after every join
//! - players only join while the room is `Waiting`
//! - characters are assigned once, when the game starts

use rand::Rng;

use super::{
    assignment::assign_characters,
    error::GameError,
    value_object::{CharacterId, ClueId, Phase, PlayerId, PlayerName, RoomId, ScriptId, Timestamp},
};

/// Connection state of a player as seen by the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerStatus {
    Online,
}

/// Lifecycle of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomStatus {
    Waiting,
    Playing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub name: PlayerName,
    pub is_host: bool,
    pub status: PlayerStatus,
    pub is_ready: bool,
    pub character_id: Option<CharacterId>,
    pub joined_at: Timestamp,
}

impl Player {
    /// A fresh online player with a newly generated id.
    pub fn new(name: PlayerName, is_host: bool, joined_at: Timestamp) -> Self {
        Self::with_id(PlayerId::generate(), name, is_host, joined_at)
    }

    pub fn with_id(id: PlayerId, name: PlayerName, is_host: bool, joined_at: Timestamp) -> Self {
        Self {
            id,
            name,
            is_host,
            status: PlayerStatus::Online,
            is_ready: false,
            character_id: None,
            joined_at,
        }
    }
}

/// Shared narrative state of a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameProgress {
    pub phase: Phase,
    /// Deduplicated, in discovery order.
    pub discovered_clues: Vec<ClueId>,
}

impl GameProgress {
    pub fn new(initial_phase: Phase) -> Self {
        Self {
            phase: initial_phase,
            discovered_clues: Vec::new(),
        }
    }
}

/// Result of removing a player from a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    pub player: Player,
    /// Set when the departing player was host and someone remains.
    pub new_host: Option<PlayerId>,
    /// The room has no members left and must be dropped.
    pub room_emptied: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: RoomId,
    pub host_id: PlayerId,
    pub script_id: ScriptId,
    pub max_players: usize,
    /// Join order; the first entry is the next host on succession.
    pub players: Vec<Player>,
    pub status: RoomStatus,
    pub progress: GameProgress,
    pub created_at: Timestamp,
    pub game_started_at: Option<Timestamp>,
}

impl Room {
    /// Create a room whose only member is `host`.
    pub fn new(
        id: RoomId,
        mut host: Player,
        script_id: ScriptId,
        max_players: usize,
        initial_phase: Phase,
        created_at: Timestamp,
    ) -> Self {
        host.is_host = true;
        Self {
            id,
            host_id: host.id.clone(),
            script_id,
            max_players,
            players: vec![host],
            status: RoomStatus::Waiting,
            progress: GameProgress::new(initial_phase),
            created_at,
            game_started_at: None,
        }
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= self.max_players
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn find_player(&self, player_id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == player_id)
    }

    pub fn host(&self) -> Option<&Player> {
        self.find_player(&self.host_id)
    }

    /// Append a non-host player.
    ///
    /// Capacity is checked before status, so a full room reports `RoomFull`
    /// even once the game is running.
    pub fn add_player(&mut self, mut player: Player) -> Result<(), GameError> {
        if self.is_full() {
            return Err(GameError::RoomFull);
        }
        if self.status != RoomStatus::Waiting {
            return Err(GameError::GameAlreadyStarted);
        }
        player.is_host = false;
        self.players.push(player);
        Ok(())
    }

    /// Remove a player and hand the host role to the earliest remaining member.
    ///
    /// Returns `None` if the player is not a member.
    pub fn remove_player(&mut self, player_id: &PlayerId) -> Option<Departure> {
        let index = self.players.iter().position(|p| &p.id == player_id)?;
        let player = self.players.remove(index);

        let mut new_host = None;
        if player.is_host {
            if let Some(successor) = self.players.first_mut() {
                successor.is_host = true;
                self.host_id = successor.id.clone();
                new_host = Some(successor.id.clone());
            }
        }

        Some(Departure {
            player,
            new_host,
            room_emptied: self.players.is_empty(),
        })
    }

    pub fn set_ready(&mut self, player_id: &PlayerId, ready: bool) -> Result<&Player, GameError> {
        let player = self
            .players
            .iter_mut()
            .find(|p| &p.id == player_id)
            .ok_or(GameError::PlayerNotFound)?;
        player.is_ready = ready;
        Ok(player)
    }

    /// Host-only transition from `Waiting` to `Playing`.
    ///
    /// Non-host members receive characters in membership order from a
    /// shuffled copy of `characters`. Readiness is not checked.
    pub fn start_game<R: Rng + ?Sized>(
        &mut self,
        actor: &PlayerId,
        characters: &[CharacterId],
        rng: &mut R,
        now: Timestamp,
    ) -> Result<(), GameError> {
        if &self.host_id != actor {
            return Err(GameError::NotAuthorized);
        }
        if self.status != RoomStatus::Waiting {
            return Err(GameError::GameAlreadyStarted);
        }
        assign_characters(&mut self.players, characters, rng);
        self.status = RoomStatus::Playing;
        self.game_started_at = Some(now);
        Ok(())
    }

    /// Record the phase verbatim; ordering is not validated.
    pub fn record_phase(&mut self, phase: Phase) {
        self.progress.phase = phase;
    }

    /// Record a clue. Returns `false` if it was already discovered.
    pub fn record_clue(&mut self, clue_id: ClueId) -> bool {
        if self.progress.discovered_clues.contains(&clue_id) {
            return false;
        }
        self.progress.discovered_clues.push(clue_id);
        true
    }
}
