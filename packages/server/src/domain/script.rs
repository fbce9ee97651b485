//! Script (scenario) collaborator.
//!
//! Script content is external data. The room core only needs the character
//! roster (with its player-count rules), the declared phase order and a
//! summary for listings; the rest is carried as an opaque JSON document and
//! returned as-is by `script:get`.

use serde_json::Value;

use super::value_object::{CharacterId, Phase, ScriptId};

/// Listing entry for a script.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptSummary {
    pub id: ScriptId,
    pub title: String,
    pub description: String,
    pub max_players: usize,
    pub min_players: usize,
    pub estimated_time: u32,
    pub difficulty: String,
    pub theme: Option<Value>,
}

/// A character as declared by a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptCharacter {
    pub id: CharacterId,
    /// Lower comes first when the cast is cut down; unset sorts last.
    pub priority: Option<u32>,
}

/// An optional character that joins the cast from `min_players` on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionalCharacter {
    pub character_id: CharacterId,
    pub min_players: usize,
}

/// Which characters are in play for a given player count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterConfig {
    pub required: Vec<CharacterId>,
    pub optional: Vec<OptionalCharacter>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    pub summary: ScriptSummary,
    pub characters: Vec<ScriptCharacter>,
    pub character_config: Option<CharacterConfig>,
    pub phases: Vec<Phase>,
    /// The full script as loaded.
    pub document: Value,
}

impl Script {
    pub fn id(&self) -> &ScriptId {
        &self.summary.id
    }

    /// Declared phase order, or the default sequence if the script has none.
    pub fn phase_sequence(&self) -> Vec<Phase> {
        phase_sequence(Some(self))
    }

    pub fn initial_phase(&self) -> Phase {
        initial_phase(Some(self))
    }

    /// The cast for `player_count` players, at most `player_count` long.
    ///
    /// Without a config this is the first `player_count` declared characters.
    /// With one, the required characters plus every optional character whose
    /// `min_players` is reached, ordered by priority. Ids the config names but
    /// the script does not declare are skipped.
    pub fn characters_for(&self, player_count: usize) -> Vec<CharacterId> {
        let Some(config) = &self.character_config else {
            return self
                .characters
                .iter()
                .take(player_count)
                .map(|c| c.id.clone())
                .collect();
        };

        let required = self
            .characters
            .iter()
            .filter(|c| config.required.contains(&c.id));
        let optional = config
            .optional
            .iter()
            .filter(|o| player_count >= o.min_players)
            .filter_map(|o| self.characters.iter().find(|c| c.id == o.character_id));

        let mut cast: Vec<&ScriptCharacter> = required.chain(optional).collect();
        cast.sort_by_key(|c| c.priority.unwrap_or(u32::MAX));
        cast.into_iter()
            .take(player_count)
            .map(|c| c.id.clone())
            .collect()
    }
}

/// Phase order for an optional script.
pub fn phase_sequence(script: Option<&Script>) -> Vec<Phase> {
    match script {
        Some(script) if !script.phases.is_empty() => script.phases.clone(),
        _ => Phase::DEFAULT_SEQUENCE.iter().map(|p| Phase::new(*p)).collect(),
    }
}

pub fn initial_phase(script: Option<&Script>) -> Phase {
    phase_sequence(script)
        .into_iter()
        .next()
        .unwrap_or_else(Phase::initial)
}

/// Lookup interface over the script collection.
#[cfg_attr(test, mockall::automock)]
pub trait ScriptCatalog: Send + Sync {
    fn get_script(&self, id: &ScriptId) -> Option<Script>;

    fn summaries(&self) -> Vec<ScriptSummary>;
}
