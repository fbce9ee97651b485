//! Static Script Catalog 実装
//!
//! スクリプト（剧本）は JSON ドキュメントとして読み込む。ルーム管理が使うのは
//! 概要・キャラクター一覧と人数別の構成設定・フェーズ順だけで、それ以外のフィールドは
//! `script:get` でそのまま返せるようドキュメントごと保持する。

use std::{fs, path::Path};

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::domain::{
    CharacterConfig, CharacterId, OptionalCharacter, Phase, Script, ScriptCatalog,
    ScriptCharacter, ScriptId, ScriptSummary,
};

const ESTHER_STORY: &str = include_str!("../../../scripts/esther-story.json");
const ACHAN_STORY: &str = include_str!("../../../scripts/achan-story.json");

#[derive(Debug, Error)]
pub enum ScriptLoadError {
    #[error("Failed to read script '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse script '{origin}': {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid script '{origin}': {reason}")]
    Invalid { origin: String, reason: String },
}

/// Typed view of the fields the room core reads.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScriptDocument {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
    max_players: usize,
    #[serde(default)]
    min_players: usize,
    #[serde(default)]
    estimated_time: u32,
    #[serde(default)]
    difficulty: String,
    #[serde(default)]
    theme: Option<Value>,
    #[serde(default)]
    characters: Vec<CharacterDocument>,
    #[serde(default)]
    character_config: Option<CharacterConfigDocument>,
    #[serde(default)]
    phases: Vec<IdOnly>,
}

#[derive(Debug, Deserialize)]
struct IdOnly {
    id: String,
}

#[derive(Debug, Deserialize)]
struct CharacterDocument {
    id: String,
    #[serde(default)]
    priority: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct CharacterConfigDocument {
    #[serde(default)]
    required: Vec<String>,
    #[serde(default)]
    optional: Vec<OptionalCharacterDocument>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OptionalCharacterDocument {
    character_id: String,
    min_players: usize,
}

/// Parse one script document.
pub fn parse_script(origin: &str, raw: &str) -> Result<Script, ScriptLoadError> {
    let document: Value = serde_json::from_str(raw).map_err(|source| ScriptLoadError::Parse {
        origin: origin.to_string(),
        source,
    })?;
    let typed: ScriptDocument =
        serde_json::from_value(document.clone()).map_err(|source| ScriptLoadError::Parse {
            origin: origin.to_string(),
            source,
        })?;

    let invalid = |reason: String| ScriptLoadError::Invalid {
        origin: origin.to_string(),
        reason,
    };

    let id = ScriptId::new(typed.id).map_err(|e| invalid(e.to_string()))?;
    let character_id = |raw: String| CharacterId::new(raw).map_err(|e| invalid(e.to_string()));
    let characters = typed
        .characters
        .into_iter()
        .map(|c| {
            Ok(ScriptCharacter {
                id: character_id(c.id)?,
                priority: c.priority,
            })
        })
        .collect::<Result<Vec<_>, ScriptLoadError>>()?;
    let character_config = typed
        .character_config
        .map(|config| {
            let required = config
                .required
                .into_iter()
                .map(character_id)
                .collect::<Result<Vec<_>, _>>()?;
            let optional = config
                .optional
                .into_iter()
                .map(|o| {
                    Ok(OptionalCharacter {
                        character_id: character_id(o.character_id)?,
                        min_players: o.min_players,
                    })
                })
                .collect::<Result<Vec<_>, ScriptLoadError>>()?;
            Ok::<_, ScriptLoadError>(CharacterConfig { required, optional })
        })
        .transpose()?;
    let phases = typed.phases.into_iter().map(|p| Phase::new(p.id)).collect();

    Ok(Script {
        summary: ScriptSummary {
            id,
            title: typed.title,
            description: typed.description,
            max_players: typed.max_players,
            min_players: typed.min_players,
            estimated_time: typed.estimated_time,
            difficulty: typed.difficulty,
            theme: typed.theme,
        },
        characters,
        character_config,
        phases,
        document,
    })
}

/// In-memory, read-only script collection.
#[derive(Debug, Clone, Default)]
pub struct StaticScriptCatalog {
    scripts: Vec<Script>,
}

impl StaticScriptCatalog {
    pub fn new(scripts: Vec<Script>) -> Self {
        Self { scripts }
    }

    /// The scripts bundled with the server.
    pub fn builtin() -> Result<Self, ScriptLoadError> {
        Ok(Self::new(vec![
            parse_script("esther-story.json", ESTHER_STORY)?,
            parse_script("achan-story.json", ACHAN_STORY)?,
        ]))
    }

    /// Load every `*.json` file in `dir`, in file-name order.
    pub fn from_dir(dir: &Path) -> Result<Self, ScriptLoadError> {
        let io_error = |source| ScriptLoadError::Io {
            path: dir.display().to_string(),
            source,
        };

        let mut paths = Vec::new();
        for entry in fs::read_dir(dir).map_err(io_error)? {
            let path = entry.map_err(io_error)?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut scripts = Vec::with_capacity(paths.len());
        for path in paths {
            let origin = path.display().to_string();
            let raw = fs::read_to_string(&path).map_err(|source| ScriptLoadError::Io {
                path: origin.clone(),
                source,
            })?;
            scripts.push(parse_script(&origin, &raw)?);
            tracing::debug!("Loaded script from {}", origin);
        }

        Ok(Self::new(scripts))
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}

impl ScriptCatalog for StaticScriptCatalog {
    fn get_script(&self, id: &ScriptId) -> Option<Script> {
        self.scripts.iter().find(|s| s.id() == id).cloned()
    }

    fn summaries(&self) -> Vec<ScriptSummary> {
        self.scripts.iter().map(|s| s.summary.clone()).collect()
    }
}
