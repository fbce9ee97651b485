//! Client-side phase ordering.
//!
//! The server records any phase token it is given, so deciding what comes
//! next is up to the client.

use serde_json::Value;

pub const DEFAULT_PHASES: [&str; 6] = ["IDLE", "READING", "SEARCH", "DISCUSSION", "VOTE", "REVEAL"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseCursor {
    phases: Vec<String>,
}

impl Default for PhaseCursor {
    fn default() -> Self {
        Self {
            phases: DEFAULT_PHASES.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl PhaseCursor {
    /// Phase order declared by a script document (`phases[].id`), or the
    /// default order when it declares none.
    pub fn from_script(script: &Value) -> Self {
        let phases: Vec<String> = script["phases"]
            .as_array()
            .map(|phases| {
                phases
                    .iter()
                    .filter_map(|phase| phase["id"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();

        if phases.is_empty() {
            Self::default()
        } else {
            Self { phases }
        }
    }

    pub fn phases(&self) -> &[String] {
        &self.phases
    }

    /// The phase after `current`. Wraps to the first phase when `current` is
    /// the last one or not in the list.
    pub fn next(&self, current: &str) -> &str {
        let next = self
            .phases
            .iter()
            .position(|phase| phase == current)
            .and_then(|index| self.phases.get(index + 1))
            .or_else(|| self.phases.first());
        next.map(String::as_str).unwrap_or(DEFAULT_PHASES[0])
    }
}
