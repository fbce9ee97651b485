//! UseCase: スクリプトの参照（`script:list` / `script:get` と HTTP API）

use std::sync::Arc;

use crate::domain::{GameError, Script, ScriptCatalog, ScriptId, ScriptSummary};

pub struct BrowseScriptsUseCase {
    catalog: Arc<dyn ScriptCatalog>,
}

impl BrowseScriptsUseCase {
    pub fn new(catalog: Arc<dyn ScriptCatalog>) -> Self {
        Self { catalog }
    }

    pub fn list(&self) -> Vec<ScriptSummary> {
        self.catalog.summaries()
    }

    pub fn get(&self, script_id: &str) -> Result<Script, GameError> {
        let id = ScriptId::new(script_id.to_string()).map_err(|_| GameError::ScriptNotFound)?;
        self.catalog.get_script(&id).ok_or(GameError::ScriptNotFound)
    }
}
