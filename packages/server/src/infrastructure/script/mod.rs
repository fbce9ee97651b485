//! スクリプト（剧本）カタログの実装

pub mod catalog;

pub use catalog::{ScriptLoadError, StaticScriptCatalog, parse_script};
