//! Jubensha room server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin jubensha-server
//! cargo run --bin jubensha-server -- --host 0.0.0.0 --port 4000 --scripts-dir ./scripts
//! ```

use std::sync::Arc;

use clap::Parser;
use jubensha_server::{
    config::ServerConfig,
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        repository::{InMemoryConnectionRegistry, InMemoryRoomRepository},
        script::StaticScriptCatalog,
    },
    ui::{Server, state::AppState},
};
use jubensha_shared::{logger::setup_logger, time::SystemClock};

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let config = ServerConfig::parse();

    // Initialize dependencies in order:
    // 1. Script catalog
    // 2. Repository and Connection Registry
    // 3. MessagePusher
    // 4. AppState (UseCases)
    // 5. Server

    // 1. Load scripts
    let catalog = match &config.scripts_dir {
        Some(dir) => StaticScriptCatalog::from_dir(dir),
        None => StaticScriptCatalog::builtin(),
    };
    let catalog = match catalog {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::error!("Failed to load scripts: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!("Loaded {} script(s)", catalog.len());

    // 2. Create Repository and Connection Registry (in-memory)
    let repository = Arc::new(InMemoryRoomRepository::new());
    let registry = Arc::new(InMemoryConnectionRegistry::new());

    // 3. Create MessagePusher (WebSocket implementation)
    let message_pusher = Arc::new(WebSocketMessagePusher::new());

    // 4. Wire UseCases
    let state = Arc::new(AppState::build(
        repository,
        registry,
        message_pusher,
        Arc::new(catalog),
        Arc::new(SystemClock),
        config.default_max_players,
    ));

    // 5. Create and run the server
    let server = Server::new(state, config.heartbeat_interval());
    if let Err(e) = server.run(config.host, config.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
