//! Server execution logic.

use std::{future::Future, sync::Arc, time::Duration};

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::{
    handler::{
        get_room_detail, get_rooms, get_script, get_scripts, health_check, websocket_handler,
    },
    heartbeat::spawn_heartbeat,
    signal::shutdown_signal,
    state::AppState,
};

/// Room server
///
/// Serves the WebSocket endpoint and the read-only HTTP API on one listener.
///
/// # Example
///
/// ```ignore
/// let state = Arc::new(AppState::build(repository, registry, pusher, catalog, clock, 6));
/// let server = Server::new(state, Duration::from_secs(30));
/// server.run("127.0.0.1".to_string(), 4000).await?;
/// ```
pub struct Server {
    /// AppState（全ユースケース）
    state: Arc<AppState>,
    /// 生存確認の周期
    heartbeat_interval: Duration,
}

impl Server {
    /// Create a new Server instance
    ///
    /// # Arguments
    ///
    /// * `state` - Wired use cases
    /// * `heartbeat_interval` - Period of the liveness check
    pub fn new(state: Arc<AppState>, heartbeat_interval: Duration) -> Self {
        Self {
            state,
            heartbeat_interval,
        }
    }

    /// Build the axum router
    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/rooms", get(get_rooms))
            .route("/api/rooms/{room_id}", get(get_room_detail))
            .route("/api/scripts", get(get_scripts))
            .route("/api/scripts/{script_id}", get(get_script))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Run the server until Ctrl+C / SIGTERM
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 4000)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        // Bind the server to the host and port
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Jubensha server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let heartbeat = spawn_heartbeat(
            self.state.sweep_connections_usecase.clone(),
            self.heartbeat_interval,
        );

        let app = self.router();
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await;

        heartbeat.abort();
        result
    }
}
