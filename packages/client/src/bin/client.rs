//! Interactive Jubensha client.
//!
//! Connects to a room server, then reads commands from stdin (`/help` lists
//! them). Lines that are not commands are sent as chat.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin jubensha-client -- --name Alice
//! cargo run --bin jubensha-client -- -n Bob -u ws://127.0.0.1:4000/ws
//! ```

use std::time::Duration;

use clap::Parser;

use jubensha_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "jubensha-client")]
#[command(about = "Interactive client for the Jubensha room server", long_about = None)]
struct Args {
    /// Display name used when creating or joining a room
    #[arg(short = 'n', long)]
    name: Option<String>,

    /// WebSocket server URL
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:4000/ws")]
    url: String,

    /// Seconds to wait for each reply
    #[arg(long, default_value = "5")]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    // Run the client
    if let Err(e) = jubensha_client::run_client(
        args.url,
        args.name,
        Duration::from_secs(args.timeout_secs),
    )
    .await
    {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
