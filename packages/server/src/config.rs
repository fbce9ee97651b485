//! Server configuration from command-line flags and environment variables.

use std::{path::PathBuf, time::Duration};

use clap::Parser;

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "jubensha-server")]
#[command(about = "Room and session server for scripted party games", long_about = None)]
pub struct ServerConfig {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port number to bind the server to (HTTP and /ws)
    #[arg(short = 'p', long, env = "PORT", default_value = "4000")]
    pub port: u16,

    /// Liveness check interval in seconds
    #[arg(long, env = "HEARTBEAT_SECS", default_value = "30", value_parser = clap::value_parser!(u64).range(1..))]
    pub heartbeat_secs: u64,

    /// Capacity used when room:create gives none and the script is unknown
    #[arg(long, env = "DEFAULT_MAX_PLAYERS", default_value = "6", value_parser = parse_capacity)]
    pub default_max_players: usize,

    /// Directory of *.json scripts; the built-in catalog is used when absent
    #[arg(long, env = "SCRIPTS_DIR")]
    pub scripts_dir: Option<PathBuf>,
}

impl ServerConfig {
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_secs)
    }
}

fn parse_capacity(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(value) => Ok(value),
        Err(e) => Err(e.to_string()),
    }
}
