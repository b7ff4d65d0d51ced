//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;

/// Command-line arguments. Every flag is optional; anything set here
/// overrides the corresponding value from `config.ron`.
#[derive(Debug, Parser)]
#[command(name = "oxo-server", about = "Tic-tac-toe game server")]
pub struct CliArgs {
    /// IP address to bind the game server.
    #[arg(long)]
    pub bind: Option<String>,

    /// Port for the game server.
    #[arg(long)]
    pub port: Option<u16>,

    /// Maximum concurrent client connections.
    #[arg(long)]
    pub max_connections: Option<usize>,

    /// Enable or disable the HTTP liveness endpoint.
    #[arg(long)]
    pub health: Option<bool>,

    /// Port for the liveness endpoint.
    #[arg(long)]
    pub health_port: Option<u16>,

    /// Log level (e.g., "debug", "info", "warn").
    #[arg(long)]
    pub log_level: Option<String>,

    /// Directory holding `config.ron`; defaults to the platform config dir.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides on top of the loaded configuration.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(bind) = &args.bind {
            self.network.bind_address = bind.clone();
        }
        if let Some(port) = args.port {
            self.network.port = port;
        }
        if let Some(max_connections) = args.max_connections {
            self.network.max_connections = max_connections;
        }
        if let Some(health) = args.health {
            self.health.enabled = health;
        }
        if let Some(health_port) = args.health_port {
            self.health.port = health_port;
        }
        if let Some(log_level) = &args.log_level {
            self.debug.log_level = log_level.clone();
        }
    }
}
