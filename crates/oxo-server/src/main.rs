//! The binary entry point for the oxo game server.
//!
//! Wires the pieces together: load configuration, apply CLI overrides,
//! initialize logging, start the health endpoint and run the game server
//! until a shutdown signal arrives.

use std::sync::Arc;

use clap::Parser;

use oxo_config::{CliArgs, Config};
use oxo_health::HealthServer;
use oxo_net::{GameServer, ServerConfig};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    let Some(config_dir) = args.config.clone().or_else(Config::default_dir) else {
        eprintln!("could not determine a configuration directory; pass --config <dir>");
        std::process::exit(1);
    };

    let mut config = match Config::load_or_create(&config_dir) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("failed to load configuration: {e}");
            std::process::exit(1);
        }
    };
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    oxo_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    let bind_addr = match config.network.socket_addr() {
        Ok(addr) => addr,
        Err(e) => {
            eprintln!(
                "invalid bind address {}:{}: {e}",
                config.network.bind_address, config.network.port
            );
            std::process::exit(1);
        }
    };

    let mut health = None;
    if config.health.enabled {
        let mut endpoint = HealthServer::new(config.health.port);
        if let Err(e) = endpoint.start() {
            eprintln!("{e}");
            std::process::exit(1);
        }
        health = Some(endpoint);
    }

    let server = Arc::new(GameServer::new(ServerConfig {
        bind_addr,
        max_connections: config.network.max_connections,
        ..ServerConfig::default()
    }));

    // Ctrl-C flips the shutdown signal; the accept loop drains and exits.
    let signal_target = Arc::clone(&server);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown signal received");
            signal_target.shutdown();
        }
    });

    if let Err(e) = server.run().await {
        eprintln!("game server failed: {e}");
        std::process::exit(1);
    }

    if let Some(mut endpoint) = health {
        endpoint.stop();
    }
}
