//! Configuration for the oxo server.
//!
//! Settings live in a `config.ron` file under the platform config
//! directory and can be overridden per-run with command-line flags.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{Config, DebugConfig, HealthConfig, NetworkConfig};
pub use error::ConfigError;
