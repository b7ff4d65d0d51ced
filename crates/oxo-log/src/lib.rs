//! Structured logging for the oxo server.
//!
//! Provides structured, filterable logging via the `tracing` ecosystem:
//! console output with timestamps and module paths, plus JSON file logging
//! in debug builds for post-mortem analysis. Integrates with the
//! configuration system for runtime log level control.

use oxo_config::Config;
use std::path::Path;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber for the server process.
///
/// Sets up:
/// - Console output with uptime timestamps, module paths, and levels
/// - JSON file logging in debug builds (optional)
/// - Environment-based filtering (respects RUST_LOG)
/// - Log level override from the `debug.log_level` config setting
///
/// # Arguments
///
/// * `log_dir` - Optional directory for JSON log files (debug builds only)
/// * `debug_build` - Whether this is a debug build (enables file logging)
/// * `config` - Optional configuration to use for log level override
///
/// # Examples
///
/// ```no_run
/// use oxo_log::init_logging;
/// use oxo_config::Config;
///
/// // Basic initialization
/// init_logging(None, false, None);
///
/// // With config override
/// let config = Config::default();
/// init_logging(None, false, Some(&config));
/// ```
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, config: Option<&Config>) {
    let filter_str = if let Some(config) = config {
        if !config.debug.log_level.is_empty() {
            config.debug.log_level.clone()
        } else {
            "info,tiny_http=warn".to_string()
        }
    } else {
        "info,tiny_http=warn".to_string()
    };

    // RUST_LOG wins over everything when set
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    // In debug builds, also log to a file for post-mortem analysis
    if debug_build
        && let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
        && let Ok(log_file) = std::fs::File::create(log_dir.join("oxo.log"))
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .json();

        subscriber.with(file_layer).init();
        tracing::info!("logging initialized, json file in {}", log_dir.display());
        return;
    }

    subscriber.init();
    tracing::info!("logging initialized");
}

/// Create an `EnvFilter` with the default filter string.
///
/// Enables `info` for all targets and quiets `tiny_http` down to `warn`.
/// Useful for tests and for consistent default behavior.
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new("info,tiny_http=warn")
}
