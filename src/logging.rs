//! Logging setup
//!
//! Level resolution, highest priority first:
//! `ENABLE_LOGGING=false` or `[logging] enabled = false` silence everything,
//! `--verbose` means debug, `LOGLEVEL` sets the level, then `[logging] level`.
//! `[logging] format = "json"` switches stderr output to JSON lines.

use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};

/// Compute the filter directive from flags, environment values and config
pub fn resolve_filter(
    verbose: bool,
    enable_logging: Option<&str>,
    log_level: Option<&str>,
    config: &LoggingConfig,
) -> String {
    let disabled_by_env = enable_logging
        .map(|v| v.trim().eq_ignore_ascii_case("false"))
        .unwrap_or(false);
    if disabled_by_env || !config.enabled {
        return "off".to_string();
    }
    if verbose {
        return "debug".to_string();
    }
    match log_level.map(str::trim).filter(|l| !l.is_empty()) {
        Some(level) => level.to_ascii_lowercase(),
        None => config.level.clone(),
    }
}

/// Install the global subscriber; logs go to stderr so stdout stays parseable
pub fn init(verbose: bool, config: &LoggingConfig) {
    let directive = resolve_filter(
        verbose,
        std::env::var("ENABLE_LOGGING").ok().as_deref(),
        std::env::var("LOGLEVEL").ok().as_deref(),
        config,
    );
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warn"));

    match config.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init(),
    }
}
