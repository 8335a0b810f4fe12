//! Logging configuration and initialization
//!
//! Structured logging with tracing. Output goes to stderr so `preview`
//! can write HTML to stdout.
//!
//! # Environment Variables
//!
//! - `TRIPCARD_LOG`: filter directives (e.g. `debug`, `info,tripcard=trace`),
//!   falling back to `RUST_LOG`, then to [`LogConfig::default_level`]
//! - `TRIPCARD_LOG_FORMAT`: set to `json` for JSON lines

use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use crate::error::TripcardError;

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Use JSON format for logs (default: false)
    pub json_format: bool,
    /// Default log level filter (default: "info")
    pub default_level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            json_format: false,
            default_level: "info".to_string(),
        }
    }
}

impl LogConfig {
    /// Default level from CLI verbosity flags (`-v` debug, `-vv` trace, `-q` warn).
    pub fn from_verbosity(verbose: u8, quiet: bool) -> Self {
        let default_level = match (quiet, verbose) {
            (true, _) => "warn",
            (false, 0) => "info",
            (false, 1) => "debug",
            (false, _) => "trace",
        };
        Self {
            default_level: default_level.to_string(),
            ..Self::default()
        }
    }
}

fn env_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_env("TRIPCARD_LOG")
        .or_else(|_| EnvFilter::try_from_env("RUST_LOG"))
        .unwrap_or_else(|_| EnvFilter::new(&config.default_level))
}

fn use_json(config: &LogConfig) -> bool {
    std::env::var("TRIPCARD_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(config.json_format)
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &LogConfig) -> Result<(), TripcardError> {
    let subscriber = tracing_subscriber::registry().with(env_filter(config));

    let result = if use_json(config) {
        let json_layer = fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_file(true)
            .with_line_number(true);
        subscriber.with(json_layer).try_init()
    } else {
        let console_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(false)
            .compact();
        subscriber.with(console_layer).try_init()
    };
    result.map_err(|e| TripcardError::Logging(e.to_string()))?;

    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        json = use_json(config),
        "logging initialized"
    );
    Ok(())
}
