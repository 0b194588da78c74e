//! CLI logging initialization.
//!
//! Per-target level control via `tracing-subscriber` filter targets.

use std::io;

use tracing::Level;
use tracing_subscriber::{filter::Targets, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Per-target log levels; any target without an override uses `global`.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub global: Level,
    pub core: Option<Level>,
    pub cli: Option<Level>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            global: Level::WARN,
            core: None,
            cli: None,
        }
    }
}

impl LogConfig {
    pub fn with_global(level: Level) -> Self {
        Self {
            global: level,
            ..Self::default()
        }
    }
}

/// Install the global subscriber. Compact single-line output on stderr
/// so trap output on stdout stays clean for scripting.
pub fn init(config: &LogConfig) {
    let targets = Targets::new()
        .with_default(config.global)
        .with_target("vesper_core", config.core.unwrap_or(config.global))
        .with_target("vesper", config.cli.unwrap_or(config.global));

    let stderr_layer = fmt::layer()
        .compact()
        .with_target(true)
        .without_time()
        .with_writer(io::stderr);

    tracing_subscriber::registry()
        .with(targets)
        .with(stderr_layer)
        .init();
}

/// Parse a user-facing level name.
pub fn parse_level(s: &str) -> Option<Level> {
    match s.to_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}
