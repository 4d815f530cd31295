//! Structured logging setup for rag-optimizer
//!
//! Logs go to stderr so that stdout stays clean for JSON/YAML output.
//!
//! # Example
//!
//! ```no_run
//! use rag_optimizer::util::logging;
//!
//! // Reads RAG_OPTIMIZER_LOG_LEVEL and RAG_OPTIMIZER_LOG_JSON
//! logging::init_from_env();
//!
//! use tracing::{info, warn};
//!
//! info!(api_url = "http://localhost:8000", "Starting evaluation");
//! warn!(step = "ingest", "Service is slow to respond");
//! ```

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Ensures logging is only initialized once
static INIT: Once = Once::new();

/// HTTP stack crates that are too chatty below warn
const QUIET_TARGETS: [&str; 3] = ["h2", "hyper", "reqwest"];

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum level for this crate's own events
    pub level: Level,

    /// Emit one JSON object per line instead of human-readable text
    pub use_json: bool,

    /// Include the module target (e.g., rag_optimizer::workflow) in logs
    pub include_target: bool,

    /// Include file and line number information
    pub include_location: bool,

    /// Include thread ID and name in logs
    pub include_thread_ids: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: true,
            include_location: false,
            include_thread_ids: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// Reads `RAG_OPTIMIZER_LOG_LEVEL` and `RAG_OPTIMIZER_LOG_JSON`
    pub fn from_env() -> Self {
        let level_str = env::var("RAG_OPTIMIZER_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let use_json = env::var("RAG_OPTIMIZER_LOG_JSON")
            .ok()
            .and_then(|v| v.trim().to_lowercase().parse::<bool>().ok())
            .unwrap_or(false);

        Self {
            level: parse_level(&level_str),
            use_json,
            ..Default::default()
        }
    }

    /// Filter directives applied when `RUST_LOG` is not set
    pub fn directives(&self) -> String {
        let mut directives = vec![format!("rag_optimizer={}", self.level)];
        directives.extend(QUIET_TARGETS.iter().map(|t| format!("{}=warn", t)));
        directives.join(",")
    }
}

/// Parses a log level, falling back to INFO for anything unrecognized
///
/// ```
/// use rag_optimizer::util::logging::parse_level;
/// use tracing::Level;
///
/// assert_eq!(parse_level("debug"), Level::DEBUG);
/// assert_eq!(parse_level("WARN"), Level::WARN);
/// assert_eq!(parse_level("loud"), Level::INFO);
/// ```
pub fn parse_level(level_str: &str) -> Level {
    match level_str.trim().to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

fn build_filter(config: &LoggingConfig) -> EnvFilter {
    if env::var("RUST_LOG").is_ok() {
        return EnvFilter::from_default_env();
    }
    EnvFilter::try_new(config.directives()).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber; later calls are ignored
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = build_filter(&config);

        if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location)
                        .with_thread_ids(config.include_thread_ids)
                        .with_thread_names(config.include_thread_ids)
                        .with_writer(std::io::stderr),
                )
                .init();
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location)
                        .with_thread_ids(config.include_thread_ids)
                        .with_thread_names(config.include_thread_ids)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    });
}

pub fn init_default() {
    init_logging(LoggingConfig::default());
}

pub fn init_from_env() {
    init_logging(LoggingConfig::from_env());
}
