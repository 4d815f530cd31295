//! Configuration management for rag-optimizer
//!
//! Settings are loaded from environment variables with sensible defaults.
//!
//! # Environment Variables
//!
//! - `RAG_OPTIMIZER_API_URL`: Evaluation service base URL - default: "http://localhost:8000"
//! - `RAG_OPTIMIZER_UPLOAD_TIMEOUT`: Upload timeout in seconds - default: "120"
//! - `RAG_OPTIMIZER_INGEST_TIMEOUT`: Ingestion timeout in seconds - default: "300"
//! - `RAG_OPTIMIZER_EVALUATE_TIMEOUT`: Evaluation timeout in seconds - default: "180"
//! - `RAG_OPTIMIZER_HEALTH_TIMEOUT`: Health check timeout in seconds - default: "10"
//! - `RAG_OPTIMIZER_LOG_LEVEL`: Logging level - default: "info"
//!
//! # Example
//!
//! ```no_run
//! use rag_optimizer::OptimizerConfig;
//! use std::env;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! env::set_var("RAG_OPTIMIZER_API_URL", "http://eval.internal:8000");
//!
//! let config = OptimizerConfig::default();
//! config.validate()?;
//!
//! let client = config.create_client()?;
//! println!("Talking to {}", client.base_url());
//! # Ok(())
//! # }
//! ```

use crate::client::{
    ClientError, HttpEvaluationClient, Timeouts, DEFAULT_EVALUATE_TIMEOUT_SECS,
    DEFAULT_HEALTH_TIMEOUT_SECS, DEFAULT_INGEST_TIMEOUT_SECS, DEFAULT_UPLOAD_TIMEOUT_SECS,
};
use reqwest::Url;
use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_LOG_LEVEL: &str = "info";
const MAX_TIMEOUT_SECS: u64 = 3600;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid API URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Client initialization failed: {0}")]
    ClientInitError(#[from] ClientError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizerConfig {
    /// Base URL of the evaluation service
    pub api_url: String,

    pub upload_timeout_secs: u64,
    pub ingest_timeout_secs: u64,
    pub evaluate_timeout_secs: u64,
    pub health_timeout_secs: u64,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
}

fn env_secs(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

impl Default for OptimizerConfig {
    /// Reads `RAG_OPTIMIZER_*` variables, falling back to defaults for any
    /// that are missing or unparsable
    fn default() -> Self {
        let api_url = env::var("RAG_OPTIMIZER_API_URL")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let log_level = env::var("RAG_OPTIMIZER_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        Self {
            api_url,
            upload_timeout_secs: env_secs("RAG_OPTIMIZER_UPLOAD_TIMEOUT", DEFAULT_UPLOAD_TIMEOUT_SECS),
            ingest_timeout_secs: env_secs("RAG_OPTIMIZER_INGEST_TIMEOUT", DEFAULT_INGEST_TIMEOUT_SECS),
            evaluate_timeout_secs: env_secs(
                "RAG_OPTIMIZER_EVALUATE_TIMEOUT",
                DEFAULT_EVALUATE_TIMEOUT_SECS,
            ),
            health_timeout_secs: env_secs("RAG_OPTIMIZER_HEALTH_TIMEOUT", DEFAULT_HEALTH_TIMEOUT_SECS),
            log_level,
        }
    }
}

impl OptimizerConfig {
    /// Validates the configuration
    ///
    /// Checks that:
    /// - The API URL is an absolute http(s) URL
    /// - Every timeout is between 1 second and 1 hour
    /// - Log level is valid
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.api_url).map_err(|e| ConfigError::InvalidUrl {
            url: self.api_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                url: self.api_url.clone(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        for (name, secs) in [
            ("Upload", self.upload_timeout_secs),
            ("Ingest", self.ingest_timeout_secs),
            ("Evaluate", self.evaluate_timeout_secs),
            ("Health", self.health_timeout_secs),
        ] {
            if secs == 0 {
                return Err(ConfigError::ValidationFailed(format!(
                    "{} timeout must be at least 1 second",
                    name
                )));
            }
            if secs > MAX_TIMEOUT_SECS {
                return Err(ConfigError::ValidationFailed(format!(
                    "{} timeout cannot exceed 1 hour",
                    name
                )));
            }
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            upload: Duration::from_secs(self.upload_timeout_secs),
            ingest: Duration::from_secs(self.ingest_timeout_secs),
            evaluate: Duration::from_secs(self.evaluate_timeout_secs),
            health: Duration::from_secs(self.health_timeout_secs),
        }
    }

    /// Creates an HTTP client for the configured service
    pub fn create_client(&self) -> Result<HttpEvaluationClient, ConfigError> {
        Ok(HttpEvaluationClient::new(&self.api_url, self.timeouts())?)
    }

    /// Converts configuration to a display map for output formatting
    pub fn to_display_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();

        map.insert("api_url".to_string(), self.api_url.clone());
        map.insert(
            "upload_timeout_secs".to_string(),
            self.upload_timeout_secs.to_string(),
        );
        map.insert(
            "ingest_timeout_secs".to_string(),
            self.ingest_timeout_secs.to_string(),
        );
        map.insert(
            "evaluate_timeout_secs".to_string(),
            self.evaluate_timeout_secs.to_string(),
        );
        map.insert(
            "health_timeout_secs".to_string(),
            self.health_timeout_secs.to_string(),
        );
        map.insert("log_level".to_string(), self.log_level.clone());

        map
    }
}

impl fmt::Display for OptimizerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "RAG Optimizer Configuration:")?;
        writeln!(f, "  API URL: {}", self.api_url)?;
        writeln!(f, "  Upload Timeout: {}s", self.upload_timeout_secs)?;
        writeln!(f, "  Ingest Timeout: {}s", self.ingest_timeout_secs)?;
        writeln!(f, "  Evaluate Timeout: {}s", self.evaluate_timeout_secs)?;
        writeln!(f, "  Health Timeout: {}s", self.health_timeout_secs)?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    const ALL_VARS: [&str; 6] = [
        "RAG_OPTIMIZER_API_URL",
        "RAG_OPTIMIZER_UPLOAD_TIMEOUT",
        "RAG_OPTIMIZER_INGEST_TIMEOUT",
        "RAG_OPTIMIZER_EVALUATE_TIMEOUT",
        "RAG_OPTIMIZER_HEALTH_TIMEOUT",
        "RAG_OPTIMIZER_LOG_LEVEL",
    ];

    /// Helper to temporarily set environment variables for testing
    struct EnvGuard {
        key: String,
        old_value: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &str, value: &str) -> Self {
            let old_value = env::var(key).ok();
            env::set_var(key, value);
            Self {
                key: key.to_string(),
                old_value,
            }
        }

        fn unset(key: &str) -> Self {
            let old_value = env::var(key).ok();
            env::remove_var(key);
            Self {
                key: key.to_string(),
                old_value,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.old_value {
                Some(v) => env::set_var(&self.key, v),
                None => env::remove_var(&self.key),
            }
        }
    }

    fn valid_config() -> OptimizerConfig {
        OptimizerConfig {
            api_url: "http://localhost:8000".to_string(),
            upload_timeout_secs: 120,
            ingest_timeout_secs: 300,
            evaluate_timeout_secs: 180,
            health_timeout_secs: 10,
            log_level: "info".to_string(),
        }
    }

    #[test]
    #[serial]
    fn test_default_configuration() {
        let _guards: Vec<_> = ALL_VARS.iter().map(|k| EnvGuard::unset(k)).collect();

        let config = OptimizerConfig::default();

        assert_eq!(config, valid_config());
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_environment_variable_parsing() {
        let _guards = vec![
            EnvGuard::set("RAG_OPTIMIZER_API_URL", "https://eval.example.com/api/"),
            EnvGuard::set("RAG_OPTIMIZER_UPLOAD_TIMEOUT", "30"),
            EnvGuard::set("RAG_OPTIMIZER_INGEST_TIMEOUT", "600"),
            EnvGuard::set("RAG_OPTIMIZER_EVALUATE_TIMEOUT", "240"),
            EnvGuard::set("RAG_OPTIMIZER_HEALTH_TIMEOUT", "5"),
            EnvGuard::set("RAG_OPTIMIZER_LOG_LEVEL", "DEBUG"),
        ];

        let config = OptimizerConfig::default();

        assert_eq!(config.api_url, "https://eval.example.com/api/");
        assert_eq!(config.upload_timeout_secs, 30);
        assert_eq!(config.ingest_timeout_secs, 600);
        assert_eq!(config.evaluate_timeout_secs, 240);
        assert_eq!(config.health_timeout_secs, 5);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    #[serial]
    fn test_unparsable_timeout_falls_back() {
        let _guard = EnvGuard::set("RAG_OPTIMIZER_EVALUATE_TIMEOUT", "soon");

        let config = OptimizerConfig::default();

        assert_eq!(config.evaluate_timeout_secs, DEFAULT_EVALUATE_TIMEOUT_SECS);
    }

    #[test]
    fn test_validation_rejects_bad_url() {
        let mut config = valid_config();
        config.api_url = "not a url".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidUrl { .. })
        ));

        config.api_url = "ftp://files.example.com".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_validation_rejects_timeouts_out_of_range() {
        let mut config = valid_config();
        config.ingest_timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.evaluate_timeout_secs = MAX_TIMEOUT_SECS + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_log_level() {
        let mut config = valid_config();
        config.log_level = "invalid".to_string();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_timeouts() {
        let timeouts = valid_config().timeouts();
        assert_eq!(timeouts.upload, Duration::from_secs(120));
        assert_eq!(timeouts.ingest, Duration::from_secs(300));
        assert_eq!(timeouts.evaluate, Duration::from_secs(180));
        assert_eq!(timeouts.health, Duration::from_secs(10));
    }

    #[test]
    fn test_create_client() {
        let client = valid_config().create_client().unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:8000/");
        assert_eq!(client.timeouts().evaluate, Duration::from_secs(180));
    }

    #[test]
    fn test_display_map() {
        let map = valid_config().to_display_map();
        assert_eq!(map.get("api_url").unwrap(), "http://localhost:8000");
        assert_eq!(map.get("ingest_timeout_secs").unwrap(), "300");
        assert_eq!(map.len(), 6);
    }

    #[test]
    fn test_config_display() {
        let display = format!("{}", valid_config());
        assert!(display.contains("RAG Optimizer Configuration:"));
        assert!(display.contains("Evaluate Timeout: 180s"));
    }
}
