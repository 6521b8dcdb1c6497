//! Configuration module for the alert receiver
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`PORT`, `PROMETHEUS_URL`, `LLM_BACKENDS_JSON`, ...)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use alert_receiver::config::ReceiverConfig;
//!
//! let config = ReceiverConfig::default();
//! assert_eq!(config.server.port, 9094);
//!
//! let toml = r#"
//! [pipeline]
//! worker_count = 4
//! "#;
//! let config: ReceiverConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.pipeline.worker_count, 4);
//! assert_eq!(config.pipeline.queue_capacity, 32);
//! ```

pub mod backend;
pub mod error;
pub mod evidence;
pub mod logging;
pub mod pipeline;
pub mod server;

pub use backend::{BackendConfig, BackendFamily};
pub use error::ConfigError;
pub use evidence::EvidenceConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use pipeline::PipelineConfig;
pub use server::ServerConfig;

use crate::evidence::MetricQuery;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Unified configuration for the alert receiver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ReceiverConfig {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Queue, workers, store and backend timeout
    pub pipeline: PipelineConfig,
    /// Prometheus enrichment
    pub evidence: EvidenceConfig,
    /// Ordered inference backends
    pub backends: Vec<BackendConfig>,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl ReceiverConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides read through `lookup`.
    ///
    /// Unparseable scalar values are ignored and the prior value kept.
    /// Malformed `LLM_BACKENDS_JSON` or `METRIC_QUERIES_JSON` is an error.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string());

        // Server settings
        if let Some(port) = get("PORT").and_then(|v| v.parse().ok()) {
            self.server.port = port;
        }
        if let Some(host) = get("HOST").filter(|v| !v.is_empty()) {
            self.server.host = host;
        }

        // Evidence settings; an explicitly empty URL disables enrichment
        if let Some(url) = get("PROMETHEUS_URL") {
            self.evidence.prometheus_url = url;
        }
        if let Some(d) = get("PROMETHEUS_LOOKBACK").and_then(|v| parse_duration(&v)) {
            self.evidence.lookback = d;
        }
        if let Some(d) = get("PROMETHEUS_TIMEOUT").and_then(|v| parse_duration(&v)) {
            self.evidence.timeout = d;
        }

        // Pipeline settings
        if let Some(d) = get("LLM_TIMEOUT").and_then(|v| parse_duration(&v)) {
            self.pipeline.backend_timeout = d;
        }
        if let Some(n) = get("JOB_QUEUE_SIZE").and_then(|v| v.parse().ok()) {
            self.pipeline.queue_capacity = n;
        }
        if let Some(n) = get("WORKER_CONCURRENCY").and_then(|v| v.parse().ok()) {
            self.pipeline.worker_count = n;
        }
        if let Some(n) = get("MAX_STORED_ANALYSES").and_then(|v| v.parse().ok()) {
            self.pipeline.max_stored_analyses = n;
        }

        // Lists
        if let Some(raw) = get("LLM_BACKENDS_JSON").filter(|v| !v.is_empty()) {
            self.backends = serde_json::from_str::<Vec<BackendConfig>>(&raw)
                .map_err(|e| ConfigError::Parse(format!("LLM_BACKENDS_JSON: {}", e)))?;
        }
        if let Some(raw) = get("METRIC_QUERIES_JSON").filter(|v| !v.is_empty()) {
            self.evidence.queries = serde_json::from_str::<Vec<MetricQuery>>(&raw)
                .map_err(|e| ConfigError::Parse(format!("METRIC_QUERIES_JSON: {}", e)))?;
        }

        // Logging settings
        if let Some(level) = get("LOG_LEVEL").filter(|v| !v.is_empty()) {
            self.logging.level = level;
        }
        if let Some(format) = get("LOG_FORMAT").and_then(|v| LogFormat::from_str(&v).ok()) {
            self.logging.format = format;
        }

        Ok(self)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::validation("server.port", "port must be non-zero"));
        }

        let pipeline = &self.pipeline;
        if pipeline.queue_capacity == 0 {
            return Err(ConfigError::validation(
                "pipeline.queue_capacity",
                "must be at least 1",
            ));
        }
        if pipeline.worker_count == 0 {
            return Err(ConfigError::validation("pipeline.worker_count", "must be at least 1"));
        }
        if pipeline.max_stored_analyses == 0 {
            return Err(ConfigError::validation(
                "pipeline.max_stored_analyses",
                "must be at least 1",
            ));
        }
        if pipeline.backend_timeout.is_zero() {
            return Err(ConfigError::validation(
                "pipeline.backend_timeout",
                "must be non-zero",
            ));
        }
        // Range selectors are rendered in whole seconds.
        if self.evidence.lookback < Duration::from_secs(1) {
            return Err(ConfigError::validation(
                "evidence.lookback",
                "must be at least 1s",
            ));
        }

        if let Some(component) = self.logging.unknown_component() {
            return Err(ConfigError::validation(
                format!("logging.component_levels.{}", component),
                "not a receiver module",
            ));
        }

        for (i, backend) in self.backends.iter().enumerate() {
            if backend.model.trim().is_empty() {
                return Err(ConfigError::validation(
                    format!("backends[{}].model", i),
                    "model cannot be empty",
                ));
            }
        }

        for (i, query) in self.evidence.queries.iter().enumerate() {
            if query.name.trim().is_empty() {
                return Err(ConfigError::validation(
                    format!("evidence.queries[{}].name", i),
                    "name cannot be empty",
                ));
            }
            if query.query.trim().is_empty() {
                return Err(ConfigError::validation(
                    format!("evidence.queries[{}].query", i),
                    "query cannot be empty",
                ));
            }
        }

        Ok(())
    }

    /// Queries the collector will run.
    pub fn effective_queries(&self) -> Vec<MetricQuery> {
        self.evidence.effective_queries()
    }
}

fn parse_duration(value: &str) -> Option<Duration> {
    humantime::parse_duration(value).ok()
}
