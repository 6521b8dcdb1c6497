//! Logging configuration

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Pretty-printed logs for humans
    #[default]
    Pretty,
    /// JSON logs for machine parsing
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Invalid log format: {}", s)),
        }
    }
}

/// Receiver modules that accept a `component_levels` override.
pub const LOG_COMPONENTS: &[&str] = &[
    "agent", "alert", "api", "cli", "config", "evidence", "fanout", "logging", "metrics",
    "prompt", "queue", "store", "worker",
];

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    /// Per-module levels (e.g., {"fanout": "debug", "evidence": "warn"})
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_levels: Option<HashMap<String, String>>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            component_levels: None,
        }
    }
}

impl LoggingConfig {
    /// First `component_levels` key that names no receiver module, sorted.
    pub fn unknown_component(&self) -> Option<&str> {
        let levels = self.component_levels.as_ref()?;
        let mut names: Vec<&str> = levels.keys().map(String::as_str).collect();
        names.sort_unstable();
        names.into_iter().find(|name| !LOG_COMPONENTS.contains(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_config_defaults() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.component_levels.is_none());
    }

    #[test]
    fn test_component_levels_from_toml() {
        let config: LoggingConfig = toml::from_str(
            r#"
            level = "warn"
            format = "json"

            [component_levels]
            fanout = "debug"
            evidence = "trace"
            "#,
        )
        .unwrap();

        assert_eq!(config.level, "warn");
        assert_eq!(config.format, LogFormat::Json);
        let levels = config.component_levels.as_ref().unwrap();
        assert_eq!(levels["fanout"], "debug");
        assert_eq!(levels["evidence"], "trace");
        assert!(config.unknown_component().is_none());
    }

    #[test]
    fn test_unknown_component_reported() {
        let mut levels = HashMap::new();
        levels.insert("worker".to_string(), "debug".to_string());
        levels.insert("routing".to_string(), "debug".to_string());
        levels.insert("dashboard".to_string(), "debug".to_string());
        let config = LoggingConfig {
            component_levels: Some(levels),
            ..Default::default()
        };

        assert_eq!(config.unknown_component(), Some("dashboard"));
    }

    #[test]
    fn test_log_format_serde() {
        let json = serde_json::to_string(&LogFormat::Json).unwrap();
        assert_eq!(json, "\"json\"");
    }

    #[test]
    fn test_log_format_from_str() {
        assert_eq!(LogFormat::from_str("pretty").unwrap(), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str("JSON").unwrap(), LogFormat::Json);
        assert!(LogFormat::from_str("xml").is_err());
    }
}
