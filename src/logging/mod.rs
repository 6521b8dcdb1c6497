//! Structured logging helpers
//!
//! Filter construction for the subscriber plus small field helpers used by
//! the pipeline when logging backend results.

pub mod fields;

pub use fields::{outcome_counts, preview};

/// Build filter directives string from LoggingConfig
///
/// Constructs a tracing filter string that includes the base log level
/// and any component-specific log levels configured in the LoggingConfig.
/// Components are emitted in sorted order so the string is stable.
///
/// # Examples
///
/// ```
/// use alert_receiver::config::{LogFormat, LoggingConfig};
/// use alert_receiver::logging::build_filter_directives;
/// use std::collections::HashMap;
///
/// let mut component_levels = HashMap::new();
/// component_levels.insert("fanout".to_string(), "debug".to_string());
///
/// let config = LoggingConfig {
///     level: "info".to_string(),
///     format: LogFormat::Pretty,
///     component_levels: Some(component_levels),
/// };
///
/// let filter_str = build_filter_directives(&config);
/// assert_eq!(filter_str, "info,alert_receiver::fanout=debug");
/// ```
pub fn build_filter_directives(config: &crate::config::LoggingConfig) -> String {
    let mut filter_str = config.level.clone();

    if let Some(component_levels) = &config.component_levels {
        let mut components: Vec<_> = component_levels.iter().collect();
        components.sort();
        for (component, level) in components {
            filter_str.push_str(&format!(",alert_receiver::{}={}", component, level));
        }
    }

    filter_str
}
