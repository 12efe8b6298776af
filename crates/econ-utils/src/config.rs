//! Configuration management utilities

use serde::{Deserialize, Serialize};

/// Output format for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable single-line output
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default filter directive used when `RUST_LOG` is not set
    pub default_filter: String,
    /// Line format
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            default_filter: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl LogConfig {
    /// Build from the process environment (`ECON_LOG_LEVEL`, `ECON_LOG_FORMAT`)
    pub fn from_env() -> Self {
        Self::from_lookup(env_lookup)
    }

    /// Build from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let default_filter = lookup("ECON_LOG_LEVEL")
            .and_then(non_empty)
            .unwrap_or(defaults.default_filter);
        let format = match lookup("ECON_LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Self {
            default_filter,
            format,
        }
    }

    /// Switch to JSON output
    pub fn json(mut self) -> Self {
        self.format = LogFormat::Json;
        self
    }
}

/// Read a process environment variable, treating non-unicode values as unset
pub fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Trim a value and drop it if nothing is left
pub fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.default_filter, "info");
        assert_eq!(config.format, LogFormat::Pretty);
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> =
            HashMap::from([("ECON_LOG_LEVEL", "debug"), ("ECON_LOG_FORMAT", "json")]);
        let config = LogConfig::from_lookup(|k| vars.get(k).map(|v| (*v).to_string()));

        assert_eq!(config.default_filter, "debug");
        assert_eq!(config.format, LogFormat::Json);
    }

    #[test]
    fn test_blank_level_falls_back() {
        let config = LogConfig::from_lookup(|k| (k == "ECON_LOG_LEVEL").then(|| "  ".to_string()));
        assert_eq!(config.default_filter, "info");
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(" key ".to_string()), Some("key".to_string()));
        assert_eq!(non_empty(String::new()), None);
    }
}
