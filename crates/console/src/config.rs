//! Console configuration (API location, revalidation, notifications).

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use threereco_observability::LogConfig;

pub const DEFAULT_API_URL: &str = "http://localhost:6173";

/// When the session lookups are revalidated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RefreshPolicy {
    pub on_mount: bool,
    pub on_window_focus: bool,
    pub on_reconnect: bool,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            on_mount: true,
            on_window_focus: true,
            on_reconnect: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Base URL of the API, without the `/api` suffix.
    pub api_url: String,
    pub refresh: RefreshPolicy,
    pub notification_duration_ms: u64,
    pub log: LogConfig,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            refresh: RefreshPolicy::default(),
            notification_duration_ms: 2000,
            log: LogConfig::default(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key}: expected a boolean, got '{value}'")]
    InvalidBool { key: &'static str, value: String },

    #[error("{key}: expected a non-negative integer, got '{value}'")]
    InvalidNumber { key: &'static str, value: String },

    #[error("{key}: must not be empty")]
    Empty { key: &'static str },
}

impl ConsoleConfig {
    pub const ENV_API_URL: &'static str = "THREERECO_API_URL";
    pub const ENV_REFETCH_ON_FOCUS: &'static str = "THREERECO_REFETCH_ON_FOCUS";
    pub const ENV_REFETCH_ON_RECONNECT: &'static str = "THREERECO_REFETCH_ON_RECONNECT";
    pub const ENV_NOTIFICATION_MS: &'static str = "THREERECO_NOTIFICATION_MS";

    /// Defaults overridden by `THREERECO_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each key.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(Self::ENV_API_URL) {
            let url = url.trim().trim_end_matches('/').to_string();
            if url.is_empty() {
                return Err(ConfigError::Empty {
                    key: Self::ENV_API_URL,
                });
            }
            config.api_url = url;
        }
        if let Some(value) = lookup(Self::ENV_REFETCH_ON_FOCUS) {
            config.refresh.on_window_focus = parse_bool(Self::ENV_REFETCH_ON_FOCUS, &value)?;
        }
        if let Some(value) = lookup(Self::ENV_REFETCH_ON_RECONNECT) {
            config.refresh.on_reconnect = parse_bool(Self::ENV_REFETCH_ON_RECONNECT, &value)?;
        }
        if let Some(value) = lookup(Self::ENV_NOTIFICATION_MS) {
            config.notification_duration_ms =
                value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidNumber {
                        key: Self::ENV_NOTIFICATION_MS,
                        value: value.clone(),
                    })?;
        }

        Ok(config)
    }

    pub fn notification_duration(&self) -> Duration {
        Duration::from_millis(self.notification_duration_ms)
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            key,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = ConsoleConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ConsoleConfig::default());
        assert_eq!(config.notification_duration(), Duration::from_secs(2));
    }

    #[test]
    fn environment_overrides() {
        let config = ConsoleConfig::from_lookup(lookup(&[
            ("THREERECO_API_URL", "https://api.example.com/"),
            ("THREERECO_REFETCH_ON_FOCUS", "false"),
            ("THREERECO_NOTIFICATION_MS", "500"),
        ]))
        .unwrap();
        assert_eq!(config.api_url, "https://api.example.com");
        assert!(!config.refresh.on_window_focus);
        assert!(config.refresh.on_reconnect);
        assert_eq!(config.notification_duration_ms, 500);
    }

    #[test]
    fn invalid_values_are_reported() {
        let err = ConsoleConfig::from_lookup(lookup(&[("THREERECO_REFETCH_ON_RECONNECT", "maybe")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBool { .. }));

        let err = ConsoleConfig::from_lookup(lookup(&[("THREERECO_API_URL", " / ")])).unwrap_err();
        assert!(matches!(err, ConfigError::Empty { .. }));
    }

    #[test]
    fn deserializes_partial_json() {
        let config: ConsoleConfig =
            serde_json::from_str(r#"{ "api_url": "https://x", "refresh": { "on_mount": false } }"#).unwrap();
        assert_eq!(config.api_url, "https://x");
        assert!(!config.refresh.on_mount);
        assert!(config.refresh.on_window_focus);
    }
}
