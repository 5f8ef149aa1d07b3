//! Configuration loaded from the environment.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `ORDER_API_URL` | `http://localhost:8080/api` | Base URL of the order API |
//! | `ORDER_POLL_INTERVAL_MS` | `1000` | Time between poll cycles |
//! | `ORDER_STOP_ON_DELIVERED` | `false` | Stop polling once the order is delivered |
//! | `ORDER_BACKOFF_MAX_MS` | unset | Enables jittered backoff, capped at this delay |
//! | `ORDER_REQUEST_TIMEOUT_MS` | unset | Per-request timeout |

use crate::tracker::{PollConfig, RetryPolicy};
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Everything needed to talk to the backend and run trackers.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    pub api_url: String,
    pub request_timeout: Option<Duration>,
    pub poll: PollConfig,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: None,
            poll: PollConfig::default(),
        }
    }
}

impl TrackerConfig {
    /// Reads the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup (the environment, a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = lookup("ORDER_API_URL").unwrap_or_else(|| {
            info!("ORDER_API_URL not set, using default: {DEFAULT_API_URL}");
            DEFAULT_API_URL.to_string()
        });

        let interval_ms: u64 = try_load(&lookup, "ORDER_POLL_INTERVAL_MS", "1000")?;
        if interval_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "ORDER_POLL_INTERVAL_MS",
                value: "0".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        let stop_on_delivered: bool = try_load(&lookup, "ORDER_STOP_ON_DELIVERED", "false")?;

        let retry = match try_load_optional::<u64>(&lookup, "ORDER_BACKOFF_MAX_MS")? {
            Some(max_ms) => RetryPolicy::JitteredBackoff {
                max_delay: Duration::from_millis(max_ms),
            },
            None => RetryPolicy::Fixed,
        };
        let request_timeout = try_load_optional::<u64>(&lookup, "ORDER_REQUEST_TIMEOUT_MS")?
            .map(Duration::from_millis);

        Ok(Self {
            api_url,
            request_timeout,
            poll: PollConfig {
                interval: Duration::from_millis(interval_ms),
                stop_on_delivered,
                retry,
            },
        })
    }
}

fn try_load<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: &str,
) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let raw = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    parse(key, raw)
}

fn try_load_optional<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T::Err: Display,
{
    lookup(key).map(|raw| parse(key, raw)).transpose()
}

fn parse<T: FromStr>(key: &'static str, raw: String) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let parsed = raw.trim().parse::<T>();
    parsed.map_err(|e| {
        warn!("Invalid {key} value: {e}");
        ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value: raw,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<TrackerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        TrackerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        assert_eq!(load(&[]).unwrap(), TrackerConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("ORDER_API_URL", "https://orders.example.com/api"),
            ("ORDER_POLL_INTERVAL_MS", "250"),
            ("ORDER_STOP_ON_DELIVERED", "true"),
            ("ORDER_BACKOFF_MAX_MS", "8000"),
            ("ORDER_REQUEST_TIMEOUT_MS", " 3000 "),
        ])
        .unwrap();

        assert_eq!(config.api_url, "https://orders.example.com/api");
        assert_eq!(config.request_timeout, Some(Duration::from_secs(3)));
        assert_eq!(config.poll.interval, Duration::from_millis(250));
        assert!(config.poll.stop_on_delivered);
        assert_eq!(
            config.poll.retry,
            RetryPolicy::JitteredBackoff {
                max_delay: Duration::from_secs(8)
            }
        );
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            load(&[("ORDER_POLL_INTERVAL_MS", "soon")]),
            Err(ConfigError::Invalid { key: "ORDER_POLL_INTERVAL_MS", .. })
        ));
        assert!(matches!(
            load(&[("ORDER_POLL_INTERVAL_MS", "0")]),
            Err(ConfigError::Invalid { key: "ORDER_POLL_INTERVAL_MS", .. })
        ));
        assert!(matches!(
            load(&[("ORDER_STOP_ON_DELIVERED", "yes")]),
            Err(ConfigError::Invalid { key: "ORDER_STOP_ON_DELIVERED", .. })
        ));
    }
}
