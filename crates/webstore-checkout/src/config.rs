//! Runtime configuration loaded from environment variables.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `CHECKOUT_POLL_INTERVAL_MS` | `2000` |
//! | `CHECKOUT_POLL_TIMEOUT_SECS` | `30` |
//! | `CHECKOUT_MAX_POLLS` | `15` |
//! | `CHECKOUT_QUERY_RETRIES` | `3` |
//! | `CHECKOUT_BACKOFF_BASE_MS` | `1000` |
//! | `CHECKOUT_BACKOFF_CAP_SECS` | `30` |
//! | `ORDER_API_URL` | unset (use the in-process store) |
//! | `MINECRAFT_API_URL` + `MINECRAFT_API_TOKEN` | unset (no delivery) |

use crate::poller::{PollerConfig, RetryPolicy};
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("{present} is set but {missing} is not")]
    Incomplete {
        present: &'static str,
        missing: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MinecraftConfig {
    pub api_url: String,
    pub token: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckoutConfig {
    pub poller: PollerConfig,
    pub order_api_url: Option<String>,
    pub minecraft: Option<MinecraftConfig>,
}

impl CheckoutConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let retry = RetryPolicy {
            max_retries: try_load(&lookup, "CHECKOUT_QUERY_RETRIES", 3)?,
            base_delay: Duration::from_millis(positive(
                &lookup,
                "CHECKOUT_BACKOFF_BASE_MS",
                1000,
            )?),
            max_delay: Duration::from_secs(positive(&lookup, "CHECKOUT_BACKOFF_CAP_SECS", 30)?),
        };

        let poller = PollerConfig {
            poll_interval: Duration::from_millis(positive(
                &lookup,
                "CHECKOUT_POLL_INTERVAL_MS",
                2000,
            )?),
            timeout: Duration::from_secs(positive(&lookup, "CHECKOUT_POLL_TIMEOUT_SECS", 30)?),
            max_polls: positive(&lookup, "CHECKOUT_MAX_POLLS", 15)?,
            retry,
        };

        let order_api_url = non_empty(&lookup, "ORDER_API_URL");

        let minecraft = match (
            non_empty(&lookup, "MINECRAFT_API_URL"),
            non_empty(&lookup, "MINECRAFT_API_TOKEN"),
        ) {
            (Some(api_url), Some(token)) => Some(MinecraftConfig { api_url, token }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(ConfigError::Incomplete {
                    present: "MINECRAFT_API_URL",
                    missing: "MINECRAFT_API_TOKEN",
                })
            }
            (None, Some(_)) => {
                return Err(ConfigError::Incomplete {
                    present: "MINECRAFT_API_TOKEN",
                    missing: "MINECRAFT_API_URL",
                })
            }
        };

        Ok(Self {
            poller,
            order_api_url,
            minecraft,
        })
    }
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn try_load<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr + Display,
    T::Err: Display,
{
    match non_empty(lookup, key) {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
        None => {
            debug!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}

fn positive<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr + Display + Default + PartialEq,
    T::Err: Display,
{
    let value = try_load(lookup, key, default)?;
    if value == T::default() {
        return Err(ConfigError::Zero(key));
    }
    Ok(value)
}
