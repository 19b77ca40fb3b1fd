//! Client configuration loaded from the environment.
//!
//! | Variable | Default |
//! |---|---|
//! | `TOWNSYNC_SERVER_URL` | `ws://localhost:8081/town` |
//! | `TOWNSYNC_TOWN_ID` | required |
//! | `TOWNSYNC_USER_NAME` | `Player` |
//! | `TOWNSYNC_COMMAND_TIMEOUT_MS` | `5000` |

use std::time::Duration;

use thiserror::Error;
use url::Url;

use townsync_domain::TownId;

use crate::infrastructure::messaging::DEFAULT_COMMAND_TIMEOUT_MS;

pub const DEFAULT_SERVER_URL: &str = "ws://localhost:8081/town";
pub const DEFAULT_USER_NAME: &str = "Player";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    MissingVar(&'static str),

    #[error("Invalid URL in {var}: {message}")]
    InvalidUrl { var: &'static str, message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// WebSocket endpoint of the town server
    pub server_url: Url,
    pub town_id: TownId,
    pub user_name: String,
    /// How long a command waits for its acknowledgement
    pub command_timeout: Duration,
}

impl ClientConfig {
    pub fn new(server_url: Url, town_id: TownId, user_name: impl Into<String>) -> Self {
        Self {
            server_url,
            town_id,
            user_name: user_name.into(),
            command_timeout: Duration::from_millis(DEFAULT_COMMAND_TIMEOUT_MS),
        }
    }

    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Read the `TOWNSYNC_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let raw_url = get("TOWNSYNC_SERVER_URL").unwrap_or_else(|| DEFAULT_SERVER_URL.into());
        let server_url = Url::parse(&raw_url).map_err(|e| ConfigError::InvalidUrl {
            var: "TOWNSYNC_SERVER_URL",
            message: e.to_string(),
        })?;
        let town_id = get("TOWNSYNC_TOWN_ID")
            .map(TownId::from)
            .ok_or(ConfigError::MissingVar("TOWNSYNC_TOWN_ID"))?;
        let user_name = get("TOWNSYNC_USER_NAME").unwrap_or_else(|| DEFAULT_USER_NAME.into());

        Ok(Self::new(server_url, town_id, user_name)
            .with_command_timeout(parse_timeout(get("TOWNSYNC_COMMAND_TIMEOUT_MS"))))
    }

    /// Server URL with the town and user name as query parameters.
    pub fn join_url(&self) -> Url {
        let mut url = self.server_url.clone();
        url.query_pairs_mut()
            .append_pair("town_id", self.town_id.as_str())
            .append_pair("user_name", &self.user_name);
        url
    }
}

fn parse_timeout(raw: Option<String>) -> Duration {
    let Some(raw) = raw else {
        return Duration::from_millis(DEFAULT_COMMAND_TIMEOUT_MS);
    };
    match raw.parse::<u64>() {
        Ok(ms) if ms > 0 => Duration::from_millis(ms),
        _ => {
            tracing::warn!(
                value = %raw,
                default_ms = DEFAULT_COMMAND_TIMEOUT_MS,
                "Invalid TOWNSYNC_COMMAND_TIMEOUT_MS, using default"
            );
            Duration::from_millis(DEFAULT_COMMAND_TIMEOUT_MS)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_town_is_set() {
        let config =
            ClientConfig::from_lookup(lookup(&[("TOWNSYNC_TOWN_ID", "town-1")])).expect("config");

        assert_eq!(config.server_url.as_str(), DEFAULT_SERVER_URL);
        assert_eq!(config.user_name, DEFAULT_USER_NAME);
        assert_eq!(config.command_timeout, Duration::from_millis(5_000));
    }

    #[test]
    fn town_id_is_required() {
        let err = ClientConfig::from_lookup(lookup(&[("TOWNSYNC_TOWN_ID", "  ")]))
            .expect_err("blank town id");
        assert_eq!(err, ConfigError::MissingVar("TOWNSYNC_TOWN_ID"));
    }

    #[test]
    fn invalid_timeout_falls_back_to_default() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("TOWNSYNC_TOWN_ID", "town-1"),
            ("TOWNSYNC_COMMAND_TIMEOUT_MS", "soon"),
        ]))
        .expect("config");
        assert_eq!(config.command_timeout, Duration::from_millis(5_000));

        let config = ClientConfig::from_lookup(lookup(&[
            ("TOWNSYNC_TOWN_ID", "town-1"),
            ("TOWNSYNC_COMMAND_TIMEOUT_MS", "250"),
        ]))
        .expect("config");
        assert_eq!(config.command_timeout, Duration::from_millis(250));
    }

    #[test]
    fn bad_url_is_reported() {
        let err = ClientConfig::from_lookup(lookup(&[
            ("TOWNSYNC_TOWN_ID", "town-1"),
            ("TOWNSYNC_SERVER_URL", "not a url"),
        ]))
        .expect_err("bad url");
        assert!(matches!(err, ConfigError::InvalidUrl { .. }));
    }

    #[test]
    fn join_url_carries_town_and_name() {
        let config = ClientConfig::new(
            Url::parse("ws://example.test/town").expect("url"),
            TownId::from("abc"),
            "Ada Lovelace",
        );

        assert_eq!(
            config.join_url().as_str(),
            "ws://example.test/town?town_id=abc&user_name=Ada+Lovelace"
        );
    }
}
