use std::env;
use std::time::Duration;

use bleachdle_core::{DEFAULT_ASSET_HOST, SessionOptions, StalePolicy};

use crate::error::ClientError;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub asset_host: String,
    pub start_path: String,
    pub reveal_stagger_ms: u64,
    pub http_timeout_seconds: Option<u64>,
    pub search_policy: StalePolicy,
}

impl ClientConfig {
    /// Read the configuration from `BLEACHDLE_*` environment variables
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_source(|key| env::var(key).ok())
    }

    /// Build from any key lookup, falling back to defaults for missing keys
    pub fn from_source(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ClientError> {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let reveal_stagger_ms = parse_number("BLEACHDLE_REVEAL_STAGGER_MS", &get("BLEACHDLE_REVEAL_STAGGER_MS", "500"))?;
        let http_timeout_seconds = lookup("BLEACHDLE_HTTP_TIMEOUT_SECONDS")
            .map(|value| parse_number("BLEACHDLE_HTTP_TIMEOUT_SECONDS", &value))
            .transpose()?;
        let search_policy: StalePolicy = get("BLEACHDLE_SEARCH_POLICY", "latest").parse()?;

        Ok(Self {
            base_url: get("BLEACHDLE_BASE_URL", "http://127.0.0.1:5000")
                .trim_end_matches('/')
                .to_string(),
            asset_host: get("BLEACHDLE_ASSET_HOST", DEFAULT_ASSET_HOST),
            start_path: get("BLEACHDLE_START_PATH", "/character"),
            reveal_stagger_ms,
            http_timeout_seconds,
            search_policy,
        })
    }

    pub fn reveal_stagger(&self) -> Duration {
        Duration::from_millis(self.reveal_stagger_ms)
    }

    pub fn http_timeout(&self) -> Option<Duration> {
        self.http_timeout_seconds.map(Duration::from_secs)
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            asset_host: self.asset_host.clone(),
            reveal_stagger: self.reveal_stagger(),
            search_policy: self.search_policy,
            ..SessionOptions::default()
        }
    }
}

fn parse_number(key: &str, value: &str) -> Result<u64, ClientError> {
    value.trim().parse().map_err(|_| ClientError::Config {
        key: key.to_string(),
        value: value.to_string(),
    })
}
