//! Agent configuration, read from the environment (and a local `.env`).
//!
//! Required: `PALTRACK_SERVER_ID`, `PALTRACK_PLAYERS_FILE`, `PALTRACK_TOKEN`.
//! Optional: `PALTRACK_SERVER_NAME` (defaults to the id), `PALTRACK_ENDPOINT`,
//! `PALTRACK_INTERVAL_SECS` (10), `PALTRACK_HTTP_TIMEOUT_SECS` (10).

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{AgentError, Result};

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8080/ingest";

#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub server_id: String,
    pub server_name: String,
    /// JSON file the position exporter rewrites
    pub players_file: PathBuf,
    /// Full URL of the backend's ingest route
    pub endpoint: String,
    pub token: String,
    pub interval: Duration,
    pub http_timeout: Duration,
}

impl AgentConfig {
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| AgentError::Config(format!("missing required env var {key}")))
        };
        let seconds = |key: &str, default: u64| -> Result<Duration> {
            match lookup(key) {
                None => Ok(Duration::from_secs(default)),
                Some(raw) => raw
                    .trim()
                    .parse::<u64>()
                    .map(|secs| Duration::from_secs(secs.max(1)))
                    .map_err(|e| AgentError::Config(format!("invalid {key}: {e}"))),
            }
        };

        let server_id = required("PALTRACK_SERVER_ID")?;
        let server_name = lookup("PALTRACK_SERVER_NAME").unwrap_or_else(|| server_id.clone());

        Ok(Self {
            server_name,
            players_file: PathBuf::from(required("PALTRACK_PLAYERS_FILE")?),
            endpoint: lookup("PALTRACK_ENDPOINT").unwrap_or_else(|| DEFAULT_ENDPOINT.to_owned()),
            token: required("PALTRACK_TOKEN")?,
            interval: seconds("PALTRACK_INTERVAL_SECS", 10)?,
            http_timeout: seconds("PALTRACK_HTTP_TIMEOUT_SECS", 10)?,
            server_id,
        })
    }
}
