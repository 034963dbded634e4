use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid players file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("ingest request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("ingest rejected with status {0}")]
    Status(u16),
}

pub type Result<T> = std::result::Result<T, AgentError>;
