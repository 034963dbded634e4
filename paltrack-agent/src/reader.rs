use std::path::Path;

use paltrack_store::PlayerSample;
use serde::Deserialize;

use crate::error::{AgentError, Result};

/// The exporters write either `{"players": [...]}` or a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum PlayersFile {
    Wrapped { players: Vec<PlayerSample> },
    Bare(Vec<PlayerSample>),
}

impl PlayersFile {
    fn into_players(self) -> Vec<PlayerSample> {
        match self {
            PlayersFile::Wrapped { players } | PlayersFile::Bare(players) => players,
        }
    }
}

pub fn parse_players(raw: &str) -> Result<Vec<PlayerSample>> {
    let file: PlayersFile = serde_json::from_str(raw)?;
    Ok(file.into_players())
}

/// Read the current player positions from `path`.
pub async fn read_players(path: &Path) -> Result<Vec<PlayerSample>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| AgentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    parse_players(&raw)
}
