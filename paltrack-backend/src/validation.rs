//! Input validation for ingest snapshots

use paltrack_store::PlayerSample;
use thiserror::Error;

pub const MAX_SERVER_ID_LEN: usize = 64;
pub const MAX_SERVER_NAME_LEN: usize = 100;
pub const MAX_PLAYERS: usize = 1000;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("server_id is missing or empty")]
    ServerIdEmpty,

    #[error("server_id too long (max 64 characters, got {0})")]
    ServerIdTooLong(usize),

    #[error("server_id contains invalid characters (no whitespace, control characters or '/')")]
    ServerIdInvalidChars,

    #[error("server_name too long (max 100 characters, got {0})")]
    ServerNameTooLong(usize),

    #[error("Player list too large (max {max} players, got {actual})")]
    PlayerListTooLarge { max: usize, actual: usize },

    #[error("Player '{0}' has a non-finite coordinate")]
    NonFiniteCoordinate(String),
}

/// Validates a server identifier
///
/// Rules:
/// - Cannot be empty
/// - Max 64 characters
/// - No whitespace, control characters or '/', since it is used as a path segment
pub fn validate_server_id(server_id: &str) -> Result<(), ValidationError> {
    if server_id.is_empty() {
        return Err(ValidationError::ServerIdEmpty);
    }

    let len = server_id.chars().count();
    if len > MAX_SERVER_ID_LEN {
        return Err(ValidationError::ServerIdTooLong(len));
    }

    if server_id
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || c == '/')
    {
        return Err(ValidationError::ServerIdInvalidChars);
    }

    Ok(())
}

/// Validates a server display name. Empty names are allowed.
pub fn validate_server_name(name: &str) -> Result<(), ValidationError> {
    let len = name.chars().count();
    if len > MAX_SERVER_NAME_LEN {
        return Err(ValidationError::ServerNameTooLong(len));
    }
    Ok(())
}

/// Validates the player list of a snapshot
///
/// Rules:
/// - Max 1000 players per snapshot
/// - Every coordinate must be finite
pub fn validate_players(players: &[PlayerSample]) -> Result<(), ValidationError> {
    if players.len() > MAX_PLAYERS {
        return Err(ValidationError::PlayerListTooLarge {
            max: MAX_PLAYERS,
            actual: players.len(),
        });
    }

    if let Some(bad) = players
        .iter()
        .find(|p| !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()))
    {
        return Err(ValidationError::NonFiniteCoordinate(bad.name.clone()));
    }

    Ok(())
}

/// Validates a whole snapshot; nothing may be written unless this passes.
pub fn validate_snapshot(
    server_id: &str,
    server_name: &str,
    players: &[PlayerSample],
) -> Result<(), ValidationError> {
    validate_server_id(server_id)?;
    validate_server_name(server_name)?;
    validate_players(players)
}
