use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One player's position as reported by a game server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSample {
  /// Display name, not unique across servers
  pub name: String,
  pub x: f64,
  pub y: f64,
  pub z: f64,
}

impl PlayerSample {
  pub fn new(name: impl Into<String>, x: f64, y: f64, z: f64) -> Self {
    Self {
      name: name.into(),
      x,
      y,
      z,
    }
  }
}

/// Latest known snapshot of a single game server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerState {
  /// Stable key reported by the agent
  pub server_id: String,
  /// Display label, last write wins
  pub server_name: String,
  /// Replaced wholesale on every ingest
  pub players: Vec<PlayerSample>,
  /// When the current snapshot was committed
  pub last_update: DateTime<Utc>,
}

impl ServerState {
  /// Project to the bulk listing shape (no player detail).
  pub fn summary(&self) -> ServerSummary {
    ServerSummary {
      server_id: self.server_id.clone(),
      server_name: self.server_name.clone(),
      last_update: self.last_update,
      player_count: self.players.len(),
    }
  }

  pub fn player_count(&self) -> usize {
    self.players.len()
  }
}

/// Server listing entry without player detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSummary {
  pub server_id: String,
  pub server_name: String,
  pub last_update: DateTime<Utc>,
  pub player_count: usize,
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  #[test]
  fn test_detail_wire_shape() {
    let state = ServerState {
      server_id: "srv1".to_string(),
      server_name: "Alpha".to_string(),
      players: vec![PlayerSample::new("Bob", 1.0, 2.0, 3.0)],
      last_update: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
    };

    let value = serde_json::to_value(&state).unwrap();
    assert_eq!(
      value,
      serde_json::json!({
        "server_id": "srv1",
        "server_name": "Alpha",
        "players": [{ "name": "Bob", "x": 1.0, "y": 2.0, "z": 3.0 }],
        "last_update": "2024-01-02T03:04:05Z",
      })
    );
  }

  #[test]
  fn test_summary_drops_player_detail() {
    let state = ServerState {
      server_id: "srv1".to_string(),
      server_name: "Alpha".to_string(),
      players: vec![
        PlayerSample::new("Bob", 1.0, 2.0, 3.0),
        PlayerSample::new("Bob", 4.0, 5.0, 6.0),
      ],
      last_update: Utc::now(),
    };

    let summary = state.summary();
    assert_eq!(summary.player_count, 2);
    assert_eq!(summary.last_update, state.last_update);

    let value = serde_json::to_value(&summary).unwrap();
    assert!(value.get("players").is_none());
    assert_eq!(value["player_count"], 2);
  }
}
