//! In-memory registry of game-server snapshots and the live update fan-out.
//!
//! Nothing here is durable: the registry is rebuilt from the next round of
//! agent pushes after a restart.

mod broadcast;
mod error;
mod models;

pub use broadcast::{
  Broadcaster, DEFAULT_SUBSCRIBER_BUFFER, NotifyReport, SubscriberId, Subscription, Update,
};
pub use error::{Result, StoreError, TransportError};
pub use models::{PlayerSample, ServerState, ServerSummary};

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use scc::hash_map::Entry;
use tracing::debug;

/// Latest state per server id.
///
/// Backed by `scc::HashMap`, so a write only locks the bucket of its own key:
/// upserts to different servers proceed in parallel and readers of one id see
/// either the previous or the next snapshot, never a mix.
#[derive(Clone, Default)]
pub struct StateStore {
  servers: Arc<scc::HashMap<String, ServerState>>,
}

impl StateStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Replace the full state of `server_id`, creating it on first sight.
  /// Returns a copy of what was committed.
  pub async fn upsert(
    &self,
    server_id: String,
    server_name: String,
    players: Vec<PlayerSample>,
  ) -> ServerState {
    let committed = match self.servers.entry_async(server_id).await {
      Entry::Occupied(mut entry) => {
        let state = entry.get_mut();
        state.server_name = server_name;
        state.players = players;
        state.last_update = commit_time(Some(state.last_update));
        state.clone()
      }
      Entry::Vacant(entry) => {
        let state = ServerState {
          server_id: entry.key().clone(),
          server_name,
          players,
          last_update: commit_time(None),
        };
        entry.insert_entry(state.clone());
        state
      }
    };

    debug!(
      server_id = %committed.server_id,
      player_count = committed.player_count(),
      "server state replaced"
    );
    committed
  }

  /// Summaries of every known server, ordered by id.
  pub async fn list_all(&self) -> Vec<ServerSummary> {
    let mut summaries = Vec::with_capacity(self.servers.len());
    self
      .servers
      .iter_async(|_, state| {
        summaries.push(state.summary());
        true
      })
      .await;
    summaries.sort_by(|a, b| a.server_id.cmp(&b.server_id));
    summaries
  }

  /// Independent copy of one server's state.
  pub async fn get(&self, server_id: &str) -> Result<ServerState> {
    self
      .servers
      .read_async(server_id, |_, state| state.clone())
      .await
      .ok_or(StoreError::ServerNotFound)
  }

  pub fn len(&self) -> usize {
    self.servers.len()
  }

  pub fn is_empty(&self) -> bool {
    self.servers.is_empty()
  }
}

/// Wall-clock commit time, kept strictly after the previous commit of the same id.
fn commit_time(previous: Option<DateTime<Utc>>) -> DateTime<Utc> {
  let now = Utc::now();
  match previous {
    Some(prev) if now <= prev => prev + TimeDelta::microseconds(1),
    _ => now,
  }
}
