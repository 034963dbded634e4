//! Collection agent: polls the player positions file written next to a game
//! server and pushes it to the central backend on a fixed interval.
//!
//! A failed cycle (missing file, bad JSON, backend down) is logged and the
//! next tick simply tries again; there is no other retry.

pub mod config;
pub mod error;
pub mod reader;
pub mod sender;

use std::future::Future;

use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

pub use config::AgentConfig;
pub use error::{AgentError, Result};
pub use sender::{IngestClient, IngestPayload};

/// Read the players file once and push it. Returns the number of players sent.
pub async fn push_once(config: &AgentConfig, client: &IngestClient) -> Result<usize> {
    let players = reader::read_players(&config.players_file).await?;
    client
        .send(&IngestPayload {
            server_id: &config.server_id,
            server_name: &config.server_name,
            players: &players,
        })
        .await?;
    Ok(players.len())
}

/// Push every `config.interval` until `shutdown` resolves. The first push
/// happens immediately.
pub async fn run(config: AgentConfig, shutdown: impl Future<Output = ()>) -> Result<()> {
    let client = IngestClient::new(&config)?;
    let mut ticker = tokio::time::interval(config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    info!(
        server_id = %config.server_id,
        endpoint = %config.endpoint,
        interval_secs = config.interval.as_secs(),
        "agent started"
    );

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("agent stopping");
                return Ok(());
            }
            _ = ticker.tick() => {
                match push_once(&config, &client).await {
                    Ok(player_count) => info!(player_count, "snapshot pushed"),
                    Err(e) => warn!(error = %e, "push failed, retrying next tick"),
                }
            }
        }
    }
}
