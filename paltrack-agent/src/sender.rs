use paltrack_store::PlayerSample;
use serde::Serialize;
use tracing::debug;

use crate::config::AgentConfig;
use crate::error::{AgentError, Result};

/// Body of `POST /ingest`.
#[derive(Debug, Serialize)]
pub struct IngestPayload<'a> {
    pub server_id: &'a str,
    pub server_name: &'a str,
    pub players: &'a [PlayerSample],
}

/// Authenticated client for the backend's ingest route.
pub struct IngestClient {
    client: reqwest::Client,
    endpoint: String,
    token: String,
}

impl IngestClient {
    pub fn new(config: &AgentConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            token: config.token.clone(),
        })
    }

    pub async fn send(&self, payload: &IngestPayload<'_>) -> Result<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AgentError::Status(status.as_u16()));
        }

        debug!(
            server_id = payload.server_id,
            player_count = payload.players.len(),
            "snapshot delivered"
        );
        Ok(())
    }
}
