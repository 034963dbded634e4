use crate::AppState;
use crate::error::AppError;
use crate::validation;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_macros::debug_handler;
use paltrack_store::{PlayerSample, ServerState, ServerSummary, StoreError, Update};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Snapshot pushed by an agent. Absent and `null` fields both read as `None`,
/// so a missing `server_id` is reported by validation rather than by the
/// JSON extractor.
#[derive(Deserialize)]
pub(crate) struct IngestRequest {
    #[serde(default)]
    server_id: Option<String>,
    #[serde(default)]
    server_name: Option<String>,
    #[serde(default)]
    players: Option<Vec<PlayerSample>>,
}

#[derive(Serialize)]
pub(crate) struct IngestResponse {
    status: &'static str,
}

#[debug_handler]
pub(crate) async fn ingest(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<IngestRequest>,
) -> Result<impl IntoResponse, AppError> {
    let server_id = payload.server_id.unwrap_or_default();
    let server_name = payload.server_name.unwrap_or_default();
    let players = payload.players.unwrap_or_default();

    validation::validate_snapshot(&server_id, &server_name, &players)?;

    let committed = state.store.upsert(server_id, server_name, players).await;

    // Never awaits a subscriber; delivery problems stay inside the broadcaster
    state
        .broadcaster
        .notify(Update::new(committed.server_id.clone()))
        .await;

    tracing::info!(
        server_id = %committed.server_id,
        player_count = committed.player_count(),
        "snapshot ingested"
    );

    Ok((StatusCode::OK, Json(IngestResponse { status: "ok" })))
}

pub(crate) async fn list_servers(State(state): State<Arc<AppState>>) -> Json<Vec<ServerSummary>> {
    Json(state.store.list_all().await)
}

pub(crate) async fn server_players(
    State(state): State<Arc<AppState>>,
    Path(server_id): Path<String>,
) -> Result<Json<ServerState>, AppError> {
    match state.store.get(&server_id).await {
        Ok(server) => Ok(Json(server)),
        Err(StoreError::ServerNotFound) => Err(AppError::NotFound(server_id)),
    }
}
