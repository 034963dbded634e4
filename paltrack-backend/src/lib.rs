pub mod config;
mod error;
pub mod helpers;
mod middleware;
mod routes;
pub mod validation;
pub mod ws;

use axum::{
    Router,
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use paltrack_store::{Broadcaster, StateStore};
use std::sync::Arc;
use std::time::Duration;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor,
};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;

pub struct AppState {
    pub store: StateStore,
    pub broadcaster: Broadcaster,
    pub ingest_token_hashes: Vec<String>,
    pub ws_send_timeout: Duration,
}

/// Create the application router over the given store and broadcaster.
///
/// Both are cheap handles, so callers may keep clones to observe state.
pub fn create_app(store: StateStore, broadcaster: Broadcaster, config: &Config) -> Router {
    let state = Arc::new(AppState {
        store,
        broadcaster,
        ingest_token_hashes: config.ingest_token_hashes.clone(),
        ws_send_timeout: config.ws_send_timeout,
    });

    // Lenient rate limit for ingest - every game server pushes on a short interval
    let ingest_governor = GovernorConfigBuilder::default()
        .per_millisecond(replenish_interval_ms(config.rate_limit_ingest_per_sec))
        .burst_size(config.rate_limit_ingest_burst.max(1))
        .key_extractor(SmartIpKeyExtractor)
        .finish()
        .expect("ingest rate limit is non-zero");

    // General rate limit for queries and websocket upgrades
    let general_governor = GovernorConfigBuilder::default()
        .per_millisecond(replenish_interval_ms(config.rate_limit_general_per_sec))
        .burst_size(config.rate_limit_general_burst.max(1))
        .key_extractor(SmartIpKeyExtractor)
        .finish()
        .expect("general rate limit is non-zero");

    // Token check runs before the handler reads the body
    let ingest_routes = Router::new()
        .route("/ingest", post(routes::ingest))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::require_ingest_token,
        ))
        .layer(GovernorLayer::new(ingest_governor));

    let general_routes = Router::new()
        .route("/servers", get(routes::list_servers))
        .route("/servers/{server_id}/players", get(routes::server_players))
        .route("/ws", get(ws::live_updates))
        .layer(GovernorLayer::new(general_governor));

    Router::new()
        .route("/health", get(|| async { StatusCode::OK }))
        .merge(ingest_routes)
        .merge(general_routes)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.request_timeout,
        ))
        .layer(RequestBodyLimitLayer::new(config.request_body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Milliseconds between replenished quota cells for `per_sec` requests per second.
fn replenish_interval_ms(per_sec: u64) -> u64 {
    (1000 / per_sec.max(1)).max(1)
}
