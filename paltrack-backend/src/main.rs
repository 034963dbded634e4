use paltrack_backend::{config::Config, create_app};
use paltrack_store::{Broadcaster, StateStore};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Initialize tracing for structured logging
    #[cfg(debug_assertions)]
    let log_level = "debug";
    #[cfg(not(debug_assertions))]
    let log_level = "info";

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_target(false)
        .compact()
        .init();
    tracing::info!("Starting paltrack backend...");

    // Load configuration from environment variables or use defaults
    let config = Config::from_env();
    tracing::info!(
        "Configuration: port={}, body_limit={}KB, timeout={}s, ingest_tokens={}, subscriber_buffer={}, ws_send_timeout={}s",
        config.port,
        config.request_body_limit / 1024,
        config.request_timeout.as_secs(),
        config.ingest_token_hashes.len(),
        config.subscriber_buffer,
        config.ws_send_timeout.as_secs()
    );
    tracing::info!(
        "Rate limits: ingest={}/sec (burst {}), general={}/sec (burst {})",
        config.rate_limit_ingest_per_sec,
        config.rate_limit_ingest_burst,
        config.rate_limit_general_per_sec,
        config.rate_limit_general_burst
    );
    if config.ingest_token_hashes.is_empty() {
        tracing::warn!("INGEST_TOKENS is empty, every ingest will be rejected");
    }

    let store = StateStore::new();
    let broadcaster = Broadcaster::with_buffer(config.subscriber_buffer);
    let app = create_app(store, broadcaster, &config);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
