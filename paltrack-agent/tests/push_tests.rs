use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use paltrack_agent::{AgentConfig, AgentError, IngestClient, push_once, run};
use paltrack_backend::{config::Config, create_app, helpers};
use paltrack_store::{Broadcaster, PlayerSample, StateStore};
use tokio::net::TcpListener;

const TOKEN: &str = "agent-test-token";

/// Serve the backend on an ephemeral port and return its ingest URL
async fn spawn_backend(store: StateStore, broadcaster: Broadcaster) -> String {
    let config = Config {
        ingest_token_hashes: vec![helpers::hash_token(TOKEN)],
        ..Config::default()
    };
    let app = create_app(store, broadcaster, &config);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });
    format!("http://{addr}/ingest")
}

fn players_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "paltrack-push-{}-{}.json",
        name,
        std::process::id()
    ));
    std::fs::write(&path, contents).unwrap();
    path
}

fn agent_config(endpoint: String, players_file: PathBuf, token: &str) -> AgentConfig {
    AgentConfig {
        server_id: "pal-01".to_string(),
        server_name: "Palworld BR".to_string(),
        players_file,
        endpoint,
        token: token.to_string(),
        interval: Duration::from_secs(1),
        http_timeout: Duration::from_secs(5),
    }
}

#[tokio::test]
async fn push_once_lands_in_the_store() {
    let store = StateStore::new();
    let broadcaster = Broadcaster::new();
    let mut sub = broadcaster.subscribe().await;
    let endpoint = spawn_backend(store.clone(), broadcaster).await;
    let file = players_file(
        "once",
        r#"{"players":[{"name":"Bob","x":1.0,"y":2.0,"z":3.0}]}"#,
    );
    let config = agent_config(endpoint, file.clone(), TOKEN);
    let client = IngestClient::new(&config).unwrap();

    let sent = push_once(&config, &client).await.unwrap();

    assert_eq!(sent, 1);
    let state = store.get("pal-01").await.unwrap();
    assert_eq!(state.server_name, "Palworld BR");
    assert_eq!(state.players, vec![PlayerSample::new("Bob", 1.0, 2.0, 3.0)]);
    assert_eq!(sub.try_recv().unwrap().server_id, "pal-01");

    let _ = std::fs::remove_file(file);
}

#[tokio::test]
async fn wrong_token_is_reported_as_status() {
    let store = StateStore::new();
    let endpoint = spawn_backend(store.clone(), Broadcaster::new()).await;
    let file = players_file("token", "[]");
    let config = agent_config(endpoint, file.clone(), "not-the-token");
    let client = IngestClient::new(&config).unwrap();

    let err = push_once(&config, &client).await.unwrap_err();

    assert!(matches!(err, AgentError::Status(401)), "got {err:?}");
    assert!(store.is_empty());

    let _ = std::fs::remove_file(file);
}

#[tokio::test]
async fn unreachable_backend_is_an_http_error() {
    // bind then drop to get a port nothing listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let file = players_file("down", "[]");
    let config = agent_config(format!("http://{addr}/ingest"), file.clone(), TOKEN);
    let client = IngestClient::new(&config).unwrap();

    let err = push_once(&config, &client).await.unwrap_err();
    assert!(matches!(err, AgentError::Http(_)), "got {err:?}");

    let _ = std::fs::remove_file(file);
}

#[tokio::test]
async fn run_pushes_immediately_and_stops_on_shutdown() {
    let store = StateStore::new();
    let endpoint = spawn_backend(store.clone(), Broadcaster::new()).await;
    let file = players_file("run", r#"[{"name":"Ann","x":0,"y":0,"z":0}]"#);
    let config = agent_config(endpoint, file.clone(), TOKEN);

    run(config, tokio::time::sleep(Duration::from_millis(500)))
        .await
        .unwrap();

    let state = store.get("pal-01").await.unwrap();
    assert_eq!(state.players.len(), 1);
    assert_eq!(state.players[0].name, "Ann");

    let _ = std::fs::remove_file(file);
}

#[tokio::test]
async fn run_survives_a_missing_file() {
    let store = StateStore::new();
    let endpoint = spawn_backend(store.clone(), Broadcaster::new()).await;
    let missing = std::env::temp_dir().join("paltrack-push-never-written.json");
    let config = agent_config(endpoint, missing, TOKEN);

    // failed cycles are logged, not returned
    run(config, tokio::time::sleep(Duration::from_millis(200)))
        .await
        .unwrap();

    assert!(store.is_empty());
}
