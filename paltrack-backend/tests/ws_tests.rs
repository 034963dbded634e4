use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use futures::StreamExt;
use paltrack_backend::{config::Config, create_app, helpers, ws::UPDATE_FRAME};
use paltrack_store::{Broadcaster, StateStore};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tower::ServiceExt;

const TOKEN: &str = "pal-test-token";

/// Serve the app on an ephemeral port; returns the router and the `/ws` URL
async fn spawn_app(store: StateStore, broadcaster: Broadcaster) -> (axum::Router, String) {
    let config = Config {
        ingest_token_hashes: vec![helpers::hash_token(TOKEN)],
        ..Config::default()
    };
    let app = create_app(store, broadcaster, &config);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let served = app.clone();
    tokio::spawn(async move {
        axum::serve(
            listener,
            served.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });
    (app, format!("ws://{addr}/ws"))
}

/// Subscriptions are registered by the connection task after the upgrade.
async fn wait_for_subscribers(broadcaster: &Broadcaster, expected: usize) {
    let waited = timeout(Duration::from_secs(2), async {
        while broadcaster.subscriber_count() != expected {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(
        waited.is_ok(),
        "expected {expected} subscribers, have {}",
        broadcaster.subscriber_count()
    );
}

async fn ingest(app: &axum::Router, server_id: &str) -> StatusCode {
    let body = json!({ "server_id": server_id, "server_name": "Alpha", "players": [] });
    let request = Request::builder()
        .uri("/ingest")
        .method("POST")
        .header("X-Forwarded-For", "127.0.0.1")
        .header("Authorization", format!("Bearer {TOKEN}"))
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap().status()
}

#[tokio::test]
async fn test_ingest_pushes_one_update_frame() {
    // GIVEN: Two live clients
    let broadcaster = Broadcaster::new();
    let (app, url) = spawn_app(StateStore::new(), broadcaster.clone()).await;
    let (mut alive, _) = connect_async(url.as_str()).await.unwrap();
    let (gone, _) = connect_async(url.as_str()).await.unwrap();
    wait_for_subscribers(&broadcaster, 2).await;

    // WHEN: One of them drops its connection
    drop(gone);

    // THEN: Its subscription is released
    wait_for_subscribers(&broadcaster, 1).await;

    // WHEN: A snapshot is ingested
    assert_eq!(ingest(&app, "srv1").await, StatusCode::OK);

    // THEN: The remaining client gets exactly one update frame
    let frame = timeout(Duration::from_secs(2), alive.next())
        .await
        .expect("no frame within 2s")
        .expect("stream ended")
        .unwrap();
    match frame {
        Message::Text(text) => assert_eq!(text.as_str(), UPDATE_FRAME),
        other => panic!("expected text frame, got {other:?}"),
    }
    assert!(
        timeout(Duration::from_millis(200), alive.next())
            .await
            .is_err(),
        "a single ingest produced more than one frame"
    );
}

#[tokio::test]
async fn test_every_ingest_reaches_the_socket() {
    // GIVEN: One live client
    let broadcaster = Broadcaster::new();
    let (app, url) = spawn_app(StateStore::new(), broadcaster.clone()).await;
    let (mut client, _) = connect_async(url.as_str()).await.unwrap();
    wait_for_subscribers(&broadcaster, 1).await;

    // WHEN: Two different servers push in turn
    for server_id in ["srv1", "srv2"] {
        assert_eq!(ingest(&app, server_id).await, StatusCode::OK);

        // THEN: Each push is followed by its own frame
        let frame = timeout(Duration::from_secs(2), client.next())
            .await
            .expect("no frame within 2s")
            .expect("stream ended")
            .unwrap();
        assert!(matches!(frame, Message::Text(ref t) if t.as_str() == UPDATE_FRAME));
    }
}

#[tokio::test]
async fn test_close_frame_unsubscribes() {
    // GIVEN: One live client
    let broadcaster = Broadcaster::new();
    let (app, url) = spawn_app(StateStore::new(), broadcaster.clone()).await;
    let (mut client, _) = connect_async(url.as_str()).await.unwrap();
    wait_for_subscribers(&broadcaster, 1).await;

    // WHEN: The client closes the connection cleanly
    client.close(None).await.unwrap();

    // THEN: The subscriber is removed and ingest keeps working without it
    wait_for_subscribers(&broadcaster, 0).await;
    assert_eq!(ingest(&app, "srv1").await, StatusCode::OK);
    assert_eq!(broadcaster.subscriber_count(), 0);
}
