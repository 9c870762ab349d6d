//! End-to-end lifecycle tests over a real socket.

use std::net::SocketAddr;
use std::time::Duration;

use railboard_core::{StoreStatus, Stores};
use railboard_server::{
    create_router, handshake, ApiMetrics, ApiServer, AppState, LifecycleState, ServeError,
};
use serde_json::{json, Value};

const ACK_TIMEOUT: Duration = Duration::from_secs(2);

fn client() -> reqwest::Client {
    // Pooled keep-alive connections would outlive the listener.
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .timeout(Duration::from_secs(2))
        .build()
        .unwrap()
}

async fn start(stores: Stores) -> (ApiServer, std::sync::Arc<ApiMetrics>) {
    let metrics = ApiMetrics::shared().unwrap();
    let router = create_router(AppState::new(stores), metrics.clone());
    let server = ApiServer::bind("127.0.0.1:0", router).await.unwrap();
    (server, metrics)
}

fn url(addr: SocketAddr, path: &str) -> String {
    format!("http://{addr}{path}")
}

#[tokio::test]
async fn test_serve_then_stop_closes_listener() {
    let (server, _) = start(Stores::new()).await;
    let addr = server.local_addr();
    let mut states = server.subscribe();
    let (handle, server_handshake) = handshake();
    let task = tokio::spawn(server.run(server_handshake, Duration::from_secs(1)));

    states
        .wait_for(|state| *state == LifecycleState::Serving)
        .await
        .unwrap();

    let client = client();
    let response = client.get(url(addr, "/v2")).send().await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "application/json"
    );
    assert_eq!(response.json::<Value>().await.unwrap(), json!({"version": 2}));

    tokio::time::timeout(ACK_TIMEOUT, handle.stop())
        .await
        .expect("acknowledgment within timeout")
        .expect("acknowledgment sent");
    assert_eq!(*states.borrow(), LifecycleState::Stopped);
    task.await.unwrap().unwrap();

    assert!(client.get(url(addr, "/v2")).send().await.is_err());
}

#[tokio::test]
async fn test_store_changes_are_visible_without_restart() {
    let stores = Stores::new();
    let (server, metrics) = start(stores.clone()).await;
    let addr = server.local_addr();
    let (handle, server_handshake) = handshake();
    let task = tokio::spawn(server.run(server_handshake, Duration::from_secs(1)));

    let client = client();
    let status: Value = client
        .get(url(addr, "/v2/status"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["departures"], "UNKNOWN");

    stores.departures.set_status(StoreStatus::Down).await;

    let status: Value = client
        .get(url(addr, "/v2/status"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["departures"], "DOWN");

    assert!(metrics
        .render()
        .contains("railboard_api_requests_total{path=\"/v2/status\"} 2"));

    handle.stop().await.unwrap();
    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_second_bind_on_same_address_fails() {
    let (server, _) = start(Stores::new()).await;
    let addr = server.local_addr();
    let (handle, server_handshake) = handshake();
    let task = tokio::spawn(server.run(server_handshake, Duration::from_secs(1)));

    let metrics = ApiMetrics::shared().unwrap();
    let result = ApiServer::bind(&addr.to_string(), create_router(AppState::default(), metrics)).await;
    assert!(matches!(result, Err(ServeError::Bind { .. })));

    // The first server is unaffected.
    let response = client().get(url(addr, "/version")).send().await.unwrap();
    assert_eq!(response.status(), 200);

    handle.stop().await.unwrap();
    task.await.unwrap().unwrap();
}
