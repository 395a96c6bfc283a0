use crate::health::AppState;
use crate::routes::build_router;

use axum::http::StatusCode;
use axum_test::TestServer;
use berth_control::RunningStatus;
use tokio::sync::watch;

fn server_with_status(status: RunningStatus) -> (watch::Sender<RunningStatus>, TestServer) {
    let (tx, rx) = watch::channel(status);
    let server = TestServer::new(build_router(AppState { status: rx }))
        .expect("Failed to create test server");
    (tx, server)
}

#[tokio::test]
async fn given_enabled_instance_when_health_queried_then_status_and_version_reported() {
    let (_tx, server) = server_with_status(RunningStatus::Enabled);

    let response = server.get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let json: serde_json::Value = response.json();
    assert_eq!(json["status"], "ENABLED");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert!(json["timestamp"].is_string());
}

#[tokio::test]
async fn given_status_advances_when_health_queried_again_then_new_status_visible() {
    let (tx, server) = server_with_status(RunningStatus::Enabled);

    tx.send(RunningStatus::Restricted).unwrap();

    let json: serde_json::Value = server.get("/health").await.json();
    assert_eq!(json["status"], "RESTRICTED");
}

#[tokio::test]
async fn given_any_status_when_liveness_queried_then_ok() {
    let (_tx, server) = server_with_status(RunningStatus::Starting);

    let response = server.get("/live").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.text(), "OK");
}

#[tokio::test]
async fn given_enabled_instance_when_readiness_queried_then_ready() {
    let (_tx, server) = server_with_status(RunningStatus::Enabled);

    let response = server.get("/ready").await;

    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn given_starting_instance_when_readiness_queried_then_unavailable() {
    let (_tx, server) = server_with_status(RunningStatus::Starting);

    let response = server.get("/ready").await;

    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn given_draining_instance_when_readiness_queried_then_unavailable() {
    let (_tx, server) = server_with_status(RunningStatus::Restricted);

    let response = server.get("/ready").await;

    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
}
