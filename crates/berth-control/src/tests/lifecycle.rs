use crate::tests::{RecordingService, test_config};
use crate::{HostedService, LifecycleCoordinator, Result, RunningStatus, ServiceHandle};

use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{Duration, timeout};
use url::Url;

/// HostedService double handing out a shared recording stop-handle.
struct StubService {
    handle: Arc<RecordingService>,
}

#[async_trait]
impl HostedService for StubService {
    async fn start(&self, _base_uri: &Url) -> Result<Arc<dyn ServiceHandle>> {
        Ok(self.handle.clone())
    }
}

#[tokio::test]
async fn given_coordinator_when_started_then_enabled_despite_unreachable_prior_check() {
    let coordinator = LifecycleCoordinator::new(test_config());
    let handle = Arc::new(RecordingService::new());
    let service = StubService {
        handle: handle.clone(),
    };

    let running = coordinator.start(&service).await.unwrap();

    assert_eq!(running.status(), RunningStatus::Enabled);
    assert_eq!(running.base_uri().as_str(), "http://127.0.0.1:8080/");
    assert_eq!(handle.stops(), 0);
}

#[tokio::test]
async fn given_running_server_when_shutdown_this_then_disabled_and_stop_idempotent() {
    let coordinator = LifecycleCoordinator::new(test_config());
    let handle = Arc::new(RecordingService::new());
    let service = StubService {
        handle: handle.clone(),
    };
    let running = coordinator.start(&service).await.unwrap();

    running.shutdown_this().await;
    running.shutdown_this().await;

    assert_eq!(running.status(), RunningStatus::Disabled);
    assert_eq!(handle.stops(), 1, "racing stop callers must not double-drain");

    timeout(Duration::from_secs(1), running.wait_for_stop())
        .await
        .expect("a finished shutdown should release the waiting process");
}

#[tokio::test]
async fn given_running_server_when_token_arrives_then_full_status_sequence() {
    let coordinator = LifecycleCoordinator::new(test_config());
    let status = coordinator.subscribe_status();
    let handle = Arc::new(RecordingService::observing(status));
    let service = StubService {
        handle: handle.clone(),
    };
    let running = coordinator.start(&service).await.unwrap();

    let control = running
        .controller()
        .local_addr()
        .await
        .unwrap()
        .expect("control channel is listening");
    let mut stream = TcpStream::connect(control).await.unwrap();
    stream.write_all(b"SHUTDOWN").await.unwrap();

    timeout(Duration::from_secs(5), running.wait_for_stop())
        .await
        .expect("token must shut the instance down");

    assert_eq!(handle.stops(), 1);
    assert_eq!(
        *handle.status_at_stop.lock().unwrap(),
        Some(RunningStatus::Restricted)
    );
    assert_eq!(running.status(), RunningStatus::Disabled);
}

#[tokio::test]
async fn given_prior_instance_when_stop_existing_then_port_reported_quiet() {
    // A listener that vanishes right after the token arrives stands in for
    // a prior instance honoring the shutdown command.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        let _ = listener.accept().await;
        drop(listener);
    });

    let mut config = test_config();
    config.control_port = port;
    let coordinator = LifecycleCoordinator::new(config);

    let quiet = timeout(Duration::from_secs(2), coordinator.stop_existing())
        .await
        .unwrap()
        .unwrap();

    assert!(quiet);
}
