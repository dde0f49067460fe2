//! Shared test utilities for huddle-server integration tests

pub mod client;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use huddle_server::{AppState, HuddleServer, ServerConfig};
use tokio::net::TcpListener;

/// Creates a test server with default config, returns state and address
#[allow(dead_code)]
pub async fn create_test_server() -> (Arc<AppState>, SocketAddr) {
    create_test_server_with_state(AppState::new()).await
}

/// Creates a test server that closes sessions which do not register in time
#[allow(dead_code)]
pub async fn create_test_server_with_timeout(timeout: Duration) -> (Arc<AppState>, SocketAddr) {
    create_test_server_with_state(AppState::new().with_registration_timeout(Some(timeout))).await
}

async fn create_test_server_with_state(state: AppState) -> (Arc<AppState>, SocketAddr) {
    let state = Arc::new(state);
    let server = HuddleServer::with_state(ServerConfig::default(), Arc::clone(&state));
    let addr = spawn_server(server).await;

    (state, addr)
}

/// Spawns server in background task, returns bound address
async fn spawn_server(server: HuddleServer) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let _ = server.run_with_listener(listener).await;
    });

    // Brief delay to ensure server is accepting connections
    tokio::time::sleep(Duration::from_millis(10)).await;

    addr
}

/// Wait until the registry holds `expected` sessions
#[allow(dead_code)]
pub async fn wait_for_sessions(state: &AppState, expected: usize) {
    let start = std::time::Instant::now();
    while state.registry.len().await != expected {
        assert!(
            start.elapsed() < Duration::from_secs(2),
            "Timeout waiting for {} sessions",
            expected
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
