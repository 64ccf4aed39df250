//! Starts wiremock servers, skipping tests where local sockets are unavailable
//! (sandboxed CI runners).

use std::net::TcpListener;

use wiremock::MockServer;

/// Starts a mock server, or returns `None` when no local port can be bound.
pub async fn start_mock_server_or_skip() -> Option<MockServer> {
    match TcpListener::bind("127.0.0.1:0") {
        Ok(listener) => Some(MockServer::builder().listener(listener).start().await),
        Err(error) => {
            eprintln!("skipping: cannot bind a local socket ({error})");
            None
        }
    }
}
