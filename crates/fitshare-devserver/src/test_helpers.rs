use axum::Router;
use tokio::net::TcpListener;

pub use crate::routes::{InnerServerState, Op, ServerState};

/// Name the service crate's tests use for the shared handle.
pub type SharedState = ServerState;

/// Build a test router with empty collections and no auth.
pub fn test_router() -> (Router, ServerState) {
    let state = InnerServerState::shared(None);
    (crate::routes::build_router(state.clone()), state)
}

/// Build a test router that requires `token`.
pub fn test_router_with_auth(token: &str) -> (Router, ServerState) {
    let state = InnerServerState::shared(Some(token.to_string()));
    (crate::routes::build_router(state.clone()), state)
}

/// A running test server with base_url and background task handle.
pub struct TestServer {
    /// Origin, e.g. "http://127.0.0.1:12345".
    pub base_url: String,
    /// API root clients are configured with, `{base_url}/api`.
    pub api_url: String,
    pub state: ServerState,
    _handle: tokio::task::JoinHandle<()>,
}

/// Spawn an open-access server on a random port.
pub async fn spawn_test_server() -> TestServer {
    spawn_with_state(InnerServerState::shared(None)).await
}

/// Spawn a server that rejects requests without `Bearer <token>`.
pub async fn spawn_test_server_with_token(token: &str) -> TestServer {
    spawn_with_state(InnerServerState::shared(Some(token.to_string()))).await
}

async fn spawn_with_state(state: ServerState) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{addr}");
    state.set_public_origin(base_url.clone());
    let app = crate::routes::build_router(state.clone());
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    TestServer {
        api_url: format!("{base_url}/api"),
        base_url,
        state,
        _handle: handle,
    }
}
