pub mod auth;
mod routes;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

use anyhow::Result;
use tokio::net::TcpListener;

pub use routes::{build_router, InnerServerState, Op, ServerState};

/// Serve the REST contract on `listener` until the process exits.
pub async fn serve(listener: TcpListener, state: ServerState) -> Result<()> {
    let addr = listener.local_addr()?;
    state.set_public_origin(format!("http://{addr}"));
    let app = routes::build_router(state);
    axum::serve(listener, app).await?;
    Ok(())
}
