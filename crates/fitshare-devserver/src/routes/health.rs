use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use super::ServerState;

pub fn routes() -> Router<ServerState> {
    Router::new().route("/api/health", get(health))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
