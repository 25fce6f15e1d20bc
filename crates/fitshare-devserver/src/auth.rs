use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::routes::ServerState;

/// Axum middleware that enforces the bearer token.
///
/// With no token configured every request passes through (open access).
/// Otherwise requires `Authorization: Bearer <token>`.
pub async fn auth_middleware(
    State(state): State<ServerState>,
    request: Request,
    next: Next,
) -> Response {
    let expected = match &state.token {
        Some(token) => token,
        None => return next.run(request).await,
    };

    let presented = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match presented {
        Some(token) if token == expected => next.run(request).await,
        Some(_) => unauthorized("invalid token"),
        None => unauthorized("missing bearer token"),
    }
}

fn unauthorized(message: &str) -> Response {
    tracing::debug!(message, "rejected request");
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": message }))).into_response()
}
