use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::Response,
    routing::{get, post},
    Router,
};
use bytes::Bytes;
use fitshare_media::media_key;

use super::{ApiError, Op, ServerState, StoredMedia};

/// Upload endpoint, behind auth.
pub fn routes() -> Router<ServerState> {
    Router::new().route("/api/media/upload", post(upload))
}

/// Uploaded files are served without auth so image URLs work anywhere.
pub fn public_routes() -> Router<ServerState> {
    Router::new().route("/api/media/files/{*key}", get(fetch))
}

async fn upload(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> Result<String, ApiError> {
    state.enter(Op::Upload)?;

    let mut file: Option<(String, String, Bytes)> = None;
    let mut folder = String::from("uploads");

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("multipart: {e}")))?
    {
        match field.name() {
            Some("file") => {
                let name = field.file_name().unwrap_or("upload.bin").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("file part: {e}")))?;
                file = Some((name, content_type, data));
            }
            Some("folder") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("folder part: {e}")))?;
                let value = value.trim().trim_matches('/');
                if !value.is_empty() {
                    if !is_valid_folder(value) {
                        return Err(ApiError::BadRequest(format!("invalid folder: {value}")));
                    }
                    folder = value.to_string();
                }
            }
            _ => {}
        }
    }

    let (name, content_type, data) =
        file.ok_or_else(|| ApiError::BadRequest("missing file part".into()))?;
    if data.is_empty() {
        return Err(ApiError::BadRequest("empty file".into()));
    }

    // Sanitized so the key is a valid URL path as-is.
    let key = media_key(&folder, &uuid::Uuid::new_v4().to_string(), &name);
    let size = data.len();
    state
        .media
        .lock()
        .unwrap()
        .insert(key.clone(), StoredMedia { content_type, data });

    let origin = state.public_origin.lock().unwrap().clone();
    tracing::info!(%key, bytes = size, "stored upload");
    Ok(format!("{origin}/api/media/files/{key}"))
}

fn is_valid_folder(folder: &str) -> bool {
    folder.split('/').all(|segment| {
        !segment.is_empty()
            && segment
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
    })
}

async fn fetch(
    State(state): State<ServerState>,
    Path(key): Path<String>,
) -> Result<Response, ApiError> {
    let stored = state
        .media
        .lock()
        .unwrap()
        .get(&key)
        .cloned()
        .ok_or_else(|| ApiError::NotFound(format!("media {key} not found")))?;
    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, stored.content_type)
        .body(Body::from(stored.data))
        .unwrap())
}

#[cfg(test)]
mod tests {
    use super::is_valid_folder;

    #[test]
    fn folder_must_be_plain_segments() {
        assert!(is_valid_folder("workoutStories"));
        assert!(is_valid_folder("users/u_1"));
        assert!(!is_valid_folder("a#b"));
        assert!(!is_valid_folder("../etc"));
        assert!(!is_valid_folder("a//b"));
    }
}
