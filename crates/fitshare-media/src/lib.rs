mod http;
mod local;

pub use http::HttpUploader;
pub use local::LocalUploader;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use fitshare_core::TokenSource;

/// Folder for workout story images.
pub const STORY_FOLDER: &str = "workoutStories";

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("read {path}: {message}")]
    Read { path: String, message: String },

    #[error("upload rejected: {0}")]
    Rejected(String),

    #[error("upload transport: {0}")]
    Transport(String),

    #[error("media error: {0}")]
    Internal(String),
}

/// A file selected for upload.
#[derive(Debug, Clone)]
pub struct MediaFile {
    pub name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl MediaFile {
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let name = name.into();
        let content_type = guess_content_type(&name).to_string();
        Self {
            name,
            content_type,
            data: data.into(),
        }
    }

    /// Load a file from disk, keeping only its file name.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, MediaError> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await.map_err(|e| MediaError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload".into());
        Ok(Self::new(name, data))
    }
}

/// Accepts a file and a logical folder name, returns a public URL.
#[async_trait]
pub trait MediaUploader: Send + Sync {
    async fn upload(&self, file: MediaFile, folder: &str) -> Result<String, MediaError>;
}

// -- Key helpers --

/// Storage key for an upload: `<folder>/<id>-<sanitized name>`.
pub fn media_key(folder: &str, id: &str, filename: &str) -> String {
    let safe: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let folder = folder.trim_matches('/');
    format!("{folder}/{id}-{safe}")
}

pub fn guess_content_type(filename: &str) -> &'static str {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "mp4" => "video/mp4",
        _ => "application/octet-stream",
    }
}

// -- Configuration --

/// Configuration for the upload backend.
#[derive(Debug, Clone, Default)]
pub struct MediaConfig {
    /// API base URL (e.g. "http://localhost:8080/api"). Uploads go to
    /// `<endpoint>/media/upload`. When `None`, use the local filesystem.
    pub endpoint_url: Option<String>,
    /// Local filesystem base directory (used when no endpoint is configured).
    pub local_data_dir: Option<String>,
}

impl MediaConfig {
    pub fn is_remote(&self) -> bool {
        self.endpoint_url.is_some()
    }
}

// -- Factory --

pub fn create_uploader(
    config: &MediaConfig,
    token: Arc<dyn TokenSource>,
) -> Arc<dyn MediaUploader> {
    match &config.endpoint_url {
        Some(endpoint) => Arc::new(HttpUploader::new(endpoint, token)),
        None => Arc::new(LocalUploader::new(config)),
    }
}

#[cfg(test)]
mod tests {
    use fitshare_core::StaticToken;

    use super::*;

    #[test]
    fn media_key_sanitizes_file_name() {
        assert_eq!(
            media_key("workoutStories", "abc", "leg day.png"),
            "workoutStories/abc-leg_day.png"
        );
        assert_eq!(
            media_key("/mealPlans/", "id1", "../x.jpg"),
            "mealPlans/id1-.._x.jpg"
        );
    }

    #[test]
    fn content_type_from_extension() {
        assert_eq!(guess_content_type("a.PNG"), "image/png");
        assert_eq!(guess_content_type("a.jpeg"), "image/jpeg");
        assert_eq!(guess_content_type("clip.mp4"), "video/mp4");
        assert_eq!(guess_content_type("noext"), "application/octet-stream");
    }

    #[test]
    fn config_remote_requires_endpoint() {
        let config = MediaConfig {
            endpoint_url: Some("http://localhost:8080/api".into()),
            local_data_dir: None,
        };
        assert!(config.is_remote());
        assert!(!MediaConfig::default().is_remote());
    }

    #[test]
    fn create_uploader_local_fallback() {
        let tmp = tempfile::tempdir().unwrap();
        let config = MediaConfig {
            endpoint_url: None,
            local_data_dir: Some(tmp.path().to_string_lossy().to_string()),
        };
        let _uploader = create_uploader(&config, Arc::new(StaticToken::none()));
    }

    #[tokio::test]
    async fn media_file_from_path_keeps_file_name() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("photo.webp");
        std::fs::write(&path, b"img").unwrap();

        let file = MediaFile::from_path(&path).await.unwrap();
        assert_eq!(file.name, "photo.webp");
        assert_eq!(file.content_type, "image/webp");
        assert_eq!(file.data.as_ref(), b"img");
    }

    #[tokio::test]
    async fn media_file_from_missing_path_is_read_error() {
        let err = MediaFile::from_path("/definitely/not/here.png")
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::Read { .. }));
    }
}
