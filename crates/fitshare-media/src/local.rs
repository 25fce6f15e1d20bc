use std::path::PathBuf;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{media_key, MediaConfig, MediaError, MediaFile, MediaUploader};

/// Writes uploads under a local directory and hands back `file://` URLs.
pub struct LocalUploader {
    base_dir: PathBuf,
}

impl LocalUploader {
    pub fn new(config: &MediaConfig) -> Self {
        let base_dir = config
            .local_data_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| fitshare_core::auth::data_dir().join("media"));
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    fn resolve(&self, key: &str) -> PathBuf {
        self.base_dir.join(key)
    }
}

#[async_trait]
impl MediaUploader for LocalUploader {
    async fn upload(&self, file: MediaFile, folder: &str) -> Result<String, MediaError> {
        let key = media_key(folder, &Uuid::new_v4().to_string(), &file.name);
        let path = self.resolve(&key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| MediaError::Internal(format!("mkdir: {e}")))?;
        }
        tokio::fs::write(&path, &file.data)
            .await
            .map_err(|e| MediaError::Internal(format!("write {}: {e}", path.display())))?;

        let absolute = tokio::fs::canonicalize(&path).await.unwrap_or(path);
        tracing::debug!(key = %key, bytes = file.data.len(), "stored upload locally");
        Ok(format!("file://{}", absolute.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_uploader(dir: &std::path::Path) -> LocalUploader {
        let config = MediaConfig {
            endpoint_url: None,
            local_data_dir: Some(dir.to_string_lossy().to_string()),
        };
        LocalUploader::new(&config)
    }

    #[tokio::test]
    async fn upload_writes_file_under_folder() {
        let tmp = tempfile::tempdir().unwrap();
        let uploader = test_uploader(tmp.path());

        let url = uploader
            .upload(MediaFile::new("run.png", "pixels"), "workoutStories")
            .await
            .unwrap();
        assert!(url.starts_with("file://"));
        assert!(url.ends_with("-run.png"));

        let path = url.trim_start_matches("file://");
        assert_eq!(std::fs::read(path).unwrap(), b"pixels");
        assert!(path.contains("workoutStories"));
    }

    #[tokio::test]
    async fn same_name_uploads_do_not_collide() {
        let tmp = tempfile::tempdir().unwrap();
        let uploader = test_uploader(tmp.path());

        let a = uploader
            .upload(MediaFile::new("x.png", "a"), "mealPlans")
            .await
            .unwrap();
        let b = uploader
            .upload(MediaFile::new("x.png", "b"), "mealPlans")
            .await
            .unwrap();
        assert_ne!(a, b);
        assert_eq!(std::fs::read(a.trim_start_matches("file://")).unwrap(), b"a");
        assert_eq!(std::fs::read(b.trim_start_matches("file://")).unwrap(), b"b");
    }

    #[test]
    fn default_base_dir_is_under_data_dir() {
        let uploader = LocalUploader::new(&MediaConfig::default());
        assert!(uploader.base_dir().ends_with("fitshare/media"));
    }
}
