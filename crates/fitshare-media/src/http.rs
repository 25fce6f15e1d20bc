use std::sync::Arc;

use async_trait::async_trait;
use fitshare_core::TokenSource;
use reqwest::multipart::{Form, Part};
use reqwest::Client;

use crate::{MediaError, MediaFile, MediaUploader};

/// Uploads through the backend's `/media/upload` endpoint.
pub struct HttpUploader {
    endpoint: String,
    client: Client,
    token: Arc<dyn TokenSource>,
}

impl HttpUploader {
    pub fn new(endpoint: &str, token: Arc<dyn TokenSource>) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            client: Client::new(),
            token,
        }
    }
}

#[async_trait]
impl MediaUploader for HttpUploader {
    async fn upload(&self, file: MediaFile, folder: &str) -> Result<String, MediaError> {
        let size = file.data.len();
        let part = Part::bytes(file.data.to_vec())
            .file_name(file.name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| MediaError::Internal(format!("content type: {e}")))?;
        let form = Form::new()
            .part("file", part)
            .text("folder", folder.to_string());

        let mut builder = self
            .client
            .post(format!("{}/media/upload", self.endpoint))
            .multipart(form);
        if let Some(token) = self.token.token() {
            builder = builder.bearer_auth(token);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| MediaError::Transport(e.to_string()))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| MediaError::Transport(format!("read body: {e}")))?;

        if !status.is_success() {
            return Err(MediaError::Rejected(format!("{status}: {body}")));
        }
        let url = body.trim().trim_matches('"').to_string();
        if url.is_empty() {
            return Err(MediaError::Rejected("empty url in response".into()));
        }
        tracing::debug!(folder, bytes = size, "uploaded media");
        Ok(url)
    }
}
