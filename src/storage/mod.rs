//! Blob upload capability for delivering the analysis as a file.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::info;

/// Stores a named blob and returns a publicly reachable URL for it.
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn put(&self, name: &str, content: Vec<u8>) -> Result<String>;
}

/// File store backed by an HTTP object-storage endpoint: the blob is PUT
/// to `{upload_url}/{name}` and served from `{public_url}/{name}`.
pub struct HttpFileStore {
    client: reqwest::Client,
    upload_url: String,
    public_url: String,
}

impl HttpFileStore {
    /// # Arguments
    /// * `upload_url` - base URL uploads are PUT to
    /// * `public_url` - base URL the stored files are served from; pass
    ///   the upload URL again when they are the same
    pub fn new(upload_url: String, public_url: String, timeout_sec: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            upload_url: upload_url.trim_end_matches('/').to_string(),
            public_url: public_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl FileStore for HttpFileStore {
    async fn put(&self, name: &str, content: Vec<u8>) -> Result<String> {
        let url = format!("{}/{}", self.upload_url, urlencoding::encode(name));
        let size = content.len();

        let response = self
            .client
            .put(&url)
            .body(content)
            .send()
            .await
            .with_context(|| format!("Failed to upload {}", name))?;

        if !response.status().is_success() {
            anyhow::bail!("Upload of {} failed with status {}", name, response.status());
        }

        info!("Uploaded {} ({} bytes)", name, size);
        Ok(format!("{}/{}", self.public_url, urlencoding::encode(name)))
    }
}
