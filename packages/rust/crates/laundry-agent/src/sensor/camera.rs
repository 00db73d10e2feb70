//! Snapshot fetch from the laundry-room camera.

use reqwest::Client;
use tempfile::NamedTempFile;

use super::SensorError;

const BODY_PREVIEW_LIMIT: usize = 256;

/// Client for the camera's still-frame endpoint.
pub struct CameraClient {
    client: Client,
    snapshot_url: String,
}

impl CameraClient {
    /// Build a client for the snapshot endpoint.
    #[must_use]
    pub fn new(snapshot_url: &str) -> Self {
        Self {
            client: crate::http::build_client(),
            snapshot_url: snapshot_url.to_string(),
        }
    }

    /// Fetch one frame into a scratch file that is removed on drop.
    pub async fn fetch_snapshot(&self) -> Result<NamedTempFile, SensorError> {
        let response = self.client.get(&self.snapshot_url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let preview: String = body.chars().take(BODY_PREVIEW_LIMIT).collect();
            return Err(SensorError::Service {
                stage: "snapshot fetch",
                status,
                preview,
            });
        }

        let bytes = response.bytes().await?;
        let file = NamedTempFile::new()?;
        tokio::fs::write(file.path(), &bytes).await?;
        Ok(file)
    }
}
