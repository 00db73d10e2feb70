//! Vision service calls: panel crop and panel classification.

use std::path::Path;

use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tempfile::NamedTempFile;

use super::SensorError;

const BODY_PREVIEW_LIMIT: usize = 256;

#[derive(Debug, Deserialize)]
struct ClassifyResponse {
    label: String,
}

/// Client for the panel vision service.
pub struct VisionClient {
    client: Client,
    base_url: String,
}

impl VisionClient {
    /// Build a client rooted at the vision service base URL.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            client: crate::http::build_client(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Crop the appliance panel out of a full frame.
    ///
    /// Returns `Ok(None)` when the service reports no panel in the frame.
    pub async fn crop_panel(&self, frame: &Path) -> Result<Option<NamedTempFile>, SensorError> {
        let form = image_form(frame).await?;
        let response = self
            .client
            .post(format!("{}/panel/crop", self.base_url))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let preview: String = body.chars().take(BODY_PREVIEW_LIMIT).collect();
            return Err(SensorError::Service {
                stage: "panel crop",
                status,
                preview,
            });
        }

        let bytes = response.bytes().await?;
        let file = NamedTempFile::new()?;
        tokio::fs::write(file.path(), &bytes).await?;
        Ok(Some(file))
    }

    /// Classify a cropped panel image into an activity label.
    pub async fn classify_panel(&self, panel: &Path) -> Result<String, SensorError> {
        let form = image_form(panel).await?;
        let response = self
            .client
            .post(format!("{}/panel/classify", self.base_url))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let preview: String = body.chars().take(BODY_PREVIEW_LIMIT).collect();
            return Err(SensorError::Service {
                stage: "panel classify",
                status,
                preview,
            });
        }

        let decoded = response.json::<ClassifyResponse>().await?;
        Ok(decoded.label)
    }
}

async fn image_form(path: &Path) -> Result<Form, SensorError> {
    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("image")
        .to_string();
    let part = Part::bytes(bytes).file_name(file_name);
    Ok(Form::new().part("image", part))
}
