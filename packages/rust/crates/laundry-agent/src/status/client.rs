//! HTTP client for the home API agent status endpoints.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use super::{AgentMode, AgentStatus, Appliance, StatusError, StatusService};

const BODY_PREVIEW_LIMIT: usize = 256;

/// Client for one appliance's `getAgentStatus` / `setAgentStatus` pair.
pub struct StatusClient {
    client: Client,
    base_url: String,
    appliance: Appliance,
}

impl StatusClient {
    /// Build a client rooted at `base_url` for the given appliance.
    #[must_use]
    pub fn new(base_url: &str, appliance: Appliance) -> Self {
        Self {
            client: crate::http::build_client(),
            base_url: base_url.trim_end_matches('/').to_string(),
            appliance,
        }
    }

    fn endpoint(&self, operation: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            self.appliance.path_segment(),
            operation
        )
    }

    async fn fetch_status(&self) -> Result<AgentStatus, StatusError> {
        let response = self
            .client
            .get(self.endpoint("getAgentStatus"))
            .send()
            .await
            .map_err(|err| StatusError::Unavailable(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let preview: String = body.chars().take(BODY_PREVIEW_LIMIT).collect();
            return Err(StatusError::Unavailable(format!(
                "status={status} body={preview}"
            )));
        }

        response
            .json::<AgentStatus>()
            .await
            .map_err(|err| StatusError::Unavailable(format!("malformed status body: {err}")))
    }
}

#[async_trait]
impl StatusService for StatusClient {
    async fn mode(&self) -> Result<AgentMode, StatusError> {
        Ok(self.fetch_status().await?.status)
    }

    async fn monitoring_user(&self) -> Result<String, StatusError> {
        Ok(self.fetch_status().await?.user)
    }

    async fn set_mode(&self, mode: AgentMode, user: Option<&str>) -> Result<(), StatusError> {
        let user = user.map(str::trim).filter(|user| !user.is_empty());
        if mode == AgentMode::Monitor && user.is_none() {
            return Err(StatusError::InvalidArgument(
                "a user is required to start monitoring".to_string(),
            ));
        }

        let mut payload = json!({ "status": mode });
        if let Some(user) = user
            && mode == AgentMode::Monitor
        {
            payload["user"] = json!(user);
        }

        let response = self
            .client
            .post(self.endpoint("setAgentStatus"))
            .json(&payload)
            .send()
            .await
            .map_err(|err| StatusError::Unavailable(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let preview: String = body.chars().take(BODY_PREVIEW_LIMIT).collect();
            return Err(StatusError::Unavailable(format!(
                "status={status} body={preview}"
            )));
        }

        Ok(())
    }
}
