//! SMS delivery through the self-hosted gateway.

use anyhow::{Context, bail};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::json;

use super::NotifyChannel;

const BODY_PREVIEW_LIMIT: usize = 256;

/// Channel that sends texts through an SMS gateway with basic auth.
pub struct SmsGateway {
    client: Client,
    send_url: String,
    user: String,
    password: String,
}

impl SmsGateway {
    /// Build a channel for the gateway's send endpoint.
    #[must_use]
    pub fn new(send_url: &str, user: &str, password: &str) -> Self {
        Self {
            client: crate::http::build_client(),
            send_url: send_url.to_string(),
            user: user.to_string(),
            password: password.to_string(),
        }
    }
}

#[async_trait]
impl NotifyChannel for SmsGateway {
    fn name(&self) -> &'static str {
        "sms"
    }

    async fn deliver(&self, message: &str, recipient: &str) -> anyhow::Result<()> {
        let destination = recipient.trim();
        if destination.is_empty() {
            bail!("sms delivery requires a destination number");
        }

        let response = self
            .client
            .post(&self.send_url)
            .basic_auth(&self.user, Some(&self.password))
            .json(&json!({
                "message": message,
                "phoneNumbers": [destination],
            }))
            .send()
            .await
            .context("sms gateway request failed")?;

        // The gateway replies 200 for sent and 202 for queued; anything else
        // means the text did not go out.
        let status = response.status();
        if status != StatusCode::OK && status != StatusCode::ACCEPTED {
            let body = response.text().await.unwrap_or_default();
            let preview: String = body.chars().take(BODY_PREVIEW_LIMIT).collect();
            bail!("sms send failed: status={status} body={preview}");
        }

        Ok(())
    }
}
