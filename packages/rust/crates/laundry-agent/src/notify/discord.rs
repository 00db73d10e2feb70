//! Discord delivery through an incoming webhook.

use anyhow::{Context, bail};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use super::NotifyChannel;

const BODY_PREVIEW_LIMIT: usize = 256;

/// Channel that posts messages to a Discord webhook.
pub struct DiscordWebhook {
    client: Client,
    webhook_url: String,
}

impl DiscordWebhook {
    /// Build a channel for the given webhook URL.
    #[must_use]
    pub fn new(webhook_url: &str) -> Self {
        Self {
            client: crate::http::build_client(),
            webhook_url: webhook_url.to_string(),
        }
    }
}

#[async_trait]
impl NotifyChannel for DiscordWebhook {
    fn name(&self) -> &'static str {
        "discord"
    }

    // The webhook URL already addresses the room, so `recipient` is unused.
    async fn deliver(&self, message: &str, _recipient: &str) -> anyhow::Result<()> {
        if message.trim().is_empty() {
            bail!("refusing to send an empty discord message");
        }

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&json!({ "content": message }))
            .send()
            .await
            .context("discord webhook request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let preview: String = body.chars().take(BODY_PREVIEW_LIMIT).collect();
            bail!("discord webhook failed: status={status} body={preview}");
        }

        Ok(())
    }
}
