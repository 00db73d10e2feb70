//! Notification delivery: per-user routing onto chat and SMS channels.

use async_trait::async_trait;

mod discord;
mod router;
mod sms;

pub use discord::DiscordWebhook;
pub use router::{ChannelKind, DispatchOutcome, Dispatcher, Route};
pub use sms::SmsGateway;

/// One way of getting a message to a person.
#[async_trait]
pub trait NotifyChannel: Send + Sync {
    /// Short channel name for log lines.
    fn name(&self) -> &'static str;

    /// Deliver `message` to `recipient`.
    ///
    /// Channels that address a fixed destination (a chat webhook) ignore
    /// `recipient`; point-to-point channels require it.
    async fn deliver(&self, message: &str, recipient: &str) -> anyhow::Result<()>;
}
