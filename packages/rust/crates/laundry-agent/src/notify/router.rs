//! Per-user routing: which channel and message each household member gets.

use std::sync::Arc;

use super::NotifyChannel;

/// Channel selector carried by a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelKind {
    /// Deliver to the shared Discord webhook.
    Discord,
    /// Deliver by text to one phone number.
    Sms {
        /// Destination phone number.
        destination: String,
    },
}

impl ChannelKind {
    fn name(&self) -> &'static str {
        match self {
            Self::Discord => "discord",
            Self::Sms { .. } => "sms",
        }
    }
}

/// One user's notification preference.
#[derive(Debug, Clone)]
pub struct Route {
    user: String,
    channel: ChannelKind,
    message: String,
}

impl Route {
    /// Build a route; the user name is matched case-insensitively.
    #[must_use]
    pub fn new(user: &str, channel: ChannelKind, message: &str) -> Self {
        Self {
            user: user.trim().to_lowercase(),
            channel,
            message: message.to_string(),
        }
    }

    /// Normalized user name this route matches.
    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Channel the route delivers on.
    #[must_use]
    pub fn channel(&self) -> &ChannelKind {
        &self.channel
    }

    /// Message the route delivers.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// What happened to one dispatch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The message went out.
    Delivered {
        /// Channel that carried the message.
        channel: &'static str,
    },
    /// The channel failed; the cycle still completes.
    Failed {
        /// Channel that rejected the message.
        channel: &'static str,
    },
    /// No route matched the user.
    Unroutable,
}

/// Routes notifications for the household.
pub struct Dispatcher {
    routes: Vec<Route>,
    discord: Option<Arc<dyn NotifyChannel>>,
    sms: Option<Arc<dyn NotifyChannel>>,
}

impl Dispatcher {
    /// Build a dispatcher, dropping routes whose channel is not configured.
    #[must_use]
    pub fn new(
        routes: Vec<Route>,
        discord: Option<Arc<dyn NotifyChannel>>,
        sms: Option<Arc<dyn NotifyChannel>>,
    ) -> Self {
        let routes = routes
            .into_iter()
            .filter(|route| {
                let configured = match route.channel() {
                    ChannelKind::Discord => discord.is_some(),
                    ChannelKind::Sms { .. } => sms.is_some(),
                };
                if !configured {
                    tracing::warn!(
                        event = "notify.route_dropped",
                        user = %route.user(),
                        channel = route.channel().name(),
                        "channel not configured; route disabled"
                    );
                }
                configured
            })
            .collect();

        Self {
            routes,
            discord,
            sms,
        }
    }

    /// Number of usable routes.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Find the route for a user, if any. Matching trims and lowercases.
    #[must_use]
    pub fn resolve(&self, user: &str) -> Option<&Route> {
        let normalized = user.trim().to_lowercase();
        if normalized.is_empty() {
            return None;
        }
        self.routes.iter().find(|route| route.user() == normalized)
    }

    /// Deliver the routed message for `user`, if a route exists.
    pub async fn dispatch(&self, user: &str) -> DispatchOutcome {
        let Some(route) = self.resolve(user) else {
            tracing::warn!(
                event = "notify.unroutable_user",
                user = %user,
                "no notification route; skipping delivery"
            );
            return DispatchOutcome::Unroutable;
        };

        let (channel, recipient) = match route.channel() {
            ChannelKind::Discord => (self.discord.as_deref(), ""),
            ChannelKind::Sms { destination } => (self.sms.as_deref(), destination.as_str()),
        };
        let Some(channel) = channel else {
            // Routes are filtered at construction, so this arm is unreachable
            // unless the route table was built by hand.
            tracing::warn!(
                event = "notify.channel_unconfigured",
                user = %route.user(),
                "route points at an unconfigured channel"
            );
            return DispatchOutcome::Unroutable;
        };

        match channel.deliver(route.message(), recipient).await {
            Ok(()) => {
                tracing::info!(
                    event = "notify.delivered",
                    user = %route.user(),
                    channel = channel.name(),
                );
                DispatchOutcome::Delivered {
                    channel: channel.name(),
                }
            }
            Err(err) => {
                tracing::warn!(
                    event = "notify.delivery_failed",
                    user = %route.user(),
                    channel = channel.name(),
                    error = %err,
                );
                DispatchOutcome::Failed {
                    channel: channel.name(),
                }
            }
        }
    }
}
