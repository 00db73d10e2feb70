//! Runtime configuration from `LAUNDRY_*` environment variables.

use std::sync::Arc;

use crate::notify::{ChannelKind, DiscordWebhook, NotifyChannel, Route, SmsGateway};

/// Default seconds between status polls.
pub const DEFAULT_STATUS_POLL_SECS: u64 = 5;
/// Default seconds between appliance samples while monitoring.
pub const DEFAULT_SENSOR_POLL_SECS: u64 = 60;
/// Default consecutive stopped samples that finish a washer cycle.
pub const DEFAULT_STOPPED_THRESHOLD: u32 = 5;
/// Default bind address for the dryer ingest server.
pub const DEFAULT_DRYER_BIND: &str = "0.0.0.0:8005";
/// Default seconds of quiet that finish a dryer cycle.
pub const DEFAULT_DRYER_QUIET_SECS: u64 = 300;

/// Completion message delivered to chat recipients for the washer.
pub const WASHER_DONE_CHAT_MESSAGE: &str = "✅ Washing machine has finished running";
/// Completion message delivered to SMS recipients for the washer.
pub const WASHER_DONE_SMS_MESSAGE: &str = "✅ Washing machine has finished running bbg";
/// Completion message delivered for the dryer.
pub const DRYER_DONE_MESSAGE: &str = "✅ Dryer has finished running";

/// SMS gateway credentials and endpoint.
#[derive(Debug, Clone)]
pub struct SmsConfig {
    /// Gateway send endpoint.
    pub send_url: String,
    /// Basic auth user.
    pub user: String,
    /// Basic auth password.
    pub password: String,
}

/// Resolved agent configuration.
#[derive(Debug, Clone)]
pub struct LaundryConfig {
    /// Base URL of the home API serving agent status.
    pub status_url: Option<String>,
    /// Camera still-frame endpoint.
    pub camera_snapshot_url: Option<String>,
    /// Base URL of the panel vision service.
    pub vision_url: Option<String>,
    /// Discord webhook for chat notifications.
    pub discord_webhook_url: Option<String>,
    /// SMS gateway settings, present only when fully configured.
    pub sms: Option<SmsConfig>,
    /// Destination number for SMS routes.
    pub sms_destination: Option<String>,
    /// Seconds between status polls.
    pub status_poll_secs: u64,
    /// Seconds between appliance samples while monitoring.
    pub sensor_poll_secs: u64,
    /// Consecutive stopped samples that finish a washer cycle.
    pub stopped_threshold: u32,
    /// Bind address for the dryer ingest server.
    pub dryer_bind: String,
    /// Seconds of quiet that finish a dryer cycle.
    pub dryer_quiet_secs: u64,
}

impl Default for LaundryConfig {
    fn default() -> Self {
        Self {
            status_url: None,
            camera_snapshot_url: None,
            vision_url: None,
            discord_webhook_url: None,
            sms: None,
            sms_destination: None,
            status_poll_secs: DEFAULT_STATUS_POLL_SECS,
            sensor_poll_secs: DEFAULT_SENSOR_POLL_SECS,
            stopped_threshold: DEFAULT_STOPPED_THRESHOLD,
            dryer_bind: DEFAULT_DRYER_BIND.to_string(),
            dryer_quiet_secs: DEFAULT_DRYER_QUIET_SECS,
        }
    }
}

impl LaundryConfig {
    /// Load configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary lookup.
    #[doc(hidden)]
    #[must_use]
    pub fn from_lookup_for_test<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::from_lookup(lookup)
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            status_url: resolve_string(&lookup, "LAUNDRY_STATUS_URL"),
            camera_snapshot_url: resolve_string(&lookup, "LAUNDRY_CAMERA_SNAPSHOT_URL"),
            vision_url: resolve_string(&lookup, "LAUNDRY_VISION_URL"),
            discord_webhook_url: resolve_string(&lookup, "LAUNDRY_DISCORD_WEBHOOK_URL"),
            sms: resolve_sms(&lookup),
            sms_destination: resolve_string(&lookup, "LAUNDRY_SMS_DESTINATION"),
            status_poll_secs: resolve_u64(
                &lookup,
                "LAUNDRY_STATUS_POLL_SECS",
                defaults.status_poll_secs,
            ),
            sensor_poll_secs: resolve_u64(
                &lookup,
                "LAUNDRY_SENSOR_POLL_SECS",
                defaults.sensor_poll_secs,
            ),
            stopped_threshold: resolve_u32(
                &lookup,
                "LAUNDRY_STOPPED_THRESHOLD",
                defaults.stopped_threshold,
            ),
            dryer_bind: resolve_string(&lookup, "LAUNDRY_DRYER_BIND")
                .unwrap_or(defaults.dryer_bind),
            dryer_quiet_secs: resolve_u64(
                &lookup,
                "LAUNDRY_DRYER_QUIET_SECS",
                defaults.dryer_quiet_secs,
            ),
        }
    }

    /// Notification routes for washer completions.
    #[must_use]
    pub fn washer_routes(&self) -> Vec<Route> {
        self.household_routes(WASHER_DONE_CHAT_MESSAGE, WASHER_DONE_SMS_MESSAGE)
    }

    /// Notification routes for dryer completions.
    #[must_use]
    pub fn dryer_routes(&self) -> Vec<Route> {
        self.household_routes(DRYER_DONE_MESSAGE, DRYER_DONE_MESSAGE)
    }

    fn household_routes(&self, chat_message: &str, sms_message: &str) -> Vec<Route> {
        let mut routes = vec![Route::new("mason", ChannelKind::Discord, chat_message)];
        if let Some(destination) = &self.sms_destination {
            routes.push(Route::new(
                "bren",
                ChannelKind::Sms {
                    destination: destination.clone(),
                },
                sms_message,
            ));
        } else {
            tracing::warn!(
                event = "config.sms_destination_missing",
                "LAUNDRY_SMS_DESTINATION not set; sms route disabled"
            );
        }
        routes
    }

    /// Discord channel, when a webhook is configured.
    #[must_use]
    pub fn discord_channel(&self) -> Option<Arc<dyn NotifyChannel>> {
        self.discord_webhook_url
            .as_deref()
            .map(|url| Arc::new(DiscordWebhook::new(url)) as Arc<dyn NotifyChannel>)
    }

    /// SMS channel, when the gateway is fully configured.
    #[must_use]
    pub fn sms_channel(&self) -> Option<Arc<dyn NotifyChannel>> {
        self.sms.as_ref().map(|sms| {
            Arc::new(SmsGateway::new(&sms.send_url, &sms.user, &sms.password))
                as Arc<dyn NotifyChannel>
        })
    }
}

fn resolve_string<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn resolve_sms<F>(lookup: &F) -> Option<SmsConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let send_url = resolve_string(lookup, "LAUNDRY_SMS_URL");
    let user = resolve_string(lookup, "LAUNDRY_SMS_USER");
    let password = resolve_string(lookup, "LAUNDRY_SMS_PASSWORD");

    match (send_url, user, password) {
        (Some(send_url), Some(user), Some(password)) => Some(SmsConfig {
            send_url,
            user,
            password,
        }),
        (None, None, None) => None,
        _ => {
            tracing::warn!(
                event = "config.sms_incomplete",
                "sms gateway needs LAUNDRY_SMS_URL, LAUNDRY_SMS_USER, and LAUNDRY_SMS_PASSWORD; sms disabled"
            );
            None
        }
    }
}

fn resolve_u64<F>(lookup: &F, name: &str, default: u64) -> u64
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(value) if value > 0 => value,
            _ => {
                tracing::warn!(
                    env = name,
                    value = %raw,
                    default,
                    "invalid config env value; using default"
                );
                default
            }
        },
        None => default,
    }
}

fn resolve_u32<F>(lookup: &F, name: &str, default: u32) -> u32
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(raw) => match raw.trim().parse::<u32>() {
            Ok(value) if value > 0 => value,
            _ => {
                tracing::warn!(
                    env = name,
                    value = %raw,
                    default,
                    "invalid config env value; using default"
                );
                default
            }
        },
        None => default,
    }
}
