//! Configuration resolution tests over an in-memory environment.

use std::collections::HashMap;

use laundry_agent::{
    ChannelKind, DRYER_DONE_MESSAGE, LaundryConfig, WASHER_DONE_CHAT_MESSAGE,
    WASHER_DONE_SMS_MESSAGE,
};

fn config_from(pairs: &[(&str, &str)]) -> LaundryConfig {
    let env: HashMap<String, String> = pairs
        .iter()
        .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
        .collect();
    LaundryConfig::from_lookup_for_test(move |name| env.get(name).cloned())
}

#[test]
fn defaults_apply_without_environment() {
    let config = config_from(&[]);

    assert_eq!(config.status_url, None);
    assert_eq!(config.camera_snapshot_url, None);
    assert_eq!(config.vision_url, None);
    assert_eq!(config.discord_webhook_url, None);
    assert!(config.sms.is_none());
    assert_eq!(config.sms_destination, None);
    assert_eq!(config.status_poll_secs, 5);
    assert_eq!(config.sensor_poll_secs, 60);
    assert_eq!(config.stopped_threshold, 5);
    assert_eq!(config.dryer_bind, "0.0.0.0:8005");
    assert_eq!(config.dryer_quiet_secs, 300);
}

#[test]
fn environment_values_override_defaults() {
    let config = config_from(&[
        ("LAUNDRY_STATUS_URL", "http://api.local"),
        ("LAUNDRY_CAMERA_SNAPSHOT_URL", "http://cam.local/snapshot"),
        ("LAUNDRY_VISION_URL", "http://vision.local"),
        ("LAUNDRY_DISCORD_WEBHOOK_URL", "http://discord.local/hook"),
        ("LAUNDRY_STATUS_POLL_SECS", "2"),
        ("LAUNDRY_SENSOR_POLL_SECS", "30"),
        ("LAUNDRY_STOPPED_THRESHOLD", "3"),
        ("LAUNDRY_DRYER_BIND", "127.0.0.1:9100"),
        ("LAUNDRY_DRYER_QUIET_SECS", "120"),
    ]);

    assert_eq!(config.status_url.as_deref(), Some("http://api.local"));
    assert_eq!(
        config.camera_snapshot_url.as_deref(),
        Some("http://cam.local/snapshot")
    );
    assert_eq!(config.vision_url.as_deref(), Some("http://vision.local"));
    assert_eq!(
        config.discord_webhook_url.as_deref(),
        Some("http://discord.local/hook")
    );
    assert_eq!(config.status_poll_secs, 2);
    assert_eq!(config.sensor_poll_secs, 30);
    assert_eq!(config.stopped_threshold, 3);
    assert_eq!(config.dryer_bind, "127.0.0.1:9100");
    assert_eq!(config.dryer_quiet_secs, 120);
}

#[test]
fn invalid_numbers_fall_back_to_defaults() {
    let config = config_from(&[
        ("LAUNDRY_STATUS_POLL_SECS", "abc"),
        ("LAUNDRY_SENSOR_POLL_SECS", "0"),
        ("LAUNDRY_STOPPED_THRESHOLD", "-3"),
        ("LAUNDRY_DRYER_QUIET_SECS", ""),
    ]);

    assert_eq!(config.status_poll_secs, 5);
    assert_eq!(config.sensor_poll_secs, 60);
    assert_eq!(config.stopped_threshold, 5);
    assert_eq!(config.dryer_quiet_secs, 300);
}

#[test]
fn blank_values_read_as_unset() {
    let config = config_from(&[
        ("LAUNDRY_STATUS_URL", "   "),
        ("LAUNDRY_DISCORD_WEBHOOK_URL", ""),
    ]);

    assert_eq!(config.status_url, None);
    assert_eq!(config.discord_webhook_url, None);
}

#[test]
fn partial_sms_settings_disable_the_gateway() {
    let config = config_from(&[
        ("LAUNDRY_SMS_URL", "http://sms.local/send"),
        ("LAUNDRY_SMS_USER", "gateway"),
    ]);

    assert!(config.sms.is_none());
    assert!(config.sms_channel().is_none());
}

#[test]
fn complete_sms_settings_enable_the_gateway() {
    let config = config_from(&[
        ("LAUNDRY_SMS_URL", "http://sms.local/send"),
        ("LAUNDRY_SMS_USER", "gateway"),
        ("LAUNDRY_SMS_PASSWORD", "secret"),
    ]);

    let sms = config.sms.as_ref().expect("sms config");
    assert_eq!(sms.send_url, "http://sms.local/send");
    assert_eq!(sms.user, "gateway");
    assert_eq!(sms.password, "secret");
    assert!(config.sms_channel().is_some());
}

#[test]
fn washer_routes_cover_the_household() {
    let config = config_from(&[("LAUNDRY_SMS_DESTINATION", "+15550001111")]);
    let routes = config.washer_routes();

    assert_eq!(routes.len(), 2);
    assert_eq!(routes[0].user(), "mason");
    assert_eq!(routes[0].channel(), &ChannelKind::Discord);
    assert_eq!(routes[0].message(), WASHER_DONE_CHAT_MESSAGE);
    assert_eq!(routes[1].user(), "bren");
    assert_eq!(
        routes[1].channel(),
        &ChannelKind::Sms {
            destination: "+15550001111".to_string()
        }
    );
    assert_eq!(routes[1].message(), WASHER_DONE_SMS_MESSAGE);
}

#[test]
fn dryer_routes_share_one_message() {
    let config = config_from(&[("LAUNDRY_SMS_DESTINATION", "+15550001111")]);
    let routes = config.dryer_routes();

    assert_eq!(routes.len(), 2);
    assert_eq!(routes[0].message(), DRYER_DONE_MESSAGE);
    assert_eq!(routes[1].message(), DRYER_DONE_MESSAGE);
}

#[test]
fn missing_sms_destination_drops_the_text_route() {
    let config = config_from(&[]);
    let routes = config.washer_routes();

    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].user(), "mason");
}
