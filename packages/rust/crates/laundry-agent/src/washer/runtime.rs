//! Washer agent entrypoint: wire the clients together and drive the loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::config::LaundryConfig;
use crate::notify::Dispatcher;
use crate::sensor::{CameraClient, VisionClient, WasherSensor};
use crate::status::{Appliance, StatusClient};

use super::{MonitorTiming, WasherMonitor};

/// Run the washer agent until interrupted.
pub async fn run_washer(config: &LaundryConfig) -> anyhow::Result<()> {
    let status_url = config
        .status_url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("LAUNDRY_STATUS_URL must be set"))?;
    let snapshot_url = config
        .camera_snapshot_url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("LAUNDRY_CAMERA_SNAPSHOT_URL must be set"))?;
    let vision_url = config
        .vision_url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("LAUNDRY_VISION_URL must be set"))?;

    let status = Arc::new(StatusClient::new(status_url, Appliance::Washer));
    let sensor = Arc::new(WasherSensor::new(
        CameraClient::new(snapshot_url),
        VisionClient::new(vision_url),
    ));
    let dispatcher = Arc::new(Dispatcher::new(
        config.washer_routes(),
        config.discord_channel(),
        config.sms_channel(),
    ));

    let timing = MonitorTiming {
        status_poll: Duration::from_secs(config.status_poll_secs),
        sensor_poll: Duration::from_secs(config.sensor_poll_secs),
        stopped_threshold: config.stopped_threshold,
    };

    tracing::info!(
        event = "washer.run.configured",
        status_poll_secs = config.status_poll_secs,
        sensor_poll_secs = config.sensor_poll_secs,
        stopped_threshold = config.stopped_threshold,
        routes = dispatcher.route_count(),
    );

    let monitor = WasherMonitor::new(status, sensor, dispatcher, timing, Instant::now());
    run_loop(monitor).await
}

async fn run_loop(mut monitor: WasherMonitor) -> anyhow::Result<()> {
    loop {
        monitor.tick(Instant::now()).await;

        tokio::select! {
            () = tokio::time::sleep_until(monitor.next_deadline()) => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!(event = "washer.run.stopped");
                return Ok(());
            }
        }
    }
}
