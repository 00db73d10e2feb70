//! Appliance sensing: the camera snapshot / panel vision pipeline that
//! decides whether the washer looks like it is still running.

use std::time::Instant;

use async_trait::async_trait;

mod camera;
mod vision;

pub use camera::CameraClient;
pub use vision::VisionClient;

/// What one look at the appliance concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplianceObservation {
    /// The appliance is mid-cycle.
    Running,
    /// The appliance shows no sign of activity.
    Stopped,
}

/// Errors raised inside the sensing pipeline.
#[derive(Debug, thiserror::Error)]
pub enum SensorError {
    /// Request never completed.
    #[error("sensor transport failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// Upstream answered with a non-success status.
    #[error("{stage} failed: status={status} body={preview}")]
    Service {
        /// Pipeline stage that failed.
        stage: &'static str,
        /// HTTP status the upstream returned.
        status: reqwest::StatusCode,
        /// Truncated response body for the log line.
        preview: String,
    },
    /// Local scratch file handling failed.
    #[error("sensor io failed: {0}")]
    Io(#[from] std::io::Error),
}

/// One periodic look at an appliance.
///
/// Sampling never fails: any pipeline error resolves to `Stopped`, so a dead
/// camera or vision service reads the same as a machine that finished.
#[async_trait]
pub trait ApplianceSensor: Send + Sync {
    /// Observe the appliance once.
    async fn sample(&self) -> ApplianceObservation;
}

/// Camera-plus-vision sensor for the washing machine panel.
pub struct WasherSensor {
    camera: CameraClient,
    vision: VisionClient,
}

impl WasherSensor {
    /// Build a sensor from its two upstream clients.
    #[must_use]
    pub fn new(camera: CameraClient, vision: VisionClient) -> Self {
        Self { camera, vision }
    }
}

#[async_trait]
impl ApplianceSensor for WasherSensor {
    async fn sample(&self) -> ApplianceObservation {
        let started = Instant::now();

        let snapshot = match self.camera.fetch_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                tracing::warn!(
                    event = "washer.sensor.snapshot_failed",
                    error = %err,
                    elapsed_ms = started.elapsed().as_millis(),
                    "treating appliance as stopped"
                );
                return ApplianceObservation::Stopped;
            }
        };

        let panel = match self.vision.crop_panel(snapshot.path()).await {
            Ok(Some(panel)) => panel,
            Ok(None) => {
                tracing::debug!(
                    event = "washer.sensor.panel_not_found",
                    elapsed_ms = started.elapsed().as_millis(),
                    "no panel in frame; treating appliance as stopped"
                );
                return ApplianceObservation::Stopped;
            }
            Err(err) => {
                tracing::warn!(
                    event = "washer.sensor.crop_failed",
                    error = %err,
                    elapsed_ms = started.elapsed().as_millis(),
                    "treating appliance as stopped"
                );
                return ApplianceObservation::Stopped;
            }
        };

        let label = match self.vision.classify_panel(panel.path()).await {
            Ok(label) => label,
            Err(err) => {
                tracing::warn!(
                    event = "washer.sensor.classify_failed",
                    error = %err,
                    elapsed_ms = started.elapsed().as_millis(),
                    "treating appliance as stopped"
                );
                return ApplianceObservation::Stopped;
            }
        };

        let observation = classify_label(&label);
        tracing::debug!(
            event = "washer.sensor.sampled",
            label = %label,
            observation = ?observation,
            elapsed_ms = started.elapsed().as_millis(),
        );
        observation
    }
}

/// Map a classifier label onto an observation. Labels outside the known set
/// read as stopped.
fn classify_label(label: &str) -> ApplianceObservation {
    match label.trim().to_ascii_lowercase().as_str() {
        "running" => ApplianceObservation::Running,
        "stopped" => ApplianceObservation::Stopped,
        other => {
            tracing::warn!(
                event = "washer.sensor.unknown_label",
                label = %other,
                "treating appliance as stopped"
            );
            ApplianceObservation::Stopped
        }
    }
}
