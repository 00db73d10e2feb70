//! Core washer state machine: a fast status cadence that always runs and a
//! slow sensor cadence that only runs while someone is monitoring.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::notify::Dispatcher;
use crate::sensor::{ApplianceObservation, ApplianceSensor};
use crate::status::{AgentMode, StatusService};

/// Cadences and debounce threshold for the washer loop.
#[derive(Debug, Clone, Copy)]
pub struct MonitorTiming {
    /// How often the remote mode is re-read.
    pub status_poll: Duration,
    /// How often the appliance is sampled while monitoring.
    pub sensor_poll: Duration,
    /// Consecutive stopped samples required to call the cycle finished.
    pub stopped_threshold: u32,
}

impl Default for MonitorTiming {
    fn default() -> Self {
        Self {
            status_poll: Duration::from_secs(5),
            sensor_poll: Duration::from_secs(60),
            stopped_threshold: 5,
        }
    }
}

/// Debounced stop detector for the washing machine.
///
/// The monitor owns two deadlines. The status deadline fires on every tick
/// and keeps the cached mode fresh; the sensor deadline only matters while
/// the cached mode is monitor. A cycle is finished once `stopped_threshold`
/// consecutive samples read stopped.
pub struct WasherMonitor {
    status: Arc<dyn StatusService>,
    sensor: Arc<dyn ApplianceSensor>,
    dispatcher: Arc<Dispatcher>,
    timing: MonitorTiming,
    mode: AgentMode,
    stopped_streak: u32,
    next_status_poll: Instant,
    next_sensor_poll: Instant,
}

impl WasherMonitor {
    /// Build a monitor that polls immediately and samples one sensor period
    /// after monitoring starts.
    #[must_use]
    pub fn new(
        status: Arc<dyn StatusService>,
        sensor: Arc<dyn ApplianceSensor>,
        dispatcher: Arc<Dispatcher>,
        timing: MonitorTiming,
        now: Instant,
    ) -> Self {
        let mut timing = timing;
        timing.stopped_threshold = timing.stopped_threshold.max(1);
        Self {
            status,
            sensor,
            dispatcher,
            timing,
            mode: AgentMode::Idle,
            stopped_streak: 0,
            next_status_poll: now,
            next_sensor_poll: now + timing.sensor_poll,
        }
    }

    /// Cached agent mode.
    #[must_use]
    pub fn mode(&self) -> AgentMode {
        self.mode
    }

    /// Consecutive stopped samples so far.
    #[must_use]
    pub fn stopped_streak(&self) -> u32 {
        self.stopped_streak
    }

    /// Earliest instant at which `tick` has work to do.
    ///
    /// The sensor deadline only participates while monitoring, so an idle
    /// agent sleeps the full status cadence between ticks.
    #[must_use]
    pub fn next_deadline(&self) -> Instant {
        if self.mode == AgentMode::Monitor {
            self.next_status_poll.min(self.next_sensor_poll)
        } else {
            self.next_status_poll
        }
    }

    /// Run every piece of work due at `now`.
    ///
    /// The mode refresh always runs before the sensor sample, so a remote
    /// flip to idle suppresses sampling within the same tick.
    pub async fn tick(&mut self, now: Instant) {
        if now >= self.next_status_poll {
            // Rearm from the acting instant, not the missed deadline, so a
            // stalled process resumes cleanly instead of bursting.
            self.next_status_poll = now + self.timing.status_poll;
            self.refresh_mode(now).await;
        }

        if self.mode == AgentMode::Monitor && now >= self.next_sensor_poll {
            self.next_sensor_poll = now + self.timing.sensor_poll;
            let observation = self.sensor.sample().await;
            self.apply_observation(observation).await;
        }
    }

    async fn refresh_mode(&mut self, now: Instant) {
        match self.status.mode().await {
            Ok(mode) => {
                if self.mode == AgentMode::Idle && mode == AgentMode::Monitor {
                    // A fresh request should be answered right away, not one
                    // sensor period from now.
                    self.next_sensor_poll = now;
                    tracing::info!(event = "washer.monitor.activated");
                } else if self.mode == AgentMode::Monitor && mode == AgentMode::Idle {
                    tracing::info!(event = "washer.monitor.deactivated");
                }
                self.mode = mode;
            }
            Err(err) => {
                tracing::warn!(
                    event = "washer.status.refresh_failed",
                    error = %err,
                    "keeping cached mode"
                );
            }
        }
    }

    async fn apply_observation(&mut self, observation: ApplianceObservation) {
        match observation {
            ApplianceObservation::Running => {
                if self.stopped_streak > 0 {
                    tracing::debug!(
                        event = "washer.streak.reset",
                        previous = self.stopped_streak,
                    );
                }
                self.stopped_streak = 0;
            }
            ApplianceObservation::Stopped => {
                self.stopped_streak += 1;
                tracing::debug!(
                    event = "washer.streak.advanced",
                    streak = self.stopped_streak,
                    threshold = self.timing.stopped_threshold,
                );
            }
        }

        if self.stopped_streak >= self.timing.stopped_threshold {
            self.finish_cycle().await;
        }
    }

    /// Complete one monitored cycle: read the requesting user, write the
    /// remote mode back to idle, then notify.
    async fn finish_cycle(&mut self) {
        let user = match self.status.monitoring_user().await {
            Ok(user) => user,
            Err(err) => {
                tracing::warn!(
                    event = "washer.user_lookup_failed",
                    error = %err,
                    "finishing cycle without a recipient"
                );
                String::new()
            }
        };
        tracing::info!(
            event = "washer.finished",
            user = %user,
            streak = self.stopped_streak,
        );

        if let Err(err) = self.status.set_mode(AgentMode::Idle, None).await {
            tracing::warn!(
                event = "washer.idle_writeback_failed",
                error = %err,
                "remote mode may still read monitor"
            );
        }

        self.stopped_streak = 0;
        self.dispatcher.dispatch(&user).await;
        // Adopt idle locally without waiting for the next status poll. A
        // concurrent remote write is picked up within one fast cadence.
        self.mode = AgentMode::Idle;
    }
}
