//! Dryer agent runtime: status polling, quiet-window checks, and the
//! ingest server, all driven from one task.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::config::LaundryConfig;
use crate::notify::Dispatcher;
use crate::status::{AgentMode, Appliance, StatusClient, StatusService};

use super::{QuietWindow, StateHistory, ingest};

const QUIET_CHECK_PERIOD: Duration = Duration::from_secs(1);
const STATE_RETENTION: Duration = Duration::from_secs(300);
const PRUNE_PERIOD: Duration = Duration::from_secs(600);

/// Watches the dryer's vibration history while monitoring is requested.
pub struct DryerWatcher {
    status: Arc<dyn StatusService>,
    dispatcher: Arc<Dispatcher>,
    history: StateHistory,
    quiet: QuietWindow,
    monitoring_user: Option<String>,
}

impl DryerWatcher {
    /// Build a watcher over a shared reading history.
    #[must_use]
    pub fn new(
        status: Arc<dyn StatusService>,
        dispatcher: Arc<Dispatcher>,
        history: StateHistory,
        quiet_window: Duration,
    ) -> Self {
        Self {
            status,
            dispatcher,
            history,
            quiet: QuietWindow::new(quiet_window),
            monitoring_user: None,
        }
    }

    /// User whose request is being watched, if any.
    #[must_use]
    pub fn monitoring_user(&self) -> Option<&str> {
        self.monitoring_user.as_deref()
    }

    /// Re-read the remote mode and start or stop the watch accordingly.
    pub async fn poll_status(&mut self) {
        match self.status.mode().await {
            Ok(AgentMode::Monitor) => {
                if self.monitoring_user.is_none() {
                    self.activate().await;
                }
            }
            Ok(AgentMode::Idle) => {
                if self.monitoring_user.take().is_some() {
                    tracing::info!(event = "dryer.watch.deactivated");
                    self.quiet.reset();
                }
            }
            Err(err) => {
                tracing::warn!(
                    event = "dryer.status.refresh_failed",
                    error = %err,
                    "keeping current watch state"
                );
            }
        }
    }

    /// Capture the requesting user at activation. The user named when the
    /// watch starts is the user who gets notified, even if the remote
    /// record changes mid-cycle.
    async fn activate(&mut self) {
        let user = match self.status.monitoring_user().await {
            Ok(user) => user,
            Err(err) => {
                tracing::warn!(
                    event = "dryer.watch.user_lookup_failed",
                    error = %err,
                    "activating without a recipient"
                );
                String::new()
            }
        };
        if user.trim().is_empty() {
            tracing::warn!(
                event = "dryer.watch.no_user",
                "monitoring requested without a user; completion will be unroutable"
            );
        }
        tracing::info!(event = "dryer.watch.activated", user = %user);
        self.quiet.reset();
        self.monitoring_user = Some(user);
    }

    /// Fold the latest reading into the quiet window; finish on completion.
    pub async fn check_quiet(&mut self, elapsed: Duration) {
        let Some(user) = self.monitoring_user.clone() else {
            return;
        };

        let latest = self.history.latest().await.map(|entry| entry.state);
        if self.quiet.observe(latest, elapsed) {
            self.finish(&user).await;
        }
    }

    async fn finish(&mut self, user: &str) {
        tracing::info!(
            event = "dryer.finished",
            user = %user,
            quiet_secs = self.quiet.accumulated().as_secs(),
        );

        if let Err(err) = self.status.set_mode(AgentMode::Idle, None).await {
            tracing::warn!(
                event = "dryer.idle_writeback_failed",
                error = %err,
                "remote mode may still read monitor"
            );
        }

        self.dispatcher.dispatch(user).await;
        self.quiet.reset();
        self.monitoring_user = None;
    }

    /// Drop readings older than the retention span.
    pub async fn prune_history(&self, now: Instant) {
        let Some(cutoff) = now.checked_sub(STATE_RETENTION) else {
            return;
        };
        let kept = self.history.prune_older_than(cutoff).await;
        tracing::debug!(event = "dryer.ingest.history_pruned", kept);
    }

    /// Drive the watcher forever on its three cadences.
    pub async fn run(mut self, poll_period: Duration) {
        let mut status_ticks = tokio::time::interval(poll_period);
        status_ticks.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut quiet_ticks = tokio::time::interval(QUIET_CHECK_PERIOD);
        quiet_ticks.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut prune_ticks = tokio::time::interval(PRUNE_PERIOD);
        prune_ticks.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = status_ticks.tick() => self.poll_status().await,
                _ = quiet_ticks.tick() => self.check_quiet(QUIET_CHECK_PERIOD).await,
                now = prune_ticks.tick() => self.prune_history(now).await,
            }
        }
    }
}

/// Run the dryer agent until interrupted.
pub async fn run_dryer(
    config: &LaundryConfig,
    bind_override: Option<String>,
) -> anyhow::Result<()> {
    let status_url = config
        .status_url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("LAUNDRY_STATUS_URL must be set"))?;
    let bind = bind_override.unwrap_or_else(|| config.dryer_bind.clone());

    let status = Arc::new(StatusClient::new(status_url, Appliance::Dryer));
    let dispatcher = Arc::new(Dispatcher::new(
        config.dryer_routes(),
        config.discord_channel(),
        config.sms_channel(),
    ));

    let history = StateHistory::default();
    let watcher = DryerWatcher::new(
        status,
        dispatcher.clone(),
        history.clone(),
        Duration::from_secs(config.dryer_quiet_secs),
    );

    let app = ingest::router(history);
    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!(
        event = "dryer.run.configured",
        bind = %bind,
        status_poll_secs = config.status_poll_secs,
        quiet_secs = config.dryer_quiet_secs,
        routes = dispatcher.route_count(),
    );

    tokio::select! {
        result = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()) => {
            result?;
        }
        () = watcher.run(Duration::from_secs(config.status_poll_secs)) => {}
    }

    tracing::info!(event = "dryer.run.stopped");
    Ok(())
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut terminate) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = terminate.recv() => {}
            }
        }
        Err(err) => {
            tracing::warn!(
                event = "dryer.run.signal_setup_failed",
                error = %err,
                "falling back to ctrl-c only"
            );
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
