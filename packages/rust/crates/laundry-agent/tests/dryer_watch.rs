//! Dryer watcher tests: activation, quiet-window completion, and resets.
//! Steps are driven directly so no test waits on real tickers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use laundry_agent::{
    AgentMode, ChannelKind, Dispatcher, DryerState, DryerWatcher, NotifyChannel, Route,
    StateHistory, StatusError, StatusService,
};
use tokio::time::Instant;

struct FakeStatus {
    mode: Mutex<AgentMode>,
    user: Mutex<String>,
    fail_reads: AtomicBool,
    set_modes: Mutex<Vec<(AgentMode, Option<String>)>>,
}

impl FakeStatus {
    fn new(mode: AgentMode, user: &str) -> Arc<Self> {
        Arc::new(Self {
            mode: Mutex::new(mode),
            user: Mutex::new(user.to_string()),
            fail_reads: AtomicBool::new(false),
            set_modes: Mutex::new(Vec::new()),
        })
    }

    fn set_remote_mode(&self, mode: AgentMode) {
        *self.mode.lock().expect("mode lock") = mode;
    }

    fn recorded_set_modes(&self) -> Vec<(AgentMode, Option<String>)> {
        self.set_modes.lock().expect("set_modes lock").clone()
    }
}

#[async_trait]
impl StatusService for FakeStatus {
    async fn mode(&self) -> Result<AgentMode, StatusError> {
        if self.fail_reads.load(Ordering::Relaxed) {
            return Err(StatusError::Unavailable("connection refused".to_string()));
        }
        Ok(*self.mode.lock().expect("mode lock"))
    }

    async fn monitoring_user(&self) -> Result<String, StatusError> {
        if self.fail_reads.load(Ordering::Relaxed) {
            return Err(StatusError::Unavailable("connection refused".to_string()));
        }
        Ok(self.user.lock().expect("user lock").clone())
    }

    async fn set_mode(&self, mode: AgentMode, user: Option<&str>) -> Result<(), StatusError> {
        self.set_modes
            .lock()
            .expect("set_modes lock")
            .push((mode, user.map(ToString::to_string)));
        *self.mode.lock().expect("mode lock") = mode;
        Ok(())
    }
}

struct RecordingChannel {
    deliveries: Mutex<Vec<(String, String)>>,
}

impl RecordingChannel {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            deliveries: Mutex::new(Vec::new()),
        })
    }

    fn deliveries(&self) -> Vec<(String, String)> {
        self.deliveries.lock().expect("deliveries lock").clone()
    }
}

#[async_trait]
impl NotifyChannel for RecordingChannel {
    fn name(&self) -> &'static str {
        "sms"
    }

    async fn deliver(&self, message: &str, recipient: &str) -> anyhow::Result<()> {
        self.deliveries
            .lock()
            .expect("deliveries lock")
            .push((message.to_string(), recipient.to_string()));
        Ok(())
    }
}

fn secs(value: u64) -> Duration {
    Duration::from_secs(value)
}

fn watcher_with(
    status: Arc<FakeStatus>,
    sms: Arc<RecordingChannel>,
    quiet_window: Duration,
) -> DryerWatcher {
    watcher_with_history(status, sms, StateHistory::default(), quiet_window)
}

fn watcher_with_history(
    status: Arc<FakeStatus>,
    sms: Arc<RecordingChannel>,
    history: StateHistory,
    quiet_window: Duration,
) -> DryerWatcher {
    let routes = vec![Route::new(
        "bren",
        ChannelKind::Sms {
            destination: "+15550001111".to_string(),
        },
        "dryer done",
    )];
    let dispatcher = Arc::new(Dispatcher::new(
        routes,
        None,
        Some(sms as Arc<dyn NotifyChannel>),
    ));
    DryerWatcher::new(status, dispatcher, history, quiet_window)
}

#[tokio::test]
async fn activation_captures_the_requesting_user() {
    let status = FakeStatus::new(AgentMode::Monitor, "bren");
    let watcher_sms = RecordingChannel::new();
    let mut watcher = watcher_with(status, watcher_sms, secs(300));

    assert_eq!(watcher.monitoring_user(), None);
    watcher.poll_status().await;
    assert_eq!(watcher.monitoring_user(), Some("bren"));
}

#[tokio::test]
async fn quiet_window_completion_notifies_and_writes_idle_back() {
    let status = FakeStatus::new(AgentMode::Monitor, "bren");
    let sms = RecordingChannel::new();
    let history = StateHistory::default();
    let mut watcher = watcher_with_history(status.clone(), sms.clone(), history.clone(), secs(3));

    watcher.poll_status().await;
    history.record(DryerState::Stationary, Instant::now()).await;

    // First look starts the window; three more accumulate the three seconds.
    watcher.check_quiet(secs(1)).await;
    watcher.check_quiet(secs(1)).await;
    watcher.check_quiet(secs(1)).await;
    assert!(sms.deliveries().is_empty());
    watcher.check_quiet(secs(1)).await;

    assert_eq!(
        sms.deliveries(),
        vec![("dryer done".to_string(), "+15550001111".to_string())]
    );
    assert_eq!(status.recorded_set_modes(), vec![(AgentMode::Idle, None)]);
    assert_eq!(watcher.monitoring_user(), None);
}

#[tokio::test]
async fn vibration_restarts_the_quiet_window() {
    let status = FakeStatus::new(AgentMode::Monitor, "bren");
    let sms = RecordingChannel::new();
    let history = StateHistory::default();
    let mut watcher = watcher_with_history(status, sms.clone(), history.clone(), secs(3));

    watcher.poll_status().await;
    history.record(DryerState::Stationary, Instant::now()).await;
    watcher.check_quiet(secs(1)).await;
    watcher.check_quiet(secs(1)).await;
    watcher.check_quiet(secs(1)).await;

    history.record(DryerState::Vibrating, Instant::now()).await;
    watcher.check_quiet(secs(1)).await;

    // Back to quiet: the window starts over from zero.
    history.record(DryerState::Stationary, Instant::now()).await;
    watcher.check_quiet(secs(1)).await;
    watcher.check_quiet(secs(1)).await;
    watcher.check_quiet(secs(1)).await;

    assert!(sms.deliveries().is_empty());
    assert_eq!(watcher.monitoring_user(), Some("bren"));
}

#[tokio::test]
async fn idle_poll_deactivates_without_notifying() {
    let status = FakeStatus::new(AgentMode::Monitor, "bren");
    let sms = RecordingChannel::new();
    let mut watcher = watcher_with(status.clone(), sms.clone(), secs(300));

    watcher.poll_status().await;
    assert_eq!(watcher.monitoring_user(), Some("bren"));

    status.set_remote_mode(AgentMode::Idle);
    watcher.poll_status().await;

    assert_eq!(watcher.monitoring_user(), None);
    assert!(sms.deliveries().is_empty());
    assert!(status.recorded_set_modes().is_empty());
}

#[tokio::test]
async fn empty_user_completes_unroutable_without_delivery() {
    let status = FakeStatus::new(AgentMode::Monitor, "");
    let sms = RecordingChannel::new();
    let history = StateHistory::default();
    let mut watcher = watcher_with_history(status.clone(), sms.clone(), history.clone(), secs(1));

    watcher.poll_status().await;
    assert_eq!(watcher.monitoring_user(), Some(""));

    history.record(DryerState::Stationary, Instant::now()).await;
    watcher.check_quiet(secs(1)).await;
    watcher.check_quiet(secs(1)).await;

    assert!(sms.deliveries().is_empty());
    assert_eq!(status.recorded_set_modes(), vec![(AgentMode::Idle, None)]);
    assert_eq!(watcher.monitoring_user(), None);
}

#[tokio::test]
async fn status_failure_keeps_the_watch_running() {
    let status = FakeStatus::new(AgentMode::Monitor, "bren");
    let sms = RecordingChannel::new();
    let mut watcher = watcher_with(status.clone(), sms, secs(300));

    watcher.poll_status().await;
    assert_eq!(watcher.monitoring_user(), Some("bren"));

    status.fail_reads.store(true, Ordering::Relaxed);
    watcher.poll_status().await;

    assert_eq!(watcher.monitoring_user(), Some("bren"));
}

#[tokio::test]
async fn repeated_monitor_polls_keep_the_original_user() {
    let status = FakeStatus::new(AgentMode::Monitor, "bren");
    let sms = RecordingChannel::new();
    let mut watcher = watcher_with(status.clone(), sms, secs(300));

    watcher.poll_status().await;
    // The remote record changes mid-cycle; the captured user stays.
    *status.user.lock().expect("user lock") = "mason".to_string();
    watcher.poll_status().await;

    assert_eq!(watcher.monitoring_user(), Some("bren"));
}
