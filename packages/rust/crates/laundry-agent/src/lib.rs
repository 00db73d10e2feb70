//! Laundry agents: camera-based washer stop detection and vibration-based
//! dryer quiet-window watching, both gated on a shared remote mode switch.
//!
//! - **Washer**: poll the mode fast, sample the panel slow, debounce stops.
//! - **Dryer**: ingest sensor readings over HTTP, wait out a quiet window.

#![allow(missing_docs)]

mod config;
mod dryer;
mod http;
mod notify;
mod sensor;
mod status;
mod washer;

pub use config::{
    DEFAULT_DRYER_BIND, DEFAULT_DRYER_QUIET_SECS, DEFAULT_SENSOR_POLL_SECS,
    DEFAULT_STATUS_POLL_SECS, DEFAULT_STOPPED_THRESHOLD, DRYER_DONE_MESSAGE, LaundryConfig,
    SmsConfig, WASHER_DONE_CHAT_MESSAGE, WASHER_DONE_SMS_MESSAGE,
};
pub use dryer::{
    DryerState, DryerWatcher, QuietWindow, StateHistory, StateSubmission, SubmitStateRequest,
    router as dryer_router, run_dryer, validate_state_submission,
};
pub use notify::{
    ChannelKind, DiscordWebhook, DispatchOutcome, Dispatcher, NotifyChannel, Route, SmsGateway,
};
pub use sensor::{
    ApplianceObservation, ApplianceSensor, CameraClient, SensorError, VisionClient, WasherSensor,
};
pub use status::{AgentMode, AgentStatus, Appliance, StatusClient, StatusError, StatusService};
pub use washer::{MonitorTiming, WasherMonitor, run_washer};
