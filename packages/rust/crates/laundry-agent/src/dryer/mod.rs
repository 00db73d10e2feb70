//! Dryer agent: vibration ingest plus a quiet-window watch.

mod ingest;
mod runtime;
mod watch;

pub use ingest::{
    DryerState, StateHistory, StateSubmission, SubmitStateRequest, router,
    validate_state_submission,
};
pub use runtime::{DryerWatcher, run_dryer};
pub use watch::QuietWindow;
