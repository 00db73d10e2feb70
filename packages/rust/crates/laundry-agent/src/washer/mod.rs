//! Washer agent: debounced stop detection over the camera sensor.

mod monitor;
mod runtime;

pub use monitor::{MonitorTiming, WasherMonitor};
pub use runtime::run_washer;
