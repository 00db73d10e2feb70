//! Quiet-window accumulation over dryer vibration readings.

use std::time::Duration;

use super::DryerState;

/// Tracks how long the dryer has stayed stationary.
///
/// The window only accumulates across consecutive stationary looks; any
/// vibration, or a gap with no readings at all, starts the count over.
#[derive(Debug)]
pub struct QuietWindow {
    required: Duration,
    accumulated: Duration,
    was_stationary: bool,
}

impl QuietWindow {
    /// Build a window that completes after `required` accumulated quiet.
    #[must_use]
    pub fn new(required: Duration) -> Self {
        Self {
            required,
            accumulated: Duration::ZERO,
            was_stationary: false,
        }
    }

    /// Fold one look at the latest reading into the window.
    ///
    /// Returns true once the accumulated quiet reaches the required span.
    pub fn observe(&mut self, latest: Option<DryerState>, elapsed: Duration) -> bool {
        match latest {
            Some(DryerState::Stationary) => {
                if self.was_stationary {
                    self.accumulated += elapsed;
                } else {
                    // Just went quiet; the window starts counting now.
                    self.accumulated = Duration::ZERO;
                    self.was_stationary = true;
                }
                self.accumulated >= self.required
            }
            Some(DryerState::Vibrating) | None => {
                if self.was_stationary {
                    self.accumulated = Duration::ZERO;
                    self.was_stationary = false;
                }
                false
            }
        }
    }

    /// Clear all accumulated quiet.
    pub fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
        self.was_stationary = false;
    }

    /// Quiet accumulated so far.
    #[must_use]
    pub fn accumulated(&self) -> Duration {
        self.accumulated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(value: u64) -> Duration {
        Duration::from_secs(value)
    }

    #[test]
    fn first_stationary_look_starts_at_zero() {
        let mut window = QuietWindow::new(secs(3));
        assert!(!window.observe(Some(DryerState::Stationary), secs(1)));
        assert_eq!(window.accumulated(), Duration::ZERO);
    }

    #[test]
    fn stationary_looks_accumulate_until_the_window_completes() {
        let mut window = QuietWindow::new(secs(3));
        assert!(!window.observe(Some(DryerState::Stationary), secs(1)));
        assert!(!window.observe(Some(DryerState::Stationary), secs(1)));
        assert!(!window.observe(Some(DryerState::Stationary), secs(1)));
        assert!(window.observe(Some(DryerState::Stationary), secs(1)));
    }

    #[test]
    fn vibration_resets_the_window() {
        let mut window = QuietWindow::new(secs(3));
        window.observe(Some(DryerState::Stationary), secs(1));
        window.observe(Some(DryerState::Stationary), secs(1));
        assert!(!window.observe(Some(DryerState::Vibrating), secs(1)));
        assert_eq!(window.accumulated(), Duration::ZERO);
        assert!(!window.observe(Some(DryerState::Stationary), secs(1)));
        assert_eq!(window.accumulated(), Duration::ZERO);
    }

    #[test]
    fn no_submissions_accumulate_nothing() {
        let mut window = QuietWindow::new(secs(3));
        assert!(!window.observe(None, secs(1)));
        assert!(!window.observe(None, secs(1)));
        assert_eq!(window.accumulated(), Duration::ZERO);
    }
}
