//! HTTP ingest for dryer vibration readings.
//!
//! A sensor box on top of the dryer posts `vibrating` or `stationary` here;
//! the watcher consumes the latest reading on its own cadence.

use std::collections::VecDeque;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Vibration state reported by the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DryerState {
    /// The dryer drum is moving.
    Vibrating,
    /// No movement detected.
    Stationary,
}

impl std::fmt::Display for DryerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vibrating => f.write_str("vibrating"),
            Self::Stationary => f.write_str("stationary"),
        }
    }
}

/// One accepted reading with its arrival time.
#[derive(Debug, Clone, Copy)]
pub struct StateSubmission {
    /// Reported vibration state.
    pub state: DryerState,
    /// When the reading arrived.
    pub received_at: Instant,
}

/// Shared, bounded-by-pruning history of sensor readings.
#[derive(Clone, Default)]
pub struct StateHistory {
    entries: Arc<Mutex<VecDeque<StateSubmission>>>,
}

impl StateHistory {
    /// Append a reading.
    pub async fn record(&self, state: DryerState, received_at: Instant) {
        let mut entries = self.entries.lock().await;
        entries.push_back(StateSubmission { state, received_at });
    }

    /// Most recent reading, if any.
    pub async fn latest(&self) -> Option<StateSubmission> {
        let entries = self.entries.lock().await;
        entries.back().copied()
    }

    /// Drop readings at or before `cutoff`; returns how many remain.
    pub async fn prune_older_than(&self, cutoff: Instant) -> usize {
        let mut entries = self.entries.lock().await;
        entries.retain(|entry| entry.received_at > cutoff);
        entries.len()
    }

    /// Number of retained readings.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Whether no readings are retained.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

/// Body of a `POST /submitState` request.
#[derive(Debug, Deserialize)]
pub struct SubmitStateRequest {
    /// Reported state, `vibrating` or `stationary`.
    pub state: String,
}

#[derive(Debug, Serialize)]
struct SubmitStateResponse {
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct IngestStatusResponse {
    status: &'static str,
}

/// Validate a submission body into a typed state.
///
/// # Errors
///
/// Returns `400 Bad Request` when the state is not a known value.
pub fn validate_state_submission(
    request: &SubmitStateRequest,
) -> Result<DryerState, (StatusCode, String)> {
    match request.state.trim() {
        "vibrating" => Ok(DryerState::Vibrating),
        "stationary" => Ok(DryerState::Stationary),
        _ => Err((
            StatusCode::BAD_REQUEST,
            "state must be 'vibrating' or 'stationary'".to_string(),
        )),
    }
}

async fn handle_submit_state(
    State(history): State<StateHistory>,
    Json(request): Json<SubmitStateRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let state = validate_state_submission(&request)?;
    history.record(state, Instant::now()).await;
    tracing::debug!(event = "dryer.ingest.state_recorded", state = %state);
    Ok(Json(SubmitStateResponse {
        message: "State submitted",
    }))
}

async fn handle_status() -> impl IntoResponse {
    Json(IngestStatusResponse { status: "ok" })
}

/// Build the ingest router over a shared history.
pub fn router(history: StateHistory) -> Router {
    Router::new()
        .route("/status", get(handle_status))
        .route("/submitState", post(handle_submit_state))
        .with_state(history)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submissions_validate_known_states() {
        let vibrating = SubmitStateRequest {
            state: "vibrating".to_string(),
        };
        let stationary = SubmitStateRequest {
            state: " stationary ".to_string(),
        };
        assert_eq!(
            validate_state_submission(&vibrating).expect("vibrating"),
            DryerState::Vibrating
        );
        assert_eq!(
            validate_state_submission(&stationary).expect("stationary"),
            DryerState::Stationary
        );
    }

    #[test]
    fn submissions_reject_unknown_states() {
        let request = SubmitStateRequest {
            state: "tumbling".to_string(),
        };
        let (status, message) = validate_state_submission(&request).expect_err("must reject");
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(message.contains("vibrating"));
    }
}
