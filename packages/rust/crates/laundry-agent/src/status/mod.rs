//! Remote agent status: the shared mode switch that tells each appliance
//! agent whether anybody wants the current cycle watched.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

mod client;

pub use client::StatusClient;

/// Agent operating mode as stored by the status service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentMode {
    /// Somebody asked for the running cycle to be watched.
    Monitor,
    /// Nothing to do until the mode flips back to monitor.
    Idle,
}

impl AgentMode {
    /// Wire name of the mode.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Monitor => "monitor",
            Self::Idle => "idle",
        }
    }
}

impl std::fmt::Display for AgentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status document returned by `getAgentStatus`.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentStatus {
    /// Current mode of the agent.
    pub status: AgentMode,
    /// User who requested monitoring; empty while idle.
    #[serde(default)]
    pub user: String,
}

/// Appliance selector for the status service path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Appliance {
    /// Washing machine agent.
    Washer,
    /// Dryer agent.
    Dryer,
}

impl Appliance {
    fn path_segment(self) -> &'static str {
        match self {
            Self::Washer => "washer",
            Self::Dryer => "dryer",
        }
    }
}

/// Errors surfaced by the status service.
#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    /// The service could not be reached or answered outside its contract.
    #[error("status service unavailable: {0}")]
    Unavailable(String),
    /// The request was rejected before it was sent.
    #[error("invalid status request: {0}")]
    InvalidArgument(String),
}

/// Read and write access to the remote agent status.
#[async_trait]
pub trait StatusService: Send + Sync {
    /// Current mode of the agent.
    async fn mode(&self) -> Result<AgentMode, StatusError>;

    /// User who requested monitoring; empty while idle.
    async fn monitoring_user(&self) -> Result<String, StatusError>;

    /// Write a new mode. Monitor requires a non-empty user; idle clears it.
    async fn set_mode(&self, mode: AgentMode, user: Option<&str>) -> Result<(), StatusError>;
}
