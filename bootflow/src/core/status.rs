//! Pipeline, service, and symbol state enums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The lifecycle state of a boot pipeline run.
///
/// Transitions are strictly `NotStarted -> Running -> Completed | Failed`;
/// the terminal states only leave via a full `reboot()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PipelineState {
    /// The pipeline has not begun executing stages.
    NotStarted,
    /// The pipeline is executing the stage at this index (0-based).
    Running {
        /// The index of the stage currently executing.
        stage: usize,
    },
    /// All stages completed successfully.
    Completed,
    /// A stage failed; no further stages were executed.
    Failed,
}

impl Default for PipelineState {
    fn default() -> Self {
        Self::NotStarted
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not_started"),
            Self::Running { stage } => write!(f, "running({stage})"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

impl PipelineState {
    /// Returns true if the state is terminal for this run.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Returns true if the pipeline is currently executing a stage.
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }
}

/// Whether a service runs persistently or once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    /// A long-running service tracked on the daemon list.
    Daemon,
    /// A service that runs its start action once and is done.
    Oneshot,
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Daemon => write!(f, "daemon"),
            Self::Oneshot => write!(f, "oneshot"),
        }
    }
}

/// The runtime status of a started service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    /// The service started and is considered up.
    Running,
    /// The service was stopped through its stop action.
    Stopped,
    /// The service start or stop action reported failure.
    Failed,
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Stopped => write!(f, "stopped"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// The kind of a symbol exported by a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    /// A callable export.
    Function,
    /// A data export.
    Value,
}

impl Default for SymbolKind {
    fn default() -> Self {
        Self::Function
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Function => write!(f, "function"),
            Self::Value => write!(f, "value"),
        }
    }
}
