//! Pipeline status snapshots and terminal reports.

use crate::core::PipelineState;
use crate::utils::Timestamp;
use serde::{Deserialize, Serialize};

/// A read-only snapshot of pipeline progress.
///
/// Available from any state, including mid-run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootStatus {
    /// True once the pipeline reached `Completed`.
    pub initialized: bool,
    /// The pipeline's lifecycle state at snapshot time.
    pub state: PipelineState,
    /// Errors recorded so far, in order.
    pub errors: Vec<String>,
    /// Warnings recorded so far, in order.
    pub warnings: Vec<String>,
    /// When the run started, if it has.
    pub start_time: Option<Timestamp>,
    /// When the run reached a terminal state, if it has.
    pub end_time: Option<Timestamp>,
    /// Index of the stage currently or last executed (0-based).
    pub current_stage_index: Option<usize>,
    /// Total number of stages in the pipeline.
    pub total_stages: usize,
    /// Number of modules loaded so far.
    pub module_count: usize,
    /// Number of services started so far.
    pub service_count: usize,
}

/// The structured result of a finished boot run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootReport {
    /// Whether every stage succeeded.
    pub success: bool,
    /// Total wall-clock boot time in seconds.
    pub boot_time_seconds: f64,
    /// Loaded module names, sorted.
    pub module_names: Vec<String>,
    /// Started service names, sorted.
    pub service_names: Vec<String>,
    /// The 0-based index of the failing stage, on failure.
    pub failed_stage_index: Option<usize>,
    /// The id of the failing stage, on failure.
    pub failed_stage_id: Option<String>,
    /// The underlying failure message, on failure.
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes() {
        let status = BootStatus {
            initialized: false,
            state: PipelineState::Running { stage: 1 },
            errors: vec![],
            warnings: vec![],
            start_time: None,
            end_time: None,
            current_stage_index: Some(1),
            total_stages: 4,
            module_count: 2,
            service_count: 0,
        };

        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["total_stages"], 4);
        assert_eq!(json["current_stage_index"], 1);
    }

    #[test]
    fn test_report_serializes_failure_fields() {
        let report = BootReport {
            success: false,
            boot_time_seconds: 0.5,
            module_names: vec![],
            service_names: vec![],
            failed_stage_index: Some(1),
            failed_stage_id: Some("bring-up".to_string()),
            error: Some("boom".to_string()),
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["failed_stage_id"], "bring-up");
    }
}
