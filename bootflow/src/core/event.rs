//! Boot event type emitted through event sinks.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An event emitted by the pipeline during a boot run.
///
/// Events carry a dotted type name (e.g. `"stage.started"`,
/// `"boot.completed"`), an ISO 8601 timestamp, and a JSON payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootEvent {
    /// The event type.
    #[serde(rename = "type")]
    pub event_type: String,

    /// When the event occurred (ISO 8601).
    pub timestamp: String,

    /// The event payload data.
    #[serde(default)]
    pub data: HashMap<String, serde_json::Value>,
}

impl BootEvent {
    /// Creates a new event with an empty payload.
    #[must_use]
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            timestamp: crate::utils::iso_timestamp(),
            data: HashMap::new(),
        }
    }

    /// Adds a payload field to the event.
    #[must_use]
    pub fn add_data(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    /// Creates a "stage.started" event.
    #[must_use]
    pub fn stage_started(stage_id: &str, index: usize) -> Self {
        Self::new("stage.started")
            .add_data("stage", serde_json::json!(stage_id))
            .add_data("index", serde_json::json!(index))
    }

    /// Creates a "stage.completed" event.
    #[must_use]
    pub fn stage_completed(stage_id: &str, duration_ms: f64) -> Self {
        Self::new("stage.completed")
            .add_data("stage", serde_json::json!(stage_id))
            .add_data("duration_ms", serde_json::json!(duration_ms))
    }

    /// Creates a "stage.failed" event.
    #[must_use]
    pub fn stage_failed(stage_id: &str, error: &str) -> Self {
        Self::new("stage.failed")
            .add_data("stage", serde_json::json!(stage_id))
            .add_data("error", serde_json::json!(error))
    }

    /// Creates a "service.started" event.
    #[must_use]
    pub fn service_started(service: &str, runlevel: u32) -> Self {
        Self::new("service.started")
            .add_data("service", serde_json::json!(service))
            .add_data("runlevel", serde_json::json!(runlevel))
    }

    /// Creates a "service.failed" event.
    #[must_use]
    pub fn service_failed(service: &str, runlevel: u32, error: &str) -> Self {
        Self::new("service.failed")
            .add_data("service", serde_json::json!(service))
            .add_data("runlevel", serde_json::json!(runlevel))
            .add_data("error", serde_json::json!(error))
    }

    /// Creates the terminal "boot.completed" notification.
    ///
    /// Payload shape: `{success, boot_time_seconds, modules, services}`.
    #[must_use]
    pub fn boot_completed(boot_time_seconds: f64, modules: Vec<String>, services: Vec<String>) -> Self {
        Self::new("boot.completed")
            .add_data("success", serde_json::json!(true))
            .add_data("boot_time_seconds", serde_json::json!(boot_time_seconds))
            .add_data("modules", serde_json::json!(modules))
            .add_data("services", serde_json::json!(services))
    }

    /// Creates the terminal "boot.failed" notification.
    ///
    /// Payload shape: `{success: false, error, stage_index, stage_id}`.
    /// The stage fields are null when the failure is not attributable to a
    /// stage (e.g. the final integrity verdict).
    #[must_use]
    pub fn boot_failed(error: &str, stage_index: Option<usize>, stage_id: Option<&str>) -> Self {
        Self::new("boot.failed")
            .add_data("success", serde_json::json!(false))
            .add_data("error", serde_json::json!(error))
            .add_data("stage_index", serde_json::json!(stage_index))
            .add_data("stage_id", serde_json::json!(stage_id))
    }
}
