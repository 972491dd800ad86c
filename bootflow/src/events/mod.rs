//! Event sinks for boot observability.
//!
//! Observers subscribe by handing the pipeline a sink before the run
//! starts. The terminal `boot.completed` / `boot.failed` notification is
//! delivered at most once per terminal state.

use crate::core::BootEvent;
use async_trait::async_trait;
use tracing::info;

/// Trait for sinks that receive boot events.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Delivers an event asynchronously.
    async fn emit(&self, event: BootEvent);

    /// Delivers an event without blocking.
    ///
    /// Must never panic; delivery problems are logged and suppressed.
    fn try_emit(&self, event: BootEvent);
}

/// A sink that discards all events.
///
/// Used as the default when no observer is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventSink;

#[async_trait]
impl EventSink for NoOpEventSink {
    async fn emit(&self, _event: BootEvent) {}

    fn try_emit(&self, _event: BootEvent) {}
}

/// A sink that logs events through the tracing framework.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingEventSink;

impl LoggingEventSink {
    /// Creates a new logging sink.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn log_event(event: &BootEvent) {
        info!(
            event_type = %event.event_type,
            event_data = ?event.data,
            "boot event"
        );
    }
}

#[async_trait]
impl EventSink for LoggingEventSink {
    async fn emit(&self, event: BootEvent) {
        Self::log_event(&event);
    }

    fn try_emit(&self, event: BootEvent) {
        Self::log_event(&event);
    }
}

/// A sink that records events for inspection in tests.
#[derive(Debug, Default)]
pub struct CollectingEventSink {
    events: parking_lot::RwLock<Vec<BootEvent>>,
}

impl CollectingEventSink {
    /// Creates a new collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected events.
    #[must_use]
    pub fn events(&self) -> Vec<BootEvent> {
        self.events.read().clone()
    }

    /// Returns the number of collected events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if no events have been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Returns events whose type starts with the given prefix.
    #[must_use]
    pub fn events_of_type(&self, type_prefix: &str) -> Vec<BootEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| e.event_type.starts_with(type_prefix))
            .cloned()
            .collect()
    }

    /// Clears all collected events.
    pub fn clear(&self) {
        self.events.write().clear();
    }
}

#[async_trait]
impl EventSink for CollectingEventSink {
    async fn emit(&self, event: BootEvent) {
        self.events.write().push(event);
    }

    fn try_emit(&self, event: BootEvent) {
        self.events.write().push(event);
    }
}
