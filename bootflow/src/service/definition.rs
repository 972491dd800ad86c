//! Service definitions, lifecycle actions, and running instances.

use crate::core::{ServiceKind, ServiceStatus};
use crate::utils::Timestamp;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Trait for service start/stop actions.
///
/// Like module initialization, these are external collaborators that may
/// block or suspend; the manager awaits each to completion. The returned
/// value becomes the instance's opaque process info.
#[async_trait]
pub trait ServiceAction: Send + Sync {
    /// Runs the action.
    async fn run(&self) -> anyhow::Result<serde_json::Value>;
}

/// A service action that succeeds with a null payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpServiceAction;

#[async_trait]
impl ServiceAction for NoOpServiceAction {
    async fn run(&self) -> anyhow::Result<serde_json::Value> {
        Ok(serde_json::Value::Null)
    }
}

/// Static description of a named service.
#[derive(Clone)]
pub struct ServiceDefinition {
    /// The unique service name.
    pub name: String,
    /// Daemon or one-shot.
    pub kind: ServiceKind,
    /// The runlevels at which this service may start.
    pub supported_runlevels: BTreeSet<u32>,
    /// The start action.
    pub start: Arc<dyn ServiceAction>,
    /// The optional stop action; daemons without one are stopped by
    /// bookkeeping alone.
    pub stop: Option<Arc<dyn ServiceAction>>,
}

impl ServiceDefinition {
    /// Creates a daemon definition with a no-op start action.
    #[must_use]
    pub fn daemon(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ServiceKind::Daemon,
            supported_runlevels: BTreeSet::new(),
            start: Arc::new(NoOpServiceAction),
            stop: None,
        }
    }

    /// Creates a one-shot definition with a no-op start action.
    #[must_use]
    pub fn oneshot(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ServiceKind::Oneshot,
            supported_runlevels: BTreeSet::new(),
            start: Arc::new(NoOpServiceAction),
            stop: None,
        }
    }

    /// Adds a supported runlevel.
    #[must_use]
    pub fn at_runlevel(mut self, runlevel: u32) -> Self {
        self.supported_runlevels.insert(runlevel);
        self
    }

    /// Sets the supported runlevels.
    #[must_use]
    pub fn at_runlevels(mut self, runlevels: impl IntoIterator<Item = u32>) -> Self {
        self.supported_runlevels = runlevels.into_iter().collect();
        self
    }

    /// Sets the start action.
    #[must_use]
    pub fn with_start(mut self, action: Arc<dyn ServiceAction>) -> Self {
        self.start = action;
        self
    }

    /// Sets the stop action.
    #[must_use]
    pub fn with_stop(mut self, action: Arc<dyn ServiceAction>) -> Self {
        self.stop = Some(action);
        self
    }

    /// Returns true if this service may start at the given runlevel.
    #[must_use]
    pub fn supports_runlevel(&self, runlevel: u32) -> bool {
        self.supported_runlevels.contains(&runlevel)
    }
}

impl fmt::Debug for ServiceDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDefinition")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("supported_runlevels", &self.supported_runlevels)
            .field("has_stop", &self.stop.is_some())
            .finish_non_exhaustive()
    }
}

/// A started service. One instance exists per running service name;
/// exists only if the start runlevel is in the definition's supported set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInstance {
    /// The service name.
    pub name: String,
    /// Daemon or one-shot.
    pub kind: ServiceKind,
    /// The runlevel the service was started at.
    pub runlevel_started: u32,
    /// When the start action completed.
    pub started_at: Timestamp,
    /// Opaque payload returned by the start action.
    pub process_info: serde_json::Value,
    /// Current status.
    pub status: ServiceStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daemon_builder() {
        let def = ServiceDefinition::daemon("logd").at_runlevels([2, 3, 5]);

        assert_eq!(def.kind, ServiceKind::Daemon);
        assert!(def.supports_runlevel(3));
        assert!(!def.supports_runlevel(1));
    }

    #[test]
    fn test_oneshot_builder() {
        let def = ServiceDefinition::oneshot("fsck").at_runlevel(1);

        assert_eq!(def.kind, ServiceKind::Oneshot);
        assert!(def.supports_runlevel(1));
    }

    #[tokio::test]
    async fn test_noop_action() {
        let info = NoOpServiceAction.run().await.unwrap();
        assert!(info.is_null());
    }

    #[test]
    fn test_debug_reports_stop_presence() {
        let def = ServiceDefinition::daemon("netd").with_stop(Arc::new(NoOpServiceAction));
        assert!(format!("{def:?}").contains("has_stop: true"));
    }
}
