//! Runlevel-scoped service startup and shutdown.

use super::{ServiceDefinition, ServiceInstance};
use crate::core::{BootEvent, ServiceKind, ServiceStatus};
use crate::errors::RunlevelMismatchError;
use crate::events::{EventSink, NoOpEventSink};
use crate::utils::now_utc;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Why a single service failed to start.
///
/// Startup failures are isolated per-service: one failure is recorded and
/// the batch moves on. This is deliberately looser than module loading,
/// where a failure aborts the stage.
#[derive(Debug, Clone, Error)]
pub enum ServiceStartError {
    /// No definition is registered under the requested name.
    #[error("Service not found: {name}")]
    NotFound {
        /// The unknown service name.
        name: String,
    },

    /// The service does not support the requested runlevel.
    #[error(transparent)]
    RunlevelMismatch(#[from] RunlevelMismatchError),

    /// The start action reported failure.
    #[error("Service '{name}' failed to start: {reason}")]
    StartFailed {
        /// The service name.
        name: String,
        /// The underlying cause.
        reason: String,
    },
}

impl ServiceStartError {
    /// The name of the service this failure belongs to.
    #[must_use]
    pub fn service_name(&self) -> &str {
        match self {
            Self::NotFound { name } | Self::StartFailed { name, .. } => name,
            Self::RunlevelMismatch(e) => &e.service,
        }
    }
}

/// The result of one `enter_runlevel` call.
#[derive(Debug, Default)]
pub struct RunlevelOutcome {
    /// The runlevel that was entered.
    pub runlevel: u32,
    /// Instances started by this call, in start order.
    pub started: Vec<ServiceInstance>,
    /// Per-service failures, in encounter order.
    pub failures: Vec<ServiceStartError>,
}

impl RunlevelOutcome {
    /// Looks up a started instance by name.
    #[must_use]
    pub fn instance(&self, name: &str) -> Option<&ServiceInstance> {
        self.started.iter().find(|i| i.name == name)
    }
}

/// Starts and stops named services scoped to ordinal runlevels.
///
/// Runlevels are visited in ascending order by the orchestrating caller;
/// within one `enter_runlevel` call services start strictly in the order
/// given, and daemons are appended to the daemon list in that order.
pub struct RunlevelServiceManager {
    definitions: HashMap<String, ServiceDefinition>,
    instances: HashMap<String, ServiceInstance>,
    daemons: Vec<String>,
    sink: Arc<dyn EventSink>,
}

impl Default for RunlevelServiceManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RunlevelServiceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunlevelServiceManager")
            .field("definitions", &self.definitions.len())
            .field("instances", &self.instances.len())
            .field("daemons", &self.daemons)
            .finish_non_exhaustive()
    }
}

impl RunlevelServiceManager {
    /// Creates an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self {
            definitions: HashMap::new(),
            instances: HashMap::new(),
            daemons: Vec::new(),
            sink: Arc::new(NoOpEventSink),
        }
    }

    /// Sets the event sink for service lifecycle events.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Registers a service definition, replacing any previous one of the
    /// same name.
    pub fn register(&mut self, definition: ServiceDefinition) {
        self.definitions.insert(definition.name.clone(), definition);
    }

    /// Names of registered services that support the given runlevel,
    /// sorted for determinism. Pure lookup.
    #[must_use]
    pub fn services_for_runlevel(&self, runlevel: u32) -> Vec<String> {
        let mut names: Vec<String> = self
            .definitions
            .values()
            .filter(|d| d.supports_runlevel(runlevel))
            .map(|d| d.name.clone())
            .collect();
        names.sort();
        names
    }

    /// Starts the requested services at the given runlevel.
    ///
    /// Each service is handled independently: an unknown name, a runlevel
    /// mismatch, or a failed start action is recorded on the outcome and
    /// the batch continues with the next service.
    pub async fn enter_runlevel(
        &mut self,
        runlevel: u32,
        names: &[&str],
    ) -> RunlevelOutcome {
        debug!(runlevel, requested = names.len(), "entering runlevel");
        let mut outcome = RunlevelOutcome {
            runlevel,
            ..RunlevelOutcome::default()
        };

        for &name in names {
            match self.start_service(runlevel, name).await {
                Ok(instance) => {
                    self.sink
                        .try_emit(BootEvent::service_started(name, runlevel));
                    outcome.started.push(instance);
                }
                Err(err) => {
                    warn!(service = name, runlevel, error = %err, "service start failed");
                    self.sink
                        .try_emit(BootEvent::service_failed(name, runlevel, &err.to_string()));
                    outcome.failures.push(err);
                }
            }
        }

        outcome
    }

    /// Starts one service, enforcing the runlevel gate.
    async fn start_service(
        &mut self,
        runlevel: u32,
        name: &str,
    ) -> Result<ServiceInstance, ServiceStartError> {
        let definition = self
            .definitions
            .get(name)
            .ok_or_else(|| ServiceStartError::NotFound {
                name: name.to_string(),
            })?
            .clone();

        if !definition.supports_runlevel(runlevel) {
            return Err(RunlevelMismatchError::new(name, runlevel).into());
        }

        // Already up; starting again is a no-op rather than a respawn.
        if let Some(existing) = self.instances.get(name) {
            if existing.status == ServiceStatus::Running {
                return Ok(existing.clone());
            }
        }

        let process_info =
            definition
                .start
                .run()
                .await
                .map_err(|cause| ServiceStartError::StartFailed {
                    name: name.to_string(),
                    reason: cause.to_string(),
                })?;

        // A one-shot has finished its work by the time the action returns.
        let status = match definition.kind {
            ServiceKind::Daemon => ServiceStatus::Running,
            ServiceKind::Oneshot => ServiceStatus::Stopped,
        };

        let instance = ServiceInstance {
            name: definition.name.clone(),
            kind: definition.kind,
            runlevel_started: runlevel,
            started_at: now_utc(),
            process_info,
            status,
        };

        if definition.kind == ServiceKind::Daemon {
            self.daemons.push(definition.name.clone());
        }
        self.instances
            .insert(definition.name.clone(), instance.clone());

        Ok(instance)
    }

    /// Stops a running service through its stop action, if any.
    ///
    /// # Errors
    ///
    /// Returns the start-error taxonomy's `NotFound` if no instance exists,
    /// or `StartFailed` if the stop action reports failure (the instance is
    /// then marked failed).
    pub async fn stop_service(&mut self, name: &str) -> Result<(), ServiceStartError> {
        let definition = self
            .definitions
            .get(name)
            .cloned()
            .filter(|_| self.instances.contains_key(name))
            .ok_or_else(|| ServiceStartError::NotFound {
                name: name.to_string(),
            })?;

        if let Some(stop) = &definition.stop {
            if let Err(cause) = stop.run().await {
                if let Some(instance) = self.instances.get_mut(name) {
                    instance.status = ServiceStatus::Failed;
                }
                return Err(ServiceStartError::StartFailed {
                    name: name.to_string(),
                    reason: cause.to_string(),
                });
            }
        }

        if let Some(instance) = self.instances.get_mut(name) {
            instance.status = ServiceStatus::Stopped;
        }
        self.daemons.retain(|d| d != name);
        debug!(service = name, "service stopped");
        Ok(())
    }

    /// Stops all running daemons, newest first.
    ///
    /// Stop failures are isolated the same way start failures are.
    pub async fn stop_all(&mut self) -> Vec<ServiceStartError> {
        let mut failures = Vec::new();
        let order: Vec<String> = self.daemons.iter().rev().cloned().collect();
        for name in order {
            if let Err(err) = self.stop_service(&name).await {
                failures.push(err);
            }
        }
        failures
    }

    /// Names of running daemons, in start order.
    #[must_use]
    pub fn daemons(&self) -> &[String] {
        &self.daemons
    }

    /// Looks up a started instance by name.
    #[must_use]
    pub fn instance(&self, name: &str) -> Option<&ServiceInstance> {
        self.instances.get(name)
    }

    /// All started instances keyed by name.
    #[must_use]
    pub fn instances(&self) -> &HashMap<String, ServiceInstance> {
        &self.instances
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::CollectingEventSink;
    use crate::service::ServiceAction;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    struct FailingAction;

    #[async_trait]
    impl ServiceAction for FailingAction {
        async fn run(&self) -> anyhow::Result<serde_json::Value> {
            anyhow::bail!("refused to start")
        }
    }

    fn manager_with(defs: Vec<ServiceDefinition>) -> RunlevelServiceManager {
        let mut mgr = RunlevelServiceManager::new();
        for def in defs {
            mgr.register(def);
        }
        mgr
    }

    #[tokio::test]
    async fn test_mismatch_does_not_abort_batch() {
        let mut mgr = manager_with(vec![
            ServiceDefinition::daemon("svc-a").at_runlevel(3),
            ServiceDefinition::daemon("svc-b").at_runlevel(5),
        ]);

        let outcome = mgr.enter_runlevel(3, &["svc-a", "svc-b"]).await;

        assert!(outcome.instance("svc-a").is_some());
        assert_eq!(outcome.failures.len(), 1);
        assert!(matches!(
            outcome.failures[0],
            ServiceStartError::RunlevelMismatch(_)
        ));
        assert_eq!(outcome.failures[0].service_name(), "svc-b");
    }

    #[tokio::test]
    async fn test_failure_before_success_still_starts_later_services() {
        let mut mgr = manager_with(vec![
            ServiceDefinition::daemon("bad")
                .at_runlevel(2)
                .with_start(Arc::new(FailingAction)),
            ServiceDefinition::daemon("good").at_runlevel(2),
        ]);

        let outcome = mgr.enter_runlevel(2, &["bad", "good"]).await;

        assert_eq!(outcome.started.len(), 1);
        assert_eq!(outcome.started[0].name, "good");
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].service_name(), "bad");
        // No instance is created for a failed start.
        assert!(mgr.instance("bad").is_none());
    }

    #[tokio::test]
    async fn test_daemon_list_append_order() {
        let mut mgr = manager_with(vec![
            ServiceDefinition::daemon("second").at_runlevel(2),
            ServiceDefinition::daemon("first").at_runlevel(2),
            ServiceDefinition::oneshot("once").at_runlevel(2),
        ]);

        mgr.enter_runlevel(2, &["first", "once", "second"]).await;

        assert_eq!(mgr.daemons(), &["first".to_string(), "second".to_string()]);
    }

    #[tokio::test]
    async fn test_oneshot_is_stopped_after_start() {
        let mut mgr = manager_with(vec![ServiceDefinition::oneshot("fsck").at_runlevel(1)]);

        let outcome = mgr.enter_runlevel(1, &["fsck"]).await;

        assert_eq!(outcome.started[0].status, ServiceStatus::Stopped);
        assert!(mgr.daemons().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_service_is_explicit_not_found() {
        let mut mgr = manager_with(vec![]);

        let outcome = mgr.enter_runlevel(3, &["ghost"]).await;

        assert!(outcome.started.is_empty());
        assert!(matches!(
            outcome.failures[0],
            ServiceStartError::NotFound { .. }
        ));
    }

    #[test]
    fn test_services_for_runlevel_pure_lookup() {
        let mgr = manager_with(vec![
            ServiceDefinition::daemon("netd").at_runlevels([3, 5]),
            ServiceDefinition::daemon("logd").at_runlevels([2, 3]),
            ServiceDefinition::daemon("getty").at_runlevel(5),
        ]);

        assert_eq!(mgr.services_for_runlevel(3), vec!["logd", "netd"]);
        assert_eq!(mgr.services_for_runlevel(5), vec!["getty", "netd"]);
        assert!(mgr.services_for_runlevel(0).is_empty());
        // Lookup starts nothing.
        assert!(mgr.instances().is_empty());
    }

    #[tokio::test]
    async fn test_restart_of_running_daemon_does_not_duplicate() {
        let mut mgr = manager_with(vec![ServiceDefinition::daemon("logd").at_runlevels([2, 3])]);

        mgr.enter_runlevel(2, &["logd"]).await;
        mgr.enter_runlevel(3, &["logd"]).await;

        assert_eq!(mgr.daemons(), &["logd".to_string()]);
        // The original instance, and its start runlevel, are kept.
        assert_eq!(mgr.instance("logd").unwrap().runlevel_started, 2);
    }

    #[tokio::test]
    async fn test_stop_service_updates_status_and_daemons() {
        let mut mgr = manager_with(vec![ServiceDefinition::daemon("logd").at_runlevel(3)]);
        mgr.enter_runlevel(3, &["logd"]).await;

        mgr.stop_service("logd").await.unwrap();

        assert_eq!(mgr.instance("logd").unwrap().status, ServiceStatus::Stopped);
        assert!(mgr.daemons().is_empty());
    }

    #[tokio::test]
    async fn test_stop_all_reverse_order() {
        let mut mgr = manager_with(vec![
            ServiceDefinition::daemon("a").at_runlevel(2),
            ServiceDefinition::daemon("b").at_runlevel(2),
        ]);
        mgr.enter_runlevel(2, &["a", "b"]).await;

        let failures = mgr.stop_all().await;

        assert!(failures.is_empty());
        assert!(mgr.daemons().is_empty());
    }

    #[tokio::test]
    async fn test_service_events_emitted() {
        let sink = Arc::new(CollectingEventSink::new());
        let mut mgr = RunlevelServiceManager::new().with_sink(sink.clone());
        mgr.register(ServiceDefinition::daemon("logd").at_runlevel(3));
        mgr.register(ServiceDefinition::daemon("off").at_runlevel(5));

        mgr.enter_runlevel(3, &["logd", "off"]).await;

        assert_eq!(sink.events_of_type("service.started").len(), 1);
        assert_eq!(sink.events_of_type("service.failed").len(), 1);
    }
}
