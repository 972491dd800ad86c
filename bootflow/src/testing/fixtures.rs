//! Canonical module and service definition sets for tests.

use crate::module::{Export, ModuleDefinition};
use crate::service::ServiceDefinition;

/// A small kernel-flavored module set with realistic dependencies.
///
/// Resolves to: interrupts, memory, timer, scheduler, process.
#[must_use]
pub fn kernel_module_set() -> Vec<ModuleDefinition> {
    vec![
        ModuleDefinition::new("process")
            .with_priority(40)
            .with_dependencies(["scheduler", "memory"])
            .with_export(Export::function("fork"))
            .with_export(Export::function("exec")),
        ModuleDefinition::new("scheduler")
            .with_priority(30)
            .with_dependency("timer")
            .with_export(Export::function("sched_yield")),
        ModuleDefinition::new("memory")
            .with_priority(10)
            .with_export(Export::function("kmalloc"))
            .with_export(Export::function("kfree")),
        ModuleDefinition::new("timer")
            .with_priority(20)
            .with_dependency("interrupts")
            .with_export(Export::value("jiffies")),
        ModuleDefinition::new("interrupts")
            .with_priority(0)
            .with_export(Export::function("request_irq")),
    ]
}

/// A baseline service set spanning early and multi-user runlevels.
#[must_use]
pub fn base_service_set() -> Vec<ServiceDefinition> {
    vec![
        ServiceDefinition::oneshot("fsck").at_runlevel(1),
        ServiceDefinition::daemon("logd").at_runlevels([2, 3, 5]),
        ServiceDefinition::daemon("netd").at_runlevels([3, 5]),
        ServiceDefinition::daemon("getty").at_runlevel(5),
    ]
}
