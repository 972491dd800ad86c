//! Service definitions and the runlevel-scoped service manager.

mod definition;
mod runlevel;

pub use definition::{
    NoOpServiceAction, ServiceAction, ServiceDefinition, ServiceInstance,
};
pub use runlevel::{RunlevelOutcome, RunlevelServiceManager, ServiceStartError};
