//! # Bootflow
//!
//! A boot orchestration core: an ordered pipeline of *stages*, each stage
//! loading *modules* with inter-module dependencies, followed by a
//! runlevel-scoped *service manager*, gated by an *integrity checker*
//! that classifies post-stage health into pass/warn/fail.
//!
//! The core treats hardware probing, device simulation, and console
//! narration as opaque external actions behind async trait seams
//! ([`stage::StageAction`], [`module::ModuleInit`],
//! [`service::ServiceAction`]); it owns only the structural decisions:
//! ordering, dependency resolution, and partial-failure classification.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use bootflow::prelude::*;
//! use std::sync::Arc;
//!
//! let mut pipeline = BootPipeline::new()
//!     .with_stage(StageDefinition::new("hw-probe", Arc::new(probe_action)))
//!     .with_stage(StageDefinition::new("bring-up", Arc::new(bring_up_action)))
//!     .with_stage(StageDefinition::new("init", Arc::new(init_action)))
//!     .with_sink(Arc::new(LoggingEventSink::new()));
//!
//! let report = pipeline.run().await?;
//! assert!(report.success);
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod core;
pub mod errors;
pub mod events;
pub mod integrity;
pub mod module;
pub mod observability;
pub mod pipeline;
pub mod service;
pub mod stage;
pub mod testing;
pub mod utils;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::core::{
        BootEvent, PipelineState, ServiceKind, ServiceStatus, SymbolKind,
    };
    pub use crate::errors::{
        BootflowError, CycleError, DependencyError, RunlevelMismatchError,
        StageError, SymbolConflictError, UnsatisfiedDependencyError,
    };
    pub use crate::events::{
        CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink,
    };
    pub use crate::integrity::{
        IntegrityChecker, IntegrityReport, IntegrityRequirements, Requirement,
        Severity,
    };
    pub use crate::module::{
        Export, ModuleDefinition, ModuleDependencyResolver, ModuleHandle,
        ModuleInit, ModuleLoader, Symbol, SymbolTable,
    };
    pub use crate::pipeline::{BootPipeline, BootReport, BootState, BootStatus};
    pub use crate::service::{
        RunlevelOutcome, RunlevelServiceManager, ServiceAction,
        ServiceDefinition, ServiceInstance,
    };
    pub use crate::stage::{
        ActionOutput, FnStageAction, StageAction, StageDefinition,
        StageExecutor, StageResult,
    };
    pub use crate::utils::{generate_run_id, iso_timestamp, Timestamp};
}
