//! Core vocabulary types shared across the orchestration pipeline.

mod event;
mod status;

pub use event::BootEvent;
pub use status::{PipelineState, ServiceKind, ServiceStatus, SymbolKind};
