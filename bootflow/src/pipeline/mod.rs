//! The boot pipeline: accumulated state, status reporting, and the
//! stage-by-stage state machine.

mod boot;
mod state;
mod status;


pub use boot::BootPipeline;
pub use state::BootState;
pub use status::{BootReport, BootStatus};
