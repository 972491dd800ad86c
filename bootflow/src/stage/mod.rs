//! Boot stages: the external action boundary and its executor.

mod action;
mod executor;
mod result;

pub use action::{FnStageAction, NoOpStageAction, StageAction, StageDefinition};
pub use executor::StageExecutor;
pub use result::{ActionOutput, StageResult};
