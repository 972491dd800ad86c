//! Test doubles and fixtures for exercising boot pipelines.

mod fixtures;
mod mocks;

pub use fixtures::{base_service_set, kernel_module_set};
pub use mocks::{CountingInit, FlakyServiceAction, MockStageAction};
