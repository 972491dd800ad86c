//! Mock collaborators that record invocations.

use crate::module::ModuleInit;
use crate::pipeline::BootState;
use crate::service::ServiceAction;
use crate::stage::{ActionOutput, StageAction};
use async_trait::async_trait;
use parking_lot::Mutex;

/// A stage action that records calls and returns a configurable output.
///
/// Useful for asserting that a pipeline never invokes stages after a
/// failure.
#[derive(Debug)]
pub struct MockStageAction {
    output: Mutex<ActionOutput>,
    call_count: Mutex<usize>,
}

impl Default for MockStageAction {
    fn default() -> Self {
        Self::new()
    }
}

impl MockStageAction {
    /// Creates a mock that succeeds with an empty output.
    #[must_use]
    pub fn new() -> Self {
        Self {
            output: Mutex::new(ActionOutput::ok()),
            call_count: Mutex::new(0),
        }
    }

    /// Creates a mock that fails with the given message.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            output: Mutex::new(ActionOutput::fail(message)),
            call_count: Mutex::new(0),
        }
    }

    /// Replaces the output to return.
    pub fn set_output(&self, output: ActionOutput) {
        *self.output.lock() = output;
    }

    /// Returns the number of times the action was executed.
    #[must_use]
    pub fn call_count(&self) -> usize {
        *self.call_count.lock()
    }

    /// Resets call tracking.
    pub fn reset(&self) {
        *self.call_count.lock() = 0;
    }
}

#[async_trait]
impl StageAction for MockStageAction {
    async fn execute(&self, _prior: &BootState) -> ActionOutput {
        *self.call_count.lock() += 1;
        self.output.lock().clone()
    }
}

/// A module initialization action that counts invocations.
#[derive(Debug, Default)]
pub struct CountingInit {
    calls: Mutex<usize>,
}

impl CountingInit {
    /// Creates a new counting init.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of initializations performed.
    #[must_use]
    pub fn calls(&self) -> usize {
        *self.calls.lock()
    }
}

#[async_trait]
impl ModuleInit for CountingInit {
    async fn initialize(&self) -> anyhow::Result<serde_json::Value> {
        *self.calls.lock() += 1;
        Ok(serde_json::Value::Null)
    }
}

/// A service action that fails a configured number of times, then succeeds.
#[derive(Debug)]
pub struct FlakyServiceAction {
    remaining_failures: Mutex<usize>,
}

impl FlakyServiceAction {
    /// Creates an action that fails `failures` times before succeeding.
    #[must_use]
    pub fn new(failures: usize) -> Self {
        Self {
            remaining_failures: Mutex::new(failures),
        }
    }
}

#[async_trait]
impl ServiceAction for FlakyServiceAction {
    async fn run(&self) -> anyhow::Result<serde_json::Value> {
        let mut remaining = self.remaining_failures.lock();
        if *remaining > 0 {
            *remaining -= 1;
            anyhow::bail!("transient start failure")
        }
        Ok(serde_json::Value::Null)
    }
}
