//! The stage action collaborator boundary.

use super::ActionOutput;
use crate::pipeline::BootState;
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::fmt;
use std::sync::Arc;

/// Trait for external stage actions.
///
/// A stage action receives the accumulated prior state and produces the
/// modules, services, symbols, and tables the stage contributes. Actions
/// may block or suspend; the executor awaits each to completion. Whether
/// an action is idempotent is the action's own concern.
#[async_trait]
pub trait StageAction: Send + Sync {
    /// Executes the stage's work against the prior state.
    async fn execute(&self, prior: &BootState) -> ActionOutput;
}

/// Identifies one pipeline step and the action that performs it.
#[derive(Clone)]
pub struct StageDefinition {
    /// The unique stage id.
    pub id: String,
    /// The external action invoked for this stage.
    pub action: Arc<dyn StageAction>,
}

impl StageDefinition {
    /// Creates a new stage definition.
    #[must_use]
    pub fn new(id: impl Into<String>, action: Arc<dyn StageAction>) -> Self {
        Self {
            id: id.into(),
            action,
        }
    }
}

impl fmt::Debug for StageDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageDefinition")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// A stage action built from an async closure.
pub struct FnStageAction {
    func: Box<dyn Fn(BootState) -> BoxFuture<'static, ActionOutput> + Send + Sync>,
}

impl FnStageAction {
    /// Creates a stage action from a closure returning a boxed future.
    #[must_use]
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(BootState) -> BoxFuture<'static, ActionOutput> + Send + Sync + 'static,
    {
        Self {
            func: Box::new(func),
        }
    }
}

impl fmt::Debug for FnStageAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnStageAction").finish_non_exhaustive()
    }
}

#[async_trait]
impl StageAction for FnStageAction {
    async fn execute(&self, prior: &BootState) -> ActionOutput {
        (self.func)(prior.clone()).await
    }
}

/// A stage action that succeeds without producing anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpStageAction;

#[async_trait]
impl StageAction for NoOpStageAction {
    async fn execute(&self, _prior: &BootState) -> ActionOutput {
        ActionOutput::ok()
    }
}
