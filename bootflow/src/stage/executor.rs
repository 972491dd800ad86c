//! Single-stage execution with failure wrapping.

use super::{StageDefinition, StageResult};
use crate::pipeline::BootState;
use std::time::{Duration, Instant};
use tracing::debug;

/// Runs one boot stage and reports the result.
///
/// The executor is stateless and never lets an error escape its boundary:
/// a failed action, a `success: false` output, or a blown deadline all
/// become a failed [`StageResult`] naming the stage id.
#[derive(Debug, Clone, Copy, Default)]
pub struct StageExecutor {
    stage_timeout: Option<Duration>,
}

impl StageExecutor {
    /// Creates an executor with no deadline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a per-stage deadline. Actions that exceed it fail the stage.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.stage_timeout = Some(timeout);
        self
    }

    /// Executes a stage's action against the prior state.
    pub async fn run(&self, definition: &StageDefinition, prior: &BootState) -> StageResult {
        debug!(stage = %definition.id, "executing stage");
        let start = Instant::now();

        let output = match self.stage_timeout {
            Some(deadline) => {
                match tokio::time::timeout(deadline, definition.action.execute(prior)).await {
                    Ok(output) => output,
                    Err(_) => {
                        return StageResult::from_error(
                            &definition.id,
                            format!("deadline of {deadline:?} exceeded"),
                            start.elapsed().as_secs_f64() * 1000.0,
                        );
                    }
                }
            }
            None => definition.action.execute(prior).await,
        };

        StageResult::from_output(&definition.id, output, start.elapsed().as_secs_f64() * 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::{ActionOutput, FnStageAction, NoOpStageAction, StageAction};
    use async_trait::async_trait;
    use futures::FutureExt;
    use std::sync::Arc;

    struct SlowAction;

    #[async_trait]
    impl StageAction for SlowAction {
        async fn execute(&self, _prior: &BootState) -> ActionOutput {
            tokio::time::sleep(Duration::from_millis(500)).await;
            ActionOutput::ok()
        }
    }

    #[tokio::test]
    async fn test_successful_stage() {
        let def = StageDefinition::new("probe", Arc::new(NoOpStageAction));
        let result = StageExecutor::new().run(&def, &BootState::new()).await;

        assert!(result.is_success());
        assert_eq!(result.stage_id, "probe");
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn test_failed_output_is_wrapped_not_thrown() {
        let action = FnStageAction::new(|_| async { ActionOutput::fail("probe found no cpus") }.boxed());
        let def = StageDefinition::new("probe", Arc::new(action));

        let result = StageExecutor::new().run(&def, &BootState::new()).await;

        assert!(!result.is_success());
        let error = result.error.unwrap();
        assert_eq!(error.stage_id, "probe");
        assert!(error.message.contains("no cpus"));
    }

    #[tokio::test]
    async fn test_deadline_fails_the_stage() {
        let def = StageDefinition::new("slow", Arc::new(SlowAction));
        let executor = StageExecutor::new().with_timeout(Duration::from_millis(10));

        let result = executor.run(&def, &BootState::new()).await;

        assert!(!result.is_success());
        assert!(result.error.unwrap().message.contains("deadline"));
    }

    #[tokio::test]
    async fn test_executor_is_reusable() {
        let executor = StageExecutor::new();
        let def = StageDefinition::new("idempotent", Arc::new(NoOpStageAction));

        let first = executor.run(&def, &BootState::new()).await;
        let second = executor.run(&def, &BootState::new()).await;

        assert!(first.is_success());
        assert!(second.is_success());
    }
}
