//! The boot pipeline state machine.

use super::{BootReport, BootState, BootStatus};
use crate::core::{BootEvent, PipelineState};
use crate::errors::BootflowError;
use crate::events::{EventSink, NoOpEventSink};
use crate::integrity::{IntegrityChecker, IntegrityRequirements};
use crate::stage::{StageDefinition, StageExecutor};
use crate::utils::{generate_run_id, now_utc, Timestamp};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info};

/// Runs an ordered list of boot stages end-to-end.
///
/// Lifecycle: `NotStarted -> Running(i) -> Completed | Failed`. A stage
/// failure stops the run; later stages are never invoked. The terminal
/// states only leave via [`reboot`](Self::reboot), which discards all
/// accumulated state and starts the next run cold.
pub struct BootPipeline {
    stages: Vec<StageDefinition>,
    executor: StageExecutor,
    sink: Arc<dyn EventSink>,
    checker: IntegrityChecker,
    stage_checks: HashMap<String, IntegrityRequirements>,
    final_check: Option<IntegrityRequirements>,

    run_id: String,
    state: BootState,
    pipeline_state: PipelineState,
    errors: Vec<String>,
    warnings: Vec<String>,
    start_time: Option<Timestamp>,
    end_time: Option<Timestamp>,
    last_stage_index: Option<usize>,
    failed_stage: Option<(usize, String)>,
}

impl Default for BootPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BootPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootPipeline")
            .field("run_id", &self.run_id)
            .field("stages", &self.stages.len())
            .field("state", &self.pipeline_state)
            .finish_non_exhaustive()
    }
}

impl BootPipeline {
    /// Creates an empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stages: Vec::new(),
            executor: StageExecutor::new(),
            sink: Arc::new(NoOpEventSink),
            checker: IntegrityChecker::new(),
            stage_checks: HashMap::new(),
            final_check: None,
            run_id: generate_run_id(),
            state: BootState::new(),
            pipeline_state: PipelineState::NotStarted,
            errors: Vec::new(),
            warnings: Vec::new(),
            start_time: None,
            end_time: None,
            last_stage_index: None,
            failed_stage: None,
        }
    }

    /// Appends a stage.
    #[must_use]
    pub fn with_stage(mut self, stage: StageDefinition) -> Self {
        self.stages.push(stage);
        self
    }

    /// Appends several stages.
    #[must_use]
    pub fn with_stages(mut self, stages: impl IntoIterator<Item = StageDefinition>) -> Self {
        self.stages.extend(stages);
        self
    }

    /// Sets the event sink observers subscribe through. Must be set
    /// before the run starts.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Sets a per-stage deadline.
    #[must_use]
    pub fn with_stage_timeout(mut self, timeout: Duration) -> Self {
        self.executor = self.executor.with_timeout(timeout);
        self
    }

    /// Attaches an integrity check to run after the named stage succeeds.
    ///
    /// Issues fail the stage; warnings are recorded and the run continues.
    #[must_use]
    pub fn with_stage_check(
        mut self,
        stage_id: impl Into<String>,
        requirements: IntegrityRequirements,
    ) -> Self {
        self.stage_checks.insert(stage_id.into(), requirements);
        self
    }

    /// Attaches the final integrity verdict, verified after the last stage.
    ///
    /// An unhealthy verdict fails the run rather than completing it with
    /// unreported issues.
    #[must_use]
    pub fn with_final_check(mut self, requirements: IntegrityRequirements) -> Self {
        self.final_check = Some(requirements);
        self
    }

    /// The identifier of the current run.
    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// The pipeline's lifecycle state.
    #[must_use]
    pub fn pipeline_state(&self) -> PipelineState {
        self.pipeline_state
    }

    /// The accumulated state of the current run.
    #[must_use]
    pub fn state(&self) -> &BootState {
        &self.state
    }

    /// Executes all stages in order.
    ///
    /// Returns the structured terminal report; stage failures are reported
    /// through it, not as `Err`.
    ///
    /// # Errors
    ///
    /// Returns [`BootflowError::InvalidState`] if the pipeline is not in
    /// `NotStarted` (call [`reboot`](Self::reboot) first).
    pub async fn run(&mut self) -> Result<BootReport, BootflowError> {
        if self.pipeline_state != PipelineState::NotStarted {
            return Err(BootflowError::InvalidState(format!(
                "run() requires a fresh pipeline, current state is {}",
                self.pipeline_state
            )));
        }

        let wall = Instant::now();
        self.start_time = Some(now_utc());
        info!(run_id = %self.run_id, stages = self.stages.len(), "boot run starting");

        for index in 0..self.stages.len() {
            let stage = self.stages[index].clone();
            self.pipeline_state = PipelineState::Running { stage: index };
            self.last_stage_index = Some(index);

            self.sink
                .emit(BootEvent::stage_started(&stage.id, index))
                .await;

            let result = self.executor.run(&stage, &self.state).await;

            if !result.success {
                let message = result
                    .error
                    .as_ref()
                    .map_or_else(|| "stage failed".to_string(), ToString::to_string);
                return Ok(self.fail(wall, Some((index, stage.id.clone())), message).await);
            }

            if let Err(conflict) = self.state.merge(&result) {
                return Ok(self
                    .fail(wall, Some((index, stage.id.clone())), conflict.to_string())
                    .await);
            }

            if let Some(requirements) = self.stage_checks.get(&stage.id) {
                let report = self.checker.verify(requirements, &self.state);
                self.warnings.extend(report.warnings.iter().cloned());
                if !report.healthy {
                    let message =
                        format!("integrity check failed: {}", report.issues.join("; "));
                    return Ok(self.fail(wall, Some((index, stage.id.clone())), message).await);
                }
            }

            self.sink
                .emit(BootEvent::stage_completed(&stage.id, result.duration_ms))
                .await;
        }

        if let Some(requirements) = &self.final_check {
            let report = self.checker.verify(requirements, &self.state);
            self.warnings.extend(report.warnings.iter().cloned());
            if !report.healthy {
                // Not a stage's fault; the report carries no stage fields.
                let message =
                    format!("final integrity verdict unhealthy: {}", report.issues.join("; "));
                return Ok(self.fail(wall, None, message).await);
            }
        }

        self.pipeline_state = PipelineState::Completed;
        self.end_time = Some(now_utc());
        let boot_time_seconds = wall.elapsed().as_secs_f64();

        let module_names = self.state.module_names();
        let service_names = self.state.service_names();

        info!(
            run_id = %self.run_id,
            boot_time_seconds,
            modules = module_names.len(),
            services = service_names.len(),
            "boot run completed"
        );

        self.sink
            .emit(BootEvent::boot_completed(
                boot_time_seconds,
                module_names.clone(),
                service_names.clone(),
            ))
            .await;

        Ok(BootReport {
            success: true,
            boot_time_seconds,
            module_names,
            service_names,
            failed_stage_index: None,
            failed_stage_id: None,
            error: None,
        })
    }

    /// Transitions to `Failed`, recording and announcing the failure.
    ///
    /// `stage` is absent when the failure is not attributable to a single
    /// stage, such as an unhealthy final verdict.
    async fn fail(
        &mut self,
        wall: Instant,
        stage: Option<(usize, String)>,
        message: String,
    ) -> BootReport {
        error!(run_id = %self.run_id, stage = ?stage, %message, "boot run failed");

        self.pipeline_state = PipelineState::Failed;
        self.end_time = Some(now_utc());
        self.errors.push(message.clone());
        self.failed_stage = stage.clone();

        if let Some((index, stage_id)) = &stage {
            self.sink
                .emit(BootEvent::stage_failed(stage_id, &message))
                .await;
            self.sink
                .emit(BootEvent::boot_failed(&message, Some(*index), Some(stage_id)))
                .await;
        } else {
            self.sink.emit(BootEvent::boot_failed(&message, None, None)).await;
        }

        let (failed_stage_index, failed_stage_id) = match stage {
            Some((index, stage_id)) => (Some(index), Some(stage_id)),
            None => (None, None),
        };

        BootReport {
            success: false,
            boot_time_seconds: wall.elapsed().as_secs_f64(),
            module_names: self.state.module_names(),
            service_names: self.state.service_names(),
            failed_stage_index,
            failed_stage_id,
            error: Some(message),
        }
    }

    /// Cold-restarts the pipeline.
    ///
    /// All accumulated collections are replaced, not cleared in place, so
    /// nothing from the previous run leaks into the next. The stage list
    /// and configuration are kept.
    pub fn reboot(&mut self) {
        info!(run_id = %self.run_id, "rebooting pipeline");
        self.run_id = generate_run_id();
        self.state = BootState::new();
        self.pipeline_state = PipelineState::NotStarted;
        self.errors = Vec::new();
        self.warnings = Vec::new();
        self.start_time = None;
        self.end_time = None;
        self.last_stage_index = None;
        self.failed_stage = None;
    }

    /// Returns a read-only snapshot of the pipeline's progress.
    ///
    /// Available from any state; reflects live progress while running.
    #[must_use]
    pub fn status(&self) -> BootStatus {
        BootStatus {
            initialized: self.pipeline_state == PipelineState::Completed,
            state: self.pipeline_state,
            errors: self.errors.clone(),
            warnings: self.warnings.clone(),
            start_time: self.start_time,
            end_time: self.end_time,
            current_stage_index: self.last_stage_index,
            total_stages: self.stages.len(),
            module_count: self.state.modules.len(),
            service_count: self.state.services.len(),
        }
    }
}
