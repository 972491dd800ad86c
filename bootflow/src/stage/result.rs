//! Stage action outputs and executed-stage results.

use crate::errors::StageError;
use crate::module::{ModuleHandle, Symbol};
use crate::service::ServiceInstance;
use std::collections::HashMap;

/// What a stage action hands back to the executor.
///
/// Produced collections are merged into the pipeline's accumulated state
/// when the stage succeeds.
#[derive(Debug, Clone, Default)]
pub struct ActionOutput {
    /// Whether the action considers the stage successful.
    pub success: bool,
    /// Modules loaded by this stage, keyed by name.
    pub modules: HashMap<String, ModuleHandle>,
    /// Services started by this stage, keyed by name.
    pub services: HashMap<String, ServiceInstance>,
    /// Symbols exported by this stage's modules.
    pub symbols: Vec<Symbol>,
    /// Named opaque tables established by this stage (e.g. descriptor or
    /// page tables probed by the environment stage).
    pub tables: Vec<String>,
    /// Failure description when `success` is false.
    pub error: Option<String>,
}

impl ActionOutput {
    /// Creates a successful output with nothing produced.
    #[must_use]
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    /// Creates a failed output with an error message.
    #[must_use]
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// Adds a produced module.
    #[must_use]
    pub fn with_module(mut self, handle: ModuleHandle) -> Self {
        self.modules.insert(handle.name.clone(), handle);
        self
    }

    /// Adds a produced service instance.
    #[must_use]
    pub fn with_service(mut self, instance: ServiceInstance) -> Self {
        self.services.insert(instance.name.clone(), instance);
        self
    }

    /// Adds an exported symbol.
    #[must_use]
    pub fn with_symbol(mut self, symbol: Symbol) -> Self {
        self.symbols.push(symbol);
        self
    }

    /// Adds a named opaque table.
    #[must_use]
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.tables.push(table.into());
        self
    }
}

/// The result of executing one stage, as reported by [`StageExecutor`].
///
/// Immutable once returned. On failure the error names the stage id; the
/// produced collections hold whatever the action managed before failing,
/// for diagnostics only (they are not merged).
///
/// [`StageExecutor`]: super::StageExecutor
#[derive(Debug, Clone)]
pub struct StageResult {
    /// The id of the executed stage.
    pub stage_id: String,
    /// Whether the stage succeeded.
    pub success: bool,
    /// Modules produced by the stage.
    pub modules: HashMap<String, ModuleHandle>,
    /// Services produced by the stage.
    pub services: HashMap<String, ServiceInstance>,
    /// Symbols produced by the stage.
    pub symbols: Vec<Symbol>,
    /// Opaque tables produced by the stage.
    pub tables: Vec<String>,
    /// The failure, when `success` is false.
    pub error: Option<StageError>,
    /// Wall-clock execution time of the stage action.
    pub duration_ms: f64,
}

impl StageResult {
    /// Returns true if the stage succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Builds a result from a finished action output.
    #[must_use]
    pub fn from_output(stage_id: &str, output: ActionOutput, duration_ms: f64) -> Self {
        let error = if output.success {
            None
        } else {
            Some(StageError::new(
                stage_id,
                output
                    .error
                    .clone()
                    .unwrap_or_else(|| "stage action reported failure".to_string()),
            ))
        };

        Self {
            stage_id: stage_id.to_string(),
            success: output.success,
            modules: output.modules,
            services: output.services,
            symbols: output.symbols,
            tables: output.tables,
            error,
            duration_ms,
        }
    }

    /// Builds a failed result from an error outside the action's control
    /// (e.g. a deadline).
    #[must_use]
    pub fn from_error(stage_id: &str, message: impl Into<String>, duration_ms: f64) -> Self {
        Self {
            stage_id: stage_id.to_string(),
            success: false,
            modules: HashMap::new(),
            services: HashMap::new(),
            symbols: Vec::new(),
            tables: Vec::new(),
            error: Some(StageError::new(stage_id, message)),
            duration_ms,
        }
    }
}
