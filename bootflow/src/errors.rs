//! Error types for the bootflow orchestration core.
//!
//! Module loading errors are fail-fast at stage granularity, while service
//! startup errors are isolated per-service; the types here carry enough
//! structure for callers to tell those regimes apart.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// The main error type for bootflow operations.
#[derive(Debug, Error)]
pub enum BootflowError {
    /// A module named a dependency that does not exist.
    #[error("{0}")]
    Dependency(#[from] DependencyError),

    /// The module dependency graph contains a cycle.
    #[error("{0}")]
    Cycle(#[from] CycleError),

    /// A module load was attempted before its dependencies were loaded.
    #[error("{0}")]
    UnsatisfiedDependency(#[from] UnsatisfiedDependencyError),

    /// Two modules exported the same symbol name.
    #[error("{0}")]
    SymbolConflict(#[from] SymbolConflictError),

    /// A boot stage reported failure.
    #[error("{0}")]
    Stage(#[from] StageError),

    /// A service was requested at a runlevel it does not support.
    #[error("{0}")]
    RunlevelMismatch(#[from] RunlevelMismatchError),

    /// The pipeline was driven from an invalid state.
    #[error("Invalid pipeline state: {0}")]
    InvalidState(String),

    /// A generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Structured diagnostic metadata attached to orchestration errors.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DiagnosticInfo {
    /// Stable error code (e.g., "BOOT-002-CYCLE").
    pub code: String,
    /// Short summary of the error.
    pub summary: String,
    /// Hint for fixing the error.
    pub fix_hint: Option<String>,
    /// Additional context key-value pairs.
    #[serde(default)]
    pub context: HashMap<String, String>,
}

impl DiagnosticInfo {
    /// Creates a new diagnostic info.
    #[must_use]
    pub fn new(code: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            summary: summary.into(),
            fix_hint: None,
            context: HashMap::new(),
        }
    }

    /// Sets the fix hint.
    #[must_use]
    pub fn with_fix_hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = Some(hint.into());
        self
    }

    /// Adds a single context entry.
    #[must_use]
    pub fn with_context_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

/// Error raised when a module names a dependency absent from the definition set.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("Module '{module}' depends on '{missing}', which is not defined")]
pub struct DependencyError {
    /// The module whose dependency list is broken.
    pub module: String,
    /// The dependency name that could not be found.
    pub missing: String,
}

impl DependencyError {
    /// Creates a new dependency error.
    #[must_use]
    pub fn new(module: impl Into<String>, missing: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            missing: missing.into(),
        }
    }

    /// Diagnostic metadata for this error.
    #[must_use]
    pub fn diagnostic(&self) -> DiagnosticInfo {
        DiagnosticInfo::new(
            "BOOT-001-MISSING_DEP",
            format!("Module '{}' requires undefined module '{}'", self.module, self.missing),
        )
        .with_fix_hint("Add the missing module definition or remove the dependency.")
        .with_context_entry("module", &self.module)
        .with_context_entry("missing", &self.missing)
    }
}

/// Error raised when the module dependency graph contains a cycle.
///
/// A module depending on itself is a cycle of length 1.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("Dependency cycle among modules: {}", cycle.join(" -> "))]
pub struct CycleError {
    /// The module names forming the cycle, in dependency order.
    pub cycle: Vec<String>,
}

impl CycleError {
    /// Creates a new cycle error.
    #[must_use]
    pub fn new(cycle: Vec<String>) -> Self {
        Self { cycle }
    }

    /// Diagnostic metadata for this error.
    #[must_use]
    pub fn diagnostic(&self) -> DiagnosticInfo {
        DiagnosticInfo::new(
            "BOOT-002-CYCLE",
            format!("Module graph contains a dependency cycle: {}", self.cycle.join(" -> ")),
        )
        .with_fix_hint("Remove one of the dependencies in the cycle to break it.")
    }
}

/// Error raised when a load is attempted before a dependency has been loaded.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("Cannot load module '{module}': dependency '{dependency}' is not loaded")]
pub struct UnsatisfiedDependencyError {
    /// The module that failed to load.
    pub module: String,
    /// The dependency that is not yet loaded.
    pub dependency: String,
}

impl UnsatisfiedDependencyError {
    /// Creates a new unsatisfied dependency error.
    #[must_use]
    pub fn new(module: impl Into<String>, dependency: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            dependency: dependency.into(),
        }
    }
}

/// Error raised when two modules export the same symbol name.
///
/// The symbol table keeps the first registration; the conflicting
/// registration is rejected rather than shadowing it.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("Symbol '{symbol}' exported by '{attempted_owner}' is already owned by '{existing_owner}'")]
pub struct SymbolConflictError {
    /// The conflicting symbol name.
    pub symbol: String,
    /// The module that already owns the symbol.
    pub existing_owner: String,
    /// The module whose registration was rejected.
    pub attempted_owner: String,
}

impl SymbolConflictError {
    /// Creates a new symbol conflict error.
    #[must_use]
    pub fn new(
        symbol: impl Into<String>,
        existing_owner: impl Into<String>,
        attempted_owner: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            existing_owner: existing_owner.into(),
            attempted_owner: attempted_owner.into(),
        }
    }
}

/// Error describing a failed boot stage, wrapping the underlying cause.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("Stage '{stage_id}' failed: {message}")]
pub struct StageError {
    /// The id of the failing stage.
    pub stage_id: String,
    /// Human-readable description of the underlying cause.
    pub message: String,
}

impl StageError {
    /// Creates a new stage error.
    #[must_use]
    pub fn new(stage_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            stage_id: stage_id.into(),
            message: message.into(),
        }
    }
}

/// Error raised when a service is asked to start at an unsupported runlevel.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("Service '{service}' does not support runlevel {runlevel}")]
pub struct RunlevelMismatchError {
    /// The service name.
    pub service: String,
    /// The runlevel that was requested.
    pub runlevel: u32,
}

impl RunlevelMismatchError {
    /// Creates a new runlevel mismatch error.
    #[must_use]
    pub fn new(service: impl Into<String>, runlevel: u32) -> Self {
        Self {
            service: service.into(),
            runlevel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependency_error_display() {
        let err = DependencyError::new("scheduler", "timer");
        assert!(err.to_string().contains("scheduler"));
        assert!(err.to_string().contains("timer"));
        assert_eq!(err.diagnostic().code, "BOOT-001-MISSING_DEP");
    }

    #[test]
    fn test_cycle_error_display() {
        let err = CycleError::new(vec!["a".to_string(), "b".to_string()]);
        assert!(err.to_string().contains("a -> b"));
        assert_eq!(err.diagnostic().code, "BOOT-002-CYCLE");
    }

    #[test]
    fn test_self_cycle_display() {
        let err = CycleError::new(vec!["a".to_string()]);
        assert_eq!(err.cycle.len(), 1);
        assert!(err.to_string().contains('a'));
    }

    #[test]
    fn test_symbol_conflict_names_both_owners() {
        let err = SymbolConflictError::new("kmalloc", "memory", "slab");
        let msg = err.to_string();
        assert!(msg.contains("memory"));
        assert!(msg.contains("slab"));
    }

    #[test]
    fn test_bootflow_error_from_stage_error() {
        let err: BootflowError = StageError::new("init", "action reported failure").into();
        assert!(err.to_string().contains("init"));
    }

    #[test]
    fn test_diagnostic_info_builder() {
        let info = DiagnosticInfo::new("BOOT-XXX", "summary")
            .with_fix_hint("hint")
            .with_context_entry("stage", "probe");

        assert_eq!(info.fix_hint.as_deref(), Some("hint"));
        assert_eq!(info.context.get("stage"), Some(&"probe".to_string()));
    }
}
