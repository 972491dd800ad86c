//! Post-stage integrity classification.
//!
//! The checker is a pure function over required-vs-present facts: it never
//! raises, never mutates state, and produces identical classifications for
//! identical input.

use crate::core::ServiceStatus;
use crate::pipeline::BootState;
use serde::{Deserialize, Serialize};

/// How hard a requirement is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Absence is an issue; the verdict cannot be healthy.
    Required,
    /// Absence is only a warning.
    Advisory,
}

/// One named requirement with a severity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    /// The item name to look for.
    pub name: String,
    /// Whether absence is an issue or a warning.
    pub severity: Severity,
}

impl Requirement {
    /// A hard requirement.
    #[must_use]
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            severity: Severity::Required,
        }
    }

    /// A soft, advisory requirement.
    #[must_use]
    pub fn advisory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            severity: Severity::Advisory,
        }
    }
}

/// The full set of requirements for one verification call.
///
/// Requirements are checked in the order given, category by category, so
/// report ordering is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityRequirements {
    /// Named opaque tables that must exist.
    pub tables: Vec<Requirement>,
    /// Modules that must be loaded.
    pub modules: Vec<Requirement>,
    /// Symbols that must be registered.
    pub symbols: Vec<Requirement>,
    /// Services that must have started and not failed.
    pub services: Vec<Requirement>,
}

impl IntegrityRequirements {
    /// Creates an empty requirement set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table requirement.
    #[must_use]
    pub fn table(mut self, requirement: Requirement) -> Self {
        self.tables.push(requirement);
        self
    }

    /// Adds a module requirement.
    #[must_use]
    pub fn module(mut self, requirement: Requirement) -> Self {
        self.modules.push(requirement);
        self
    }

    /// Adds a symbol requirement.
    #[must_use]
    pub fn symbol(mut self, requirement: Requirement) -> Self {
        self.symbols.push(requirement);
        self
    }

    /// Adds a service requirement.
    #[must_use]
    pub fn service(mut self, requirement: Requirement) -> Self {
        self.services.push(requirement);
        self
    }

    /// Returns true if no requirements are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
            && self.modules.is_empty()
            && self.symbols.is_empty()
            && self.services.is_empty()
    }
}

/// A point-in-time classification of required-vs-present system facts.
///
/// Recomputed fresh on every verification call, never updated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityReport {
    /// True when no issues were found.
    pub healthy: bool,
    /// Requirements that were satisfied, in check order.
    pub checks: Vec<String>,
    /// Hard requirements that were not satisfied.
    pub issues: Vec<String>,
    /// Advisory requirements that were not satisfied.
    pub warnings: Vec<String>,
    /// When the verification ran (ISO 8601).
    pub timestamp: String,
}

impl IntegrityReport {
    /// Returns true if this report classifies the same facts the same way
    /// as another, ignoring the verification timestamp.
    #[must_use]
    pub fn same_classification(&self, other: &Self) -> bool {
        self.healthy == other.healthy
            && self.checks == other.checks
            && self.issues == other.issues
            && self.warnings == other.warnings
    }
}

/// Classifies the current boot state against a requirement set.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegrityChecker;

impl IntegrityChecker {
    /// Creates a new checker.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Verifies the state against the requirements.
    ///
    /// Purely a classification: no side effects, no mutation, and
    /// repeated calls over unchanged input classify identically.
    /// `healthy` is true exactly when `issues` is empty.
    #[must_use]
    pub fn verify(&self, requirements: &IntegrityRequirements, state: &BootState) -> IntegrityReport {
        let mut report = IntegrityReport {
            healthy: true,
            checks: Vec::new(),
            issues: Vec::new(),
            warnings: Vec::new(),
            timestamp: crate::utils::iso_timestamp(),
        };

        for req in &requirements.tables {
            let present = state.tables.contains(&req.name);
            classify(&mut report, "table", req, present);
        }
        for req in &requirements.modules {
            let present = state
                .modules
                .get(&req.name)
                .is_some_and(|m| m.initialized);
            classify(&mut report, "module", req, present);
        }
        for req in &requirements.symbols {
            let present = state.symbols.contains(&req.name);
            classify(&mut report, "symbol", req, present);
        }
        for req in &requirements.services {
            let present = state
                .services
                .get(&req.name)
                .is_some_and(|s| s.status != ServiceStatus::Failed);
            classify(&mut report, "service", req, present);
        }

        report.healthy = report.issues.is_empty();
        report
    }
}

fn classify(report: &mut IntegrityReport, category: &str, req: &Requirement, present: bool) {
    if present {
        report.checks.push(format!("{category} '{}' present", req.name));
    } else {
        match req.severity {
            Severity::Required => {
                report.issues.push(format!("{category} '{}' missing", req.name));
            }
            Severity::Advisory => report
                .warnings
                .push(format!("{category} '{}' missing (advisory)", req.name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SymbolKind;
    use crate::module::{ModuleHandle, Symbol};
    use crate::utils::now_utc;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    fn state_with_module(name: &str) -> BootState {
        let mut state = BootState::new();
        state.modules.insert(
            name.to_string(),
            ModuleHandle {
                name: name.to_string(),
                state: serde_json::Value::Null,
                initialized: true,
                dependencies: HashSet::new(),
                loaded_at: now_utc(),
            },
        );
        state
    }

    #[test]
    fn test_present_requirement_is_a_check() {
        let state = state_with_module("memory");
        let reqs = IntegrityRequirements::new().module(Requirement::required("memory"));

        let report = IntegrityChecker::new().verify(&reqs, &state);

        assert!(report.healthy);
        assert_eq!(report.checks, vec!["module 'memory' present".to_string()]);
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_missing_required_is_an_issue() {
        let reqs = IntegrityRequirements::new().module(Requirement::required("memory"));

        let report = IntegrityChecker::new().verify(&reqs, &BootState::new());

        assert!(!report.healthy);
        assert_eq!(report.issues, vec!["module 'memory' missing".to_string()]);
    }

    #[test]
    fn test_missing_advisory_is_a_warning() {
        let reqs = IntegrityRequirements::new().module(Requirement::advisory("sound"));

        let report = IntegrityChecker::new().verify(&reqs, &BootState::new());

        assert!(report.healthy);
        assert!(report.issues.is_empty());
        assert_eq!(
            report.warnings,
            vec!["module 'sound' missing (advisory)".to_string()]
        );
    }

    #[test]
    fn test_symbol_and_table_classification() {
        let mut state = BootState::new();
        state.tables.insert("gdt".to_string());
        state
            .symbols
            .register(Symbol::new("kmalloc", "memory", SymbolKind::Function))
            .unwrap();

        let reqs = IntegrityRequirements::new()
            .table(Requirement::required("gdt"))
            .table(Requirement::required("idt"))
            .symbol(Requirement::required("kmalloc"));

        let report = IntegrityChecker::new().verify(&reqs, &state);

        assert_eq!(report.checks.len(), 2);
        assert_eq!(report.issues, vec!["table 'idt' missing".to_string()]);
    }

    #[test]
    fn test_verify_is_idempotent() {
        let state = state_with_module("memory");
        let reqs = IntegrityRequirements::new()
            .module(Requirement::required("memory"))
            .module(Requirement::advisory("sound"))
            .table(Requirement::required("gdt"));

        let checker = IntegrityChecker::new();
        let first = checker.verify(&reqs, &state);
        let second = checker.verify(&reqs, &state);

        assert!(first.same_classification(&second));
        assert_eq!(first.checks, second.checks);
        assert_eq!(first.issues, second.issues);
        assert_eq!(first.warnings, second.warnings);
        assert_eq!(first.healthy, second.healthy);
    }

    #[test]
    fn test_verify_does_not_mutate_state() {
        let state = state_with_module("memory");
        let before_modules = state.modules.len();
        let reqs = IntegrityRequirements::new().module(Requirement::required("other"));

        let _ = IntegrityChecker::new().verify(&reqs, &state);

        assert_eq!(state.modules.len(), before_modules);
    }

    #[test]
    fn test_empty_requirements_is_healthy() {
        let report = IntegrityChecker::new().verify(&IntegrityRequirements::new(), &BootState::new());
        assert!(report.healthy);
        assert!(report.checks.is_empty());
    }
}
