//! Accumulated per-run boot state.

use crate::errors::SymbolConflictError;
use crate::module::{ModuleHandle, SymbolTable};
use crate::service::ServiceInstance;
use crate::stage::StageResult;
use std::collections::{HashMap, HashSet};

/// State threaded between stages of one boot run.
///
/// Owned exclusively by the pipeline run that created it; stage actions
/// see clones and contribute deltas through their results. A reboot
/// replaces the whole value rather than clearing it in place.
#[derive(Debug, Clone, Default)]
pub struct BootState {
    /// Loaded modules keyed by name.
    pub modules: HashMap<String, ModuleHandle>,
    /// Started services keyed by name.
    pub services: HashMap<String, ServiceInstance>,
    /// The run's symbol table.
    pub symbols: SymbolTable,
    /// Named opaque tables established during boot.
    pub tables: HashSet<String>,
}

impl BootState {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges a successful stage's produced collections into this state.
    ///
    /// # Errors
    ///
    /// Returns [`SymbolConflictError`] if a produced symbol collides with
    /// one registered by an earlier stage; the first owner is retained.
    pub fn merge(&mut self, result: &StageResult) -> Result<(), SymbolConflictError> {
        self.symbols.register_all(result.symbols.iter().cloned())?;
        self.modules
            .extend(result.modules.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.services
            .extend(result.services.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.tables.extend(result.tables.iter().cloned());
        Ok(())
    }

    /// Loaded module names, sorted.
    #[must_use]
    pub fn module_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.modules.keys().cloned().collect();
        names.sort();
        names
    }

    /// Started service names, sorted.
    #[must_use]
    pub fn service_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.services.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SymbolKind;
    use crate::module::Symbol;
    use crate::stage::ActionOutput;
    use crate::utils::now_utc;
    use pretty_assertions::assert_eq;

    fn handle(name: &str) -> ModuleHandle {
        ModuleHandle {
            name: name.to_string(),
            state: serde_json::Value::Null,
            initialized: true,
            dependencies: HashSet::new(),
            loaded_at: now_utc(),
        }
    }

    fn result_with(output: ActionOutput) -> StageResult {
        StageResult::from_output("test", output, 0.0)
    }

    #[test]
    fn test_merge_accumulates() {
        let mut state = BootState::new();
        let result = result_with(
            ActionOutput::ok()
                .with_module(handle("memory"))
                .with_symbol(Symbol::new("kmalloc", "memory", SymbolKind::Function))
                .with_table("page_table"),
        );

        state.merge(&result).unwrap();

        assert!(state.modules.contains_key("memory"));
        assert!(state.symbols.contains("kmalloc"));
        assert!(state.tables.contains("page_table"));
    }

    #[test]
    fn test_merge_symbol_conflict_across_stages() {
        let mut state = BootState::new();
        state
            .merge(&result_with(
                ActionOutput::ok().with_symbol(Symbol::new("irq", "interrupts", SymbolKind::Function)),
            ))
            .unwrap();

        let err = state
            .merge(&result_with(
                ActionOutput::ok().with_symbol(Symbol::new("irq", "timer", SymbolKind::Function)),
            ))
            .unwrap_err();

        assert_eq!(err.existing_owner, "interrupts");
        assert_eq!(state.symbols.get("irq").unwrap().owning_module, "interrupts");
    }

    #[test]
    fn test_sorted_name_listings() {
        let mut state = BootState::new();
        state.modules.insert("b".to_string(), handle("b"));
        state.modules.insert("a".to_string(), handle("a"));

        assert_eq!(state.module_names(), vec!["a", "b"]);
    }
}
