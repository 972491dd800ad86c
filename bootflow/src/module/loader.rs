//! Module loading against an already-loaded set and a symbol table.

use super::{ModuleDefinition, ModuleHandle, Symbol, SymbolTable};
use crate::errors::{BootflowError, SymbolConflictError, UnsatisfiedDependencyError};
use crate::utils::now_utc;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Instantiates modules from definitions, enforcing load preconditions.
///
/// A load fails with [`UnsatisfiedDependencyError`] if any declared
/// dependency is absent from the already-loaded set, and with
/// [`SymbolConflictError`] if an export collides with a registered symbol.
/// Batch loading is fail-fast: a failure aborts the remaining loads, but
/// earlier successes stay loaded for diagnostics.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModuleLoader;

impl ModuleLoader {
    /// Creates a new loader.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Loads one module from its definition.
    ///
    /// Runs the definition's initialization action to completion, then
    /// registers its exports. On success the returned handle is
    /// `initialized` and its exports are in `symbols`.
    ///
    /// # Errors
    ///
    /// - [`BootflowError::UnsatisfiedDependency`] if a dependency is not in
    ///   `already_loaded`; the loaded set and symbol table are untouched.
    /// - [`BootflowError::SymbolConflict`] if an export name is taken; no
    ///   export of this module is registered.
    /// - [`BootflowError::Internal`] if the initialization action fails.
    pub async fn load(
        &self,
        definition: &ModuleDefinition,
        already_loaded: &HashMap<String, ModuleHandle>,
        symbols: &mut SymbolTable,
    ) -> Result<ModuleHandle, BootflowError> {
        let mut deps: Vec<&String> = definition.dependencies.iter().collect();
        deps.sort();
        for dep in deps {
            if !already_loaded.contains_key(dep.as_str()) {
                warn!(module = %definition.name, dependency = %dep, "load precondition violated");
                return Err(UnsatisfiedDependencyError::new(&definition.name, dep).into());
            }
        }

        // Reject the whole export set before touching the table, so a
        // conflicting module leaves no partial registrations behind. Covers
        // duplicates within the module's own export list too.
        let mut seen = std::collections::HashSet::new();
        for export in &definition.exports {
            if let Some(existing) = symbols.get(&export.name) {
                return Err(SymbolConflictError::new(
                    &export.name,
                    &existing.owning_module,
                    &definition.name,
                )
                .into());
            }
            if !seen.insert(export.name.as_str()) {
                return Err(SymbolConflictError::new(
                    &export.name,
                    &definition.name,
                    &definition.name,
                )
                .into());
            }
        }

        let state = definition.init.initialize().await.map_err(|cause| {
            BootflowError::Internal(format!(
                "module '{}' initialization failed: {cause}",
                definition.name
            ))
        })?;

        symbols.register_all(
            definition
                .exports
                .iter()
                .map(|e| Symbol::new(&e.name, &definition.name, e.kind)),
        )?;

        debug!(module = %definition.name, exports = definition.exports.len(), "module loaded");

        Ok(ModuleHandle {
            name: definition.name.clone(),
            state,
            initialized: true,
            dependencies: definition.dependencies.clone(),
            loaded_at: now_utc(),
        })
    }

    /// Loads a resolved sequence of modules, fail-fast.
    ///
    /// Each loaded handle is inserted into `loaded` before the next load
    /// begins, so on error the map holds exactly the modules that made it.
    ///
    /// # Errors
    ///
    /// Propagates the first load failure; `loaded` and `symbols` retain
    /// everything loaded before the failing module.
    pub async fn load_sequence(
        &self,
        ordered: &[&ModuleDefinition],
        loaded: &mut HashMap<String, ModuleHandle>,
        symbols: &mut SymbolTable,
    ) -> Result<(), BootflowError> {
        for definition in ordered {
            let handle = self.load(definition, loaded, symbols).await?;
            loaded.insert(handle.name.clone(), handle);
        }
        Ok(())
    }
}
