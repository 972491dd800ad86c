//! Symbol table with first-wins conflict semantics.

use crate::core::SymbolKind;
use crate::errors::SymbolConflictError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A named export owned by exactly one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    /// The globally resolvable name.
    pub name: String,
    /// The module that exported the symbol.
    pub owning_module: String,
    /// Whether the export is callable or data.
    pub kind: SymbolKind,
}

impl Symbol {
    /// Creates a new symbol.
    #[must_use]
    pub fn new(name: impl Into<String>, owning_module: impl Into<String>, kind: SymbolKind) -> Self {
        Self {
            name: name.into(),
            owning_module: owning_module.into(),
            kind,
        }
    }
}

/// Append-only symbol table for one boot run.
///
/// Registration order is preserved for deterministic reporting. A name
/// collision is rejected with [`SymbolConflictError`]; the first owner is
/// never shadowed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymbolTable {
    entries: HashMap<String, Symbol>,
    order: Vec<String>,
}

impl SymbolTable {
    /// Creates an empty symbol table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a symbol.
    ///
    /// # Errors
    ///
    /// Returns [`SymbolConflictError`] if the name is already owned by
    /// another module; the existing entry is retained.
    pub fn register(&mut self, symbol: Symbol) -> Result<(), SymbolConflictError> {
        if let Some(existing) = self.entries.get(&symbol.name) {
            return Err(SymbolConflictError::new(
                &symbol.name,
                &existing.owning_module,
                &symbol.owning_module,
            ));
        }
        self.order.push(symbol.name.clone());
        self.entries.insert(symbol.name.clone(), symbol);
        Ok(())
    }

    /// Registers a batch of symbols, failing fast on the first conflict.
    ///
    /// Symbols registered before the conflict remain in the table.
    pub fn register_all(
        &mut self,
        symbols: impl IntoIterator<Item = Symbol>,
    ) -> Result<(), SymbolConflictError> {
        for symbol in symbols {
            self.register(symbol)?;
        }
        Ok(())
    }

    /// Looks up a symbol by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.entries.get(name)
    }

    /// Returns true if a symbol with the given name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Returns the number of registered symbols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no symbols are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns symbol names in registration order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.order
    }

    /// Iterates symbols in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.order.iter().filter_map(|name| self.entries.get(name))
    }
}
