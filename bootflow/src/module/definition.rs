//! Module definitions, handles, and the initialization seam.

use crate::core::SymbolKind;
use crate::utils::Timestamp;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// A declared export of a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Export {
    /// The symbol name to register.
    pub name: String,
    /// The kind of export.
    pub kind: SymbolKind,
}

impl Export {
    /// Declares a function export.
    #[must_use]
    pub fn function(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: SymbolKind::Function,
        }
    }

    /// Declares a value export.
    #[must_use]
    pub fn value(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: SymbolKind::Value,
        }
    }
}

/// Trait for module initialization actions.
///
/// Initialization is an external collaborator: it may block or suspend
/// (simulated hardware delay, real I/O) and produces the module's opaque
/// state payload. The loader awaits it to completion before touching the
/// next module.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModuleInit: Send + Sync {
    /// Runs the initialization action, producing the module state.
    async fn initialize(&self) -> anyhow::Result<serde_json::Value>;
}

/// An initialization action that produces a null state.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpInit;

#[async_trait]
impl ModuleInit for NoOpInit {
    async fn initialize(&self) -> anyhow::Result<serde_json::Value> {
        Ok(serde_json::Value::Null)
    }
}

/// Static description of a loadable module.
///
/// Priority breaks ties where dependency order alone is ambiguous; a lower
/// value loads earlier.
#[derive(Clone)]
pub struct ModuleDefinition {
    /// The unique module name.
    pub name: String,
    /// Load priority; lower loads earlier among unconstrained modules.
    pub priority: i32,
    /// Names of modules that must be loaded first.
    pub dependencies: HashSet<String>,
    /// Symbols this module exports on load.
    pub exports: Vec<Export>,
    /// The initialization action run at load time.
    pub init: Arc<dyn ModuleInit>,
}

impl ModuleDefinition {
    /// Creates a new module definition with default priority and no-op init.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            priority: 0,
            dependencies: HashSet::new(),
            exports: Vec::new(),
            init: Arc::new(NoOpInit),
        }
    }

    /// Sets the load priority.
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Adds a dependency on another module.
    #[must_use]
    pub fn with_dependency(mut self, dep: impl Into<String>) -> Self {
        self.dependencies.insert(dep.into());
        self
    }

    /// Sets the dependencies.
    #[must_use]
    pub fn with_dependencies(mut self, deps: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.dependencies = deps.into_iter().map(Into::into).collect();
        self
    }

    /// Adds an export declaration.
    #[must_use]
    pub fn with_export(mut self, export: Export) -> Self {
        self.exports.push(export);
        self
    }

    /// Sets the initialization action.
    #[must_use]
    pub fn with_init(mut self, init: Arc<dyn ModuleInit>) -> Self {
        self.init = init;
        self
    }
}

impl fmt::Debug for ModuleDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleDefinition")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("dependencies", &self.dependencies)
            .field("exports", &self.exports)
            .finish_non_exhaustive()
    }
}

/// A loaded module, owned exclusively by the boot run that created it.
///
/// Exists in the loaded set only if every dependency was already loaded at
/// creation time; discarded wholesale on reboot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleHandle {
    /// The module name.
    pub name: String,
    /// Opaque state produced by the initialization action.
    pub state: serde_json::Value,
    /// Whether initialization completed.
    pub initialized: bool,
    /// The dependencies the module was loaded against.
    pub dependencies: HashSet<String>,
    /// When the module was loaded.
    pub loaded_at: Timestamp,
}
