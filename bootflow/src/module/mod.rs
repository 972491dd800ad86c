//! Module definitions, dependency resolution, and loading.
//!
//! Modules are named units of capability loaded once per boot run. Their
//! declared dependencies drive load order, and their exports populate the
//! run's symbol table.

mod definition;
mod loader;
mod resolver;
mod symbols;

pub use definition::{Export, ModuleDefinition, ModuleHandle, ModuleInit, NoOpInit};
pub use loader::ModuleLoader;
pub use resolver::{ModuleDependencyResolver, ResolveError};
pub use symbols::{Symbol, SymbolTable};
