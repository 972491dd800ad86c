//! Priority-seeded dependency ordering for module definitions.

use super::ModuleDefinition;
use crate::errors::{CycleError, DependencyError};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::debug;

/// Errors produced while resolving a module load order.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    /// A module names a dependency that is not defined.
    #[error(transparent)]
    Dependency(#[from] DependencyError),

    /// The dependency graph contains a cycle.
    #[error(transparent)]
    Cycle(#[from] CycleError),
}

/// Orders module definitions by priority, then dependency order.
///
/// The produced total order guarantees:
/// - every dependency precedes its dependents;
/// - among modules with no ordering constraint, lower `priority` loads first;
/// - ties at equal priority preserve input order (stable).
#[derive(Debug, Clone, Copy, Default)]
pub struct ModuleDependencyResolver;

impl ModuleDependencyResolver {
    /// Creates a new resolver.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Resolves a load order over the given definitions.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Dependency`] if any module names a
    /// dependency absent from the definition set, and
    /// [`ResolveError::Cycle`] if no valid placement exists. A module
    /// depending on itself is a cycle of length 1.
    pub fn resolve<'a>(
        &self,
        definitions: &'a [ModuleDefinition],
    ) -> Result<Vec<&'a ModuleDefinition>, ResolveError> {
        let known: HashSet<&str> = definitions.iter().map(|d| d.name.as_str()).collect();

        // Missing names are a definition error, not an ordering problem.
        for def in definitions {
            let mut deps: Vec<&String> = def.dependencies.iter().collect();
            deps.sort();
            for dep in deps {
                if !known.contains(dep.as_str()) {
                    return Err(DependencyError::new(&def.name, dep).into());
                }
            }
        }

        // Stable sort seeds the topological pass with priority order.
        let mut pending: Vec<&ModuleDefinition> = definitions.iter().collect();
        pending.sort_by_key(|d| d.priority);

        let mut placed: Vec<&ModuleDefinition> = Vec::with_capacity(pending.len());
        let mut placed_names: HashSet<&str> = HashSet::with_capacity(pending.len());

        // Each step places the lowest-priority module whose dependencies
        // are all placed. A module deferred behind a dependency rejoins
        // the candidates as soon as that dependency lands, so it never
        // falls behind unconstrained higher-priority modules.
        while !pending.is_empty() {
            let ready = pending.iter().position(|def| {
                def.dependencies
                    .iter()
                    .all(|dep| placed_names.contains(dep.as_str()))
            });

            match ready {
                Some(pos) => {
                    let def = pending.remove(pos);
                    placed_names.insert(def.name.as_str());
                    placed.push(def);
                }
                None => return Err(find_cycle(&pending).into()),
            }
        }

        debug!(
            order = ?placed.iter().map(|d| d.name.as_str()).collect::<Vec<_>>(),
            "resolved module load order"
        );
        Ok(placed)
    }
}

/// Extracts one cycle from a set of modules that cannot be placed.
///
/// Every module here has at least one dependency inside the set, so
/// following those edges must revisit a node.
fn find_cycle(stuck: &[&ModuleDefinition]) -> CycleError {
    let by_name: HashMap<&str, &ModuleDefinition> =
        stuck.iter().map(|d| (d.name.as_str(), *d)).collect();
    let stuck_names: HashSet<&str> = by_name.keys().copied().collect();

    let Some(mut current) = stuck.first().copied() else {
        return CycleError::new(Vec::new());
    };

    let mut path: Vec<String> = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();

    loop {
        if let Some(&pos) = seen.get(&current.name) {
            return CycleError::new(path[pos..].to_vec());
        }
        seen.insert(current.name.clone(), path.len());
        path.push(current.name.clone());

        let mut blocked: Vec<&String> = current
            .dependencies
            .iter()
            .filter(|dep| stuck_names.contains(dep.as_str()))
            .collect();
        blocked.sort();

        match blocked.first().and_then(|dep| by_name.get(dep.as_str())) {
            Some(next) => current = next,
            // Unreachable for genuinely stuck sets; bail with what we have.
            None => return CycleError::new(path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(order: &[&ModuleDefinition]) -> Vec<String> {
        order.iter().map(|d| d.name.clone()).collect()
    }

    fn position(order: &[&ModuleDefinition], name: &str) -> usize {
        order.iter().position(|d| d.name == name).unwrap()
    }

    #[test]
    fn test_dependencies_precede_dependents() {
        let defs = vec![
            ModuleDefinition::new("scheduler").with_dependency("timer"),
            ModuleDefinition::new("timer").with_dependency("interrupts"),
            ModuleDefinition::new("interrupts"),
        ];

        let order = ModuleDependencyResolver::new().resolve(&defs).unwrap();

        assert!(position(&order, "interrupts") < position(&order, "timer"));
        assert!(position(&order, "timer") < position(&order, "scheduler"));
    }

    #[test]
    fn test_priority_orders_unconstrained_modules() {
        let defs = vec![
            ModuleDefinition::new("late").with_priority(50),
            ModuleDefinition::new("early").with_priority(1),
            ModuleDefinition::new("middle").with_priority(10),
        ];

        let order = ModuleDependencyResolver::new().resolve(&defs).unwrap();
        assert_eq!(names(&order), vec!["early", "middle", "late"]);
    }

    #[test]
    fn test_equal_priority_preserves_input_order() {
        let defs = vec![
            ModuleDefinition::new("a").with_priority(5),
            ModuleDefinition::new("b").with_priority(5),
            ModuleDefinition::new("c").with_priority(5),
        ];

        let order = ModuleDependencyResolver::new().resolve(&defs).unwrap();
        assert_eq!(names(&order), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_dependency_beats_priority() {
        // "high" wants to load first by priority but depends on "low".
        let defs = vec![
            ModuleDefinition::new("high")
                .with_priority(0)
                .with_dependency("low"),
            ModuleDefinition::new("low").with_priority(100),
        ];

        let order = ModuleDependencyResolver::new().resolve(&defs).unwrap();
        assert_eq!(names(&order), vec!["low", "high"]);
    }

    #[test]
    fn test_deferred_module_rejoins_before_lower_priority_peers() {
        // "a" must wait for "c", but once "c" lands it still outranks
        // the unconstrained "b".
        let defs = vec![
            ModuleDefinition::new("a").with_priority(0).with_dependency("c"),
            ModuleDefinition::new("c").with_priority(1),
            ModuleDefinition::new("b").with_priority(2),
        ];

        let order = ModuleDependencyResolver::new().resolve(&defs).unwrap();
        assert_eq!(names(&order), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_missing_dependency() {
        let defs = vec![ModuleDefinition::new("fs").with_dependency("blockdev")];

        let err = ModuleDependencyResolver::new().resolve(&defs).unwrap_err();
        match err {
            ResolveError::Dependency(e) => {
                assert_eq!(e.module, "fs");
                assert_eq!(e.missing, "blockdev");
            }
            ResolveError::Cycle(_) => panic!("expected a dependency error"),
        }
    }

    #[test]
    fn test_self_dependency_is_length_one_cycle() {
        let defs = vec![ModuleDefinition::new("a").with_dependency("a")];

        let err = ModuleDependencyResolver::new().resolve(&defs).unwrap_err();
        match err {
            ResolveError::Cycle(e) => assert_eq!(e.cycle, vec!["a".to_string()]),
            ResolveError::Dependency(_) => panic!("expected a cycle error"),
        }
    }

    #[test]
    fn test_mutual_cycle_detected() {
        let defs = vec![
            ModuleDefinition::new("a").with_dependency("b"),
            ModuleDefinition::new("b").with_dependency("a"),
        ];

        let err = ModuleDependencyResolver::new().resolve(&defs).unwrap_err();
        match err {
            ResolveError::Cycle(e) => {
                assert_eq!(e.cycle.len(), 2);
                assert!(e.cycle.contains(&"a".to_string()));
                assert!(e.cycle.contains(&"b".to_string()));
            }
            ResolveError::Dependency(_) => panic!("expected a cycle error"),
        }
    }

    #[test]
    fn test_cycle_not_masked_by_valid_modules() {
        let defs = vec![
            ModuleDefinition::new("ok"),
            ModuleDefinition::new("x").with_dependency("y"),
            ModuleDefinition::new("y").with_dependency("x"),
        ];

        assert!(matches!(
            ModuleDependencyResolver::new().resolve(&defs),
            Err(ResolveError::Cycle(_))
        ));
    }

    #[test]
    fn test_empty_set_resolves_empty() {
        let order = ModuleDependencyResolver::new().resolve(&[]).unwrap();
        assert!(order.is_empty());
    }

    #[test]
    fn test_diamond_dependency_order() {
        let defs = vec![
            ModuleDefinition::new("top")
                .with_dependencies(["left", "right"]),
            ModuleDefinition::new("left").with_dependency("base"),
            ModuleDefinition::new("right").with_dependency("base"),
            ModuleDefinition::new("base"),
        ];

        let order = ModuleDependencyResolver::new().resolve(&defs).unwrap();

        assert!(position(&order, "base") < position(&order, "left"));
        assert!(position(&order, "base") < position(&order, "right"));
        assert!(position(&order, "left") < position(&order, "top"));
        assert!(position(&order, "right") < position(&order, "top"));
    }
}
