//! Dependency resolution
//!
//! A dependency resolves when a component of that name is registered.
//! Cycles (including self-dependencies) are allowed; `find_cycle` only
//! reports them.

use std::collections::HashSet;

use crate::storage::RegistryStore;

/// Names in `dependencies` that are not registered, in declaration order
pub fn unresolved(store: &RegistryStore, dependencies: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    dependencies
        .iter()
        .filter(|dep| !store.contains(dep))
        .filter(|dep| seen.insert(dep.as_str()))
        .cloned()
        .collect()
}

/// First dependency cycle reachable from `start`, as a closed path
/// (`["a", "b", "a"]`). Unregistered names are treated as leaves.
pub fn find_cycle(store: &RegistryStore, start: &str) -> Option<Vec<String>> {
    let mut visiting = Vec::new();
    let mut visited = HashSet::new();
    walk(store, start, &mut visiting, &mut visited)
}

fn walk<'a>(
    store: &'a RegistryStore,
    node: &'a str,
    visiting: &mut Vec<&'a str>,
    visited: &mut HashSet<&'a str>,
) -> Option<Vec<String>> {
    if let Some(pos) = visiting.iter().position(|n| *n == node) {
        let mut cycle: Vec<String> = visiting[pos..].iter().map(|n| n.to_string()).collect();
        cycle.push(node.to_string());
        return Some(cycle);
    }
    if visited.contains(node) {
        return None;
    }

    visiting.push(node);
    for dep in store.dependencies_of(node).unwrap_or_default() {
        if let Some(cycle) = walk(store, dep, visiting, visited) {
            return Some(cycle);
        }
    }
    visiting.pop();
    visited.insert(node);
    None
}
