//! Dependency tracker: maps resource ref -> producer node and producer
//! node -> sequence of produced resources. At cleanup registration, a
//! node's cleanup dependencies are the set of producer nodes of its
//! compile-time inputs.

use std::collections::{HashMap, HashSet};

use rg_core::NodeHandle;

#[derive(Debug, Default)]
pub struct DependencyTracker {
    /// node -> the producer nodes of its compile-time inputs.
    dependencies: HashMap<NodeHandle, HashSet<NodeHandle>>,
    /// node -> nodes that depend on it (reverse of `dependencies`).
    dependents: HashMap<NodeHandle, HashSet<NodeHandle>>,
}

impl DependencyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `node`'s cleanup dependencies: the producer nodes of its
    /// compile-time-required inputs (spec §4.10).
    pub fn register(&mut self, node: NodeHandle, depends_on: impl IntoIterator<Item = NodeHandle>) {
        let deps = self.dependencies.entry(node).or_default();
        for producer in depends_on {
            deps.insert(producer);
            self.dependents.entry(producer).or_default().insert(node);
        }
        self.dependents.entry(node).or_default();
    }

    pub fn dependencies_of(&self, node: NodeHandle) -> impl Iterator<Item = NodeHandle> + '_ {
        self.dependencies.get(&node).into_iter().flatten().copied()
    }

    pub fn dependents_of(&self, node: NodeHandle) -> impl Iterator<Item = NodeHandle> + '_ {
        self.dependents.get(&node).into_iter().flatten().copied()
    }
}
