//! Cleanup stack (spec §4.10): correct teardown ordering consistent with
//! data-flow dependencies, with partial cleanup by node, tag, type, or
//! root.

use std::collections::{HashMap, HashSet};

use rg_core::NodeHandle;

use crate::tracker::DependencyTracker;

#[derive(Debug, Default)]
pub struct CleanupStack {
    tracker: DependencyTracker,
    /// Execution order (topological); used only to derive the
    /// reverse-topological teardown order, never mutated after
    /// construction (spec: "Cleanup never reorders across a compile
    /// barrier").
    order: Vec<NodeHandle>,
    position: HashMap<NodeHandle, usize>,
    names: HashMap<NodeHandle, String>,
    tags: HashMap<NodeHandle, HashSet<String>>,
    types: HashMap<NodeHandle, String>,
    cleaned: HashSet<NodeHandle>,
}

impl CleanupStack {
    pub fn new(order: Vec<NodeHandle>) -> Self {
        let position = order.iter().enumerate().map(|(i, &h)| (h, i)).collect();
        CleanupStack {
            tracker: DependencyTracker::new(),
            order,
            position,
            names: HashMap::new(),
            tags: HashMap::new(),
            types: HashMap::new(),
            cleaned: HashSet::new(),
        }
    }

    pub fn register_node(
        &mut self,
        node: NodeHandle,
        name: impl Into<String>,
        type_name: impl Into<String>,
        tags: impl IntoIterator<Item = String>,
        depends_on: impl IntoIterator<Item = NodeHandle>,
    ) {
        self.names.insert(node, name.into());
        self.types.insert(node, type_name.into());
        self.tags.insert(node, tags.into_iter().collect());
        self.tracker.register(node, depends_on);
    }

    pub fn is_cleaned(&self, node: NodeHandle) -> bool {
        self.cleaned.contains(&node)
    }

    fn remaining_dependents(&self, node: NodeHandle) -> usize {
        self.tracker
            .dependents_of(node)
            .filter(|d| !self.cleaned.contains(d))
            .count()
    }

    /// Collect the set `cleanup_subgraph(root)` would clean without
    /// mutating state, for [`Self::get_cleanup_scope`] and for internal
    /// reuse by [`Self::cleanup_subgraph`].
    fn simulate_subgraph(&self, root: NodeHandle) -> HashSet<NodeHandle> {
        let mut visited: HashSet<NodeHandle> = HashSet::new();
        let mut already_cleaned = self.cleaned.clone();
        let mut queue = vec![root];
        while let Some(node) = queue.pop() {
            if already_cleaned.contains(&node) || visited.contains(&node) {
                continue;
            }
            visited.insert(node);
            already_cleaned.insert(node);
            for producer in self.tracker.dependencies_of(node) {
                if already_cleaned.contains(&producer) || visited.contains(&producer) {
                    continue;
                }
                let remaining = self
                    .tracker
                    .dependents_of(producer)
                    .filter(|d| !already_cleaned.contains(d))
                    .count();
                if remaining == 0 {
                    queue.push(producer);
                }
            }
        }
        visited
    }

    /// Sort a cleanup batch into reverse-topological order (spec: "Cleanup
    /// order is the reverse of a topological order restricted to live
    /// nodes"). Nodes absent from `order` (shouldn't happen in practice)
    /// sort last.
    fn reverse_topological(&self, mut nodes: Vec<NodeHandle>) -> Vec<NodeHandle> {
        nodes.sort_by_key(|n| std::cmp::Reverse(self.position.get(n).copied().unwrap_or(usize::MAX)));
        nodes
    }

    /// "clean root and any producer whose remaining dependent count (after
    /// removing root) falls to zero; recursive upward" (spec §4.10).
    pub fn cleanup_subgraph(&mut self, root: NodeHandle) -> Vec<NodeHandle> {
        let to_clean = self.simulate_subgraph(root);
        for &n in &to_clean {
            self.cleaned.insert(n);
        }
        self.reverse_topological(to_clean.into_iter().collect())
    }

    /// Dry-run: "reports what `cleanup_subgraph(root)` would clean without
    /// side effects."
    pub fn get_cleanup_scope(&self, root: NodeHandle) -> Vec<String> {
        let set = self.simulate_subgraph(root);
        self.reverse_topological(set.into_iter().collect())
            .into_iter()
            .map(|n| self.names.get(&n).cloned().unwrap_or_else(|| n.to_string()))
            .collect()
    }

    /// "clean every node whose tag set contains the tag (and its newly
    /// orphaned producers)." Equivalent to repeatedly calling
    /// `cleanup_subgraph` on every node with the tag (spec §8).
    pub fn cleanup_by_tag(&mut self, tag: &str) -> Vec<NodeHandle> {
        let roots: Vec<NodeHandle> = self
            .tags
            .iter()
            .filter(|(_, tags)| tags.contains(tag))
            .map(|(&n, _)| n)
            .collect();
        self.cleanup_many(roots)
    }

    pub fn cleanup_by_type(&mut self, type_name: &str) -> Vec<NodeHandle> {
        let roots: Vec<NodeHandle> = self
            .types
            .iter()
            .filter(|(_, t)| t.as_str() == type_name)
            .map(|(&n, _)| n)
            .collect();
        self.cleanup_many(roots)
    }

    fn cleanup_many(&mut self, roots: Vec<NodeHandle>) -> Vec<NodeHandle> {
        let mut cleaned_now: HashSet<NodeHandle> = HashSet::new();
        for root in roots {
            if self.cleaned.contains(&root) {
                continue;
            }
            for n in self.cleanup_subgraph(root) {
                cleaned_now.insert(n);
            }
        }
        self.reverse_topological(cleaned_now.into_iter().collect())
    }

    /// Full teardown: reverse topological order over every live (not yet
    /// cleaned) node.
    pub fn cleanup_all(&mut self) -> Vec<NodeHandle> {
        let live: Vec<NodeHandle> = self
            .order
            .iter()
            .copied()
            .filter(|n| !self.cleaned.contains(n))
            .collect();
        for &n in &live {
            self.cleaned.insert(n);
        }
        self.reverse_topological(live)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(i: usize) -> NodeHandle {
        NodeHandle::from_index(i)
    }

    fn linear_stack() -> CleanupStack {
        // A -> B -> C (B depends on A, C depends on B)
        let mut stack = CleanupStack::new(vec![h(0), h(1), h(2)]);
        stack.register_node(h(0), "A", "Producer", vec![], vec![]);
        stack.register_node(h(1), "B", "Middle", vec![], vec![h(0)]);
        stack.register_node(h(2), "C", "Consumer", vec![], vec![h(1)]);
        stack
    }

    #[test]
    fn cleanup_all_is_reverse_topological() {
        let mut stack = linear_stack();
        assert_eq!(stack.cleanup_all(), vec![h(2), h(1), h(0)]);
    }

    #[test]
    fn cleanup_subgraph_orphans_its_sole_producer() {
        let mut stack = linear_stack();
        let cleaned = stack.cleanup_subgraph(h(2));
        // C has no other dependents of B, B has no other dependents of A.
        assert_eq!(cleaned, vec![h(2), h(1), h(0)]);
    }

    #[test]
    fn shared_producer_is_not_cleaned_until_all_dependents_are() {
        let mut stack = CleanupStack::new(vec![h(0), h(1), h(2)]);
        // A produces something used by both B and C.
        stack.register_node(h(0), "A", "Producer", vec![], vec![]);
        stack.register_node(h(1), "B", "Consumer", vec![], vec![h(0)]);
        stack.register_node(h(2), "C", "Consumer", vec![], vec![h(0)]);

        let cleaned = stack.cleanup_subgraph(h(1));
        assert_eq!(cleaned, vec![h(1)], "A still has a live dependent (C)");

        let cleaned = stack.cleanup_subgraph(h(2));
        assert_eq!(cleaned, vec![h(2), h(0)]);
    }

    #[test]
    fn cleanup_by_tag_matches_spec_scenario_6() {
        let mut stack = CleanupStack::new(vec![h(0), h(1), h(2), h(3), h(4)]);
        stack.register_node(h(0), "Light", "Producer", vec![], vec![]);
        stack.register_node(h(1), "S1", "Shadow", vec!["shadows".into()], vec![h(0)]);
        stack.register_node(h(2), "S2", "Shadow", vec!["shadows".into()], vec![h(0)]);
        stack.register_node(h(3), "S3", "Shadow", vec!["shadows".into()], vec![h(1), h(2)]);
        // MainPass also consumes Light directly, outside the shadow tag —
        // so Light must not be orphaned by tearing down the shadow subgraph.
        stack.register_node(h(4), "MainPass", "Pass", vec![], vec![h(0)]);

        let cleaned = stack.cleanup_by_tag("shadows");
        let mut names: Vec<_> = cleaned.iter().map(|n| stack.names[n].clone()).collect();
        names.sort();
        assert_eq!(names, vec!["S1", "S2", "S3"]);
        assert!(!stack.is_cleaned(h(0)), "Light still has MainPass as a live dependent");
        assert!(!stack.is_cleaned(h(4)), "MainPass is untagged and untouched");
    }

    #[test]
    fn cleanup_is_idempotent_per_node() {
        let mut stack = linear_stack();
        stack.cleanup_subgraph(h(2));
        let second = stack.cleanup_subgraph(h(2));
        assert!(second.is_empty());
    }

    #[test]
    fn get_cleanup_scope_is_a_dry_run() {
        let stack = linear_stack();
        let scope = stack.get_cleanup_scope(h(2));
        assert_eq!(scope, vec!["C", "B", "A"]);
        assert!(!stack.is_cleaned(h(2)), "dry run must not mutate state");
    }
}
