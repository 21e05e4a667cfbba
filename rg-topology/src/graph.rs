//! Node/edge set and topological queries (spec §4.4).
//!
//! Grounded on `scheduler/src/static_graph.rs::GraphBuilder::topological_sort`
//! (a `BTreeSet`-driven Kahn's-algorithm walk with deterministic
//! tie-breaking by node id) reformulated as an iterative, DFS-based
//! ordering per spec §4.4 ("deterministic DFS-based ordering; ties broken
//! by node insertion order") and §9's redesign note ("Cycle detection /
//! topo sort recursion. Reformulate iteratively with an explicit stack to
//! avoid deep recursion on large graphs").

use std::collections::HashSet;

use rg_core::{NodeHandle, TopologyError};

/// A node-level edge (spec §3 "Edge" carries slot indices too, but those
/// live in `rg-connect`; the topology only needs the node-to-node shape to
/// drive ordering and reachability).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TopologyEdge {
    pub from: NodeHandle,
    pub to: NodeHandle,
}

#[derive(Debug, Default)]
pub struct Topology {
    /// Node handles in insertion order; doubles as the tie-break order for
    /// topological sort.
    nodes: Vec<NodeHandle>,
    present: HashSet<NodeHandle>,
    edges: Vec<TopologyEdge>,
    /// Adjacency, built lazily from `edges` by callers that need it
    /// repeatedly; kept as plain vectors so iteration order matches
    /// insertion order of the edges, which in turn is what makes the DFS
    /// below deterministic.
    outgoing: std::collections::HashMap<NodeHandle, Vec<NodeHandle>>,
    incoming: std::collections::HashMap<NodeHandle, Vec<NodeHandle>>,
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, handle: NodeHandle) {
        if self.present.insert(handle) {
            self.nodes.push(handle);
            self.outgoing.entry(handle).or_default();
            self.incoming.entry(handle).or_default();
        }
    }

    /// Remove a node and every edge touching it.
    pub fn remove_node(&mut self, handle: NodeHandle) {
        if !self.present.remove(&handle) {
            return;
        }
        self.nodes.retain(|&h| h != handle);
        self.edges.retain(|e| e.from != handle && e.to != handle);
        self.outgoing.remove(&handle);
        self.incoming.remove(&handle);
        for list in self.outgoing.values_mut() {
            list.retain(|&h| h != handle);
        }
        for list in self.incoming.values_mut() {
            list.retain(|&h| h != handle);
        }
    }

    pub fn add_edge(&mut self, from: NodeHandle, to: NodeHandle) {
        self.edges.push(TopologyEdge { from, to });
        self.outgoing.entry(from).or_default().push(to);
        self.incoming.entry(to).or_default().push(from);
    }

    pub fn remove_edge(&mut self, from: NodeHandle, to: NodeHandle) {
        self.edges.retain(|e| !(e.from == from && e.to == to));
        if let Some(list) = self.outgoing.get_mut(&from) {
            list.retain(|&h| h != to);
        }
        if let Some(list) = self.incoming.get_mut(&to) {
            list.retain(|&h| h != from);
        }
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeHandle> + '_ {
        self.nodes.iter().copied()
    }

    pub fn edges(&self) -> impl Iterator<Item = &TopologyEdge> {
        self.edges.iter()
    }

    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.present.contains(&handle)
    }

    /// Nodes this one directly depends on (producers of its inputs).
    pub fn direct_dependencies(&self, handle: NodeHandle) -> &[NodeHandle] {
        self.incoming.get(&handle).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Nodes that directly depend on this one (consumers of its outputs).
    pub fn direct_dependents(&self, handle: NodeHandle) -> &[NodeHandle] {
        self.outgoing.get(&handle).map(Vec::as_slice).unwrap_or(&[])
    }

    fn transitive(&self, start: NodeHandle, forward: bool) -> HashSet<NodeHandle> {
        let mut seen = HashSet::new();
        let mut stack = vec![start];
        while let Some(h) = stack.pop() {
            let neighbors = if forward {
                self.direct_dependents(h)
            } else {
                self.direct_dependencies(h)
            };
            for &n in neighbors {
                if seen.insert(n) {
                    stack.push(n);
                }
            }
        }
        seen
    }

    pub fn transitive_dependencies(&self, handle: NodeHandle) -> HashSet<NodeHandle> {
        self.transitive(handle, false)
    }

    pub fn transitive_dependents(&self, handle: NodeHandle) -> HashSet<NodeHandle> {
        self.transitive(handle, true)
    }

    /// Nodes with no incoming edges.
    pub fn roots(&self) -> Vec<NodeHandle> {
        self.nodes
            .iter()
            .copied()
            .filter(|h| self.direct_dependencies(*h).is_empty())
            .collect()
    }

    /// Nodes with no outgoing edges.
    pub fn leaves(&self) -> Vec<NodeHandle> {
        self.nodes
            .iter()
            .copied()
            .filter(|h| self.direct_dependents(*h).is_empty())
            .collect()
    }

    /// Depth-first search with an explicit recursion stack, iteratively
    /// (spec §9); returns true on the first back edge found.
    pub fn has_cycles(&self) -> bool {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Color {
            Gray,
            Black,
        }
        let mut color = std::collections::HashMap::new();
        // (node, next child index to visit) frames, explicit stack instead
        // of recursion.
        let mut frames: Vec<(NodeHandle, usize)> = Vec::new();

        for &start in &self.nodes {
            if color.contains_key(&start) {
                continue;
            }
            frames.push((start, 0));
            color.insert(start, Color::Gray);

            while let Some(&mut (node, ref mut next)) = frames.last_mut() {
                let children = self.direct_dependents(node);
                if *next < children.len() {
                    let child = children[*next];
                    *next += 1;
                    match color.get(&child) {
                        Some(Color::Gray) => return true,
                        Some(Color::Black) => continue,
                        None => {
                            color.insert(child, Color::Gray);
                            frames.push((child, 0));
                        }
                    }
                } else {
                    color.insert(node, Color::Black);
                    frames.pop();
                }
            }
        }
        false
    }

    /// Deterministic DFS-based topological ordering; ties broken by node
    /// insertion order (spec §4.4). Iterative per §9.
    pub fn topological_sort(&self) -> Result<Vec<NodeHandle>, TopologyError> {
        if self.has_cycles() {
            return Err(TopologyError::Cycle(
                self.nodes
                    .first()
                    .map(|h| h.to_string())
                    .unwrap_or_default(),
            ));
        }

        let mut visited = HashSet::new();
        let mut finished = Vec::with_capacity(self.nodes.len());
        let mut frames: Vec<(NodeHandle, usize)> = Vec::new();

        // Postorder DFS followed by a final reverse yields a valid topological
        // order, but a plain forward walk reverses the relative order of
        // independent subtrees along with each subtree's own internals. To
        // land on insertion-order tie-breaking (spec §4.4) after the reverse,
        // walk both the start nodes and each node's children in reverse
        // insertion order here, which the trailing `reverse()` below then
        // undoes back into insertion order.
        for &start in self.nodes.iter().rev() {
            if visited.contains(&start) {
                continue;
            }
            frames.push((start, 0));
            visited.insert(start);

            while let Some(&mut (node, ref mut next)) = frames.last_mut() {
                let children = self.direct_dependents(node);
                if *next < children.len() {
                    let child = children[children.len() - 1 - *next];
                    *next += 1;
                    if visited.insert(child) {
                        frames.push((child, 0));
                    }
                } else {
                    finished.push(node);
                    frames.pop();
                }
            }
        }

        finished.reverse();
        Ok(finished)
    }

    /// spec §4.4: "checks all edges reference existing nodes, no cycles
    /// exist". Required-input connectivity is checked one layer up by
    /// `rg-graph`'s compiler, which is the component that actually knows
    /// about slot roles and nullability.
    pub fn validate(&self) -> Result<(), TopologyError> {
        for edge in &self.edges {
            if !self.present.contains(&edge.from) {
                return Err(TopologyError::DanglingReference(edge.from.to_string()));
            }
            if !self.present.contains(&edge.to) {
                return Err(TopologyError::DanglingReference(edge.to.to_string()));
            }
        }
        if self.has_cycles() {
            return Err(TopologyError::Cycle(
                self.nodes
                    .first()
                    .map(|h| h.to_string())
                    .unwrap_or_default(),
            ));
        }
        Ok(())
    }
}
