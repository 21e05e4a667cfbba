//! Graph topology (spec §4.4): the node/edge set, cycle detection,
//! topological sort, reachability, and incoming/outgoing edge queries.

mod graph;

pub use graph::{Topology, TopologyEdge};
