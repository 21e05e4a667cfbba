//! Per-resource timeline (spec §3 "Timeline", §4.7).

use rg_core::{LifetimeScope, NodeHandle, ResourceRef};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Timeline {
    pub resource: ResourceRef,
    pub producer: NodeHandle,
    pub consumers: Vec<NodeHandle>,
    pub birth_index: usize,
    pub death_index: usize,
    pub scope: LifetimeScope,
    /// "reserved for future parallel execution" (spec §4.7); always 0 in
    /// this single-threaded-at-the-graph-level scheduling model (§5).
    pub execution_wave: u32,
    pub alias_group: Option<usize>,
}

/// What the analyser needs to know about a resource to build its timeline:
/// which node produced it and at which output slot (so consumers can be
/// found among the edge set).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResourceInfo {
    pub resource: ResourceRef,
    pub producer: NodeHandle,
    pub output_slot: usize,
}
