//! Direct/array-fanout edges.

use rg_core::NodeHandle;

/// Source node, source output slot, target node, target input slot, and
/// an optional array index for fan-out connections.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Edge {
    pub source: NodeHandle,
    pub source_slot: usize,
    pub target: NodeHandle,
    pub target_slot: usize,
    pub array_index: Option<usize>,
}

/// A reference to a not-yet-resolved slot, used where the spec talks about
/// "resource = T.IMAGE_VIEW" before the producer has actually run (e.g. a
/// tentative variadic binding, spec §8 scenario 3): this names the slot, not
/// a concrete `ResourceRef` in the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SlotRef {
    pub node: NodeHandle,
    pub slot: usize,
}
