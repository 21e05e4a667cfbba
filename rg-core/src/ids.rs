use std::sync::atomic::{AtomicU64, Ordering};

/// Process-lifetime unique identity of a node instance (spec §3, "a stable
/// numeric instance id"). Distinct from [`NodeHandle`], which is the index
/// of the node within its owning graph's node vector and is only stable for
/// as long as the node remains in that graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

impl NodeId {
    /// Allocate the next process-lifetime-unique node id.
    pub fn next() -> Self {
        NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Node#{}", self.0)
    }
}

/// Index of a node within its owning graph's node vector (spec §3: "a
/// handle (an index into the graph's node vector)").
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeHandle(pub u32);

impl NodeHandle {
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn from_index(index: usize) -> Self {
        NodeHandle(index as u32)
    }
}

impl std::fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifies a node *type* (blueprint), as opposed to a node instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeTypeId(pub u32);

/// Index into the resource registry. Resources are owned centrally; this is
/// a non-owning reference a node's bundle can hold (spec §3 "Resource").
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceRef(pub u32);

impl ResourceRef {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Resource#{}", self.0)
    }
}

/// Opaque backend device identity. The core never inspects it (spec §6).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeviceId(pub u32);

/// Identifies a loop registered with the loop manager (spec §4.11).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoopId(pub u32);

/// Opaque subscription handle returned by the event bus (spec §6,
/// "Subscription ids are opaque").
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(pub u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_ids_are_unique_and_monotonic() {
        let a = NodeId::next();
        let b = NodeId::next();
        assert!(b.value() > a.value());
    }

    #[test]
    fn node_handle_round_trips_through_index() {
        let h = NodeHandle::from_index(7);
        assert_eq!(h.index(), 7);
    }
}
