//! A resource object (spec §3 "Resource"): "A unique-owned object with: a
//! type tag, a lifetime tag ..., a handle variant, a descriptor variant, an
//! owning-node back-reference, an optional device back-reference, and a
//! validity flag."

use rg_core::{DeviceId, LifetimeScope, NodeId, ResourceRef};
use rg_slots::{ResourceDescriptor, ResourceTypeTag};

/// Where a resource's backing memory should be allocated from. Spec §4.2:
/// "records an allocation against the category implied by the strategy
/// (device-local vs host-visible)".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AllocationStrategy {
    DeviceLocal,
    HostVisible,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Resource {
    pub id: ResourceRef,
    pub type_tag: ResourceTypeTag,
    pub lifetime_tag: LifetimeScope,
    pub descriptor: ResourceDescriptor,
    pub producer: NodeId,
    pub device: Option<DeviceId>,
    pub strategy: AllocationStrategy,
    pub valid: bool,
    /// Assigned by the aliasing engine (rg-alias) once the resource joins a
    /// pool; `None` until then / after it is forcibly detached on release.
    pub alias_group: Option<u32>,
    /// Size estimate, reconciled by [`super::registry::ResourceRegistry::update_size`]
    /// after a real backend allocation.
    pub size: u64,
    pub allocation_timestamp: u64,
    /// True once a backend has actually been asked to deallocate this
    /// resource; the registry still keeps the slot so the node's cleanup
    /// hook can reference it one more time (spec §4.2: "does not free until
    /// the owning node's cleanup runs").
    pub released: bool,
}

impl Resource {
    pub fn estimated_size(&self) -> u64 {
        self.size
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResourceMetadata {
    pub strategy: AllocationStrategy,
    pub device: Option<DeviceId>,
    pub size: u64,
    pub allocation_timestamp: u64,
}
