//! Owns all resource objects by identity (spec §4.2). Nodes never own a
//! `Resource` directly — they hold a [`rg_core::ResourceRef`] into this
//! registry, mirroring the teacher's `Escape<T>`/central-owner pattern in
//! `rendy-resource::escape` without the drop-channel machinery, since here
//! release is driven by the explicit cleanup stack rather than Rust's
//! `Drop`.

use std::collections::HashMap;

use rg_core::{DeviceId, LifetimeScope, NodeId, ResourceRef};
use rg_slots::ResourceDescriptor;

use crate::resource::{AllocationStrategy, Resource, ResourceMetadata};

#[derive(Debug, Default)]
pub struct ResourceRegistry {
    resources: Vec<Resource>,
    /// Logical clock, incremented on every `create`. Deterministic and
    /// test-friendly in place of a wall-clock timestamp.
    clock: u64,
    /// Temporary-resource scope tracking (spec §4.2 / §4.5): resources
    /// requested during a node's Compile/Execute under a given scope hash
    /// are auto-released when that scope exits.
    temporaries: HashMap<u64, Vec<ResourceRef>>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// `create<T>(descriptor, allocation-strategy) → resource ref`.
    pub fn create(
        &mut self,
        descriptor: ResourceDescriptor,
        producer: NodeId,
        lifetime_tag: LifetimeScope,
        strategy: AllocationStrategy,
        device: Option<DeviceId>,
    ) -> ResourceRef {
        let id = ResourceRef(self.resources.len() as u32);
        self.clock += 1;
        let size = descriptor.estimated_size();
        let type_tag = descriptor.type_tag();
        self.resources.push(Resource {
            id,
            type_tag,
            lifetime_tag,
            descriptor,
            producer,
            device,
            strategy,
            valid: true,
            alias_group: None,
            size,
            allocation_timestamp: self.clock,
            released: false,
        });
        log::trace!("resource {} created by {}", id, producer);
        id
    }

    /// Track a resource as temporary under `scope`, so it is released when
    /// [`Self::release_scope`] is called for that scope hash.
    pub fn track_temporary(&mut self, scope: u64, resource: ResourceRef) {
        self.temporaries.entry(scope).or_default().push(resource);
    }

    /// Release every resource tracked under `scope` (spec §4.5: "Resources
    /// tagged temporary are automatically released when their scope
    /// exits").
    pub fn release_scope(&mut self, scope: u64) -> Vec<ResourceRef> {
        let refs = self.temporaries.remove(&scope).unwrap_or_default();
        for r in &refs {
            self.release(*r);
        }
        refs
    }

    pub fn get(&self, resource: ResourceRef) -> Option<&Resource> {
        self.resources.get(resource.index())
    }

    pub fn get_mut(&mut self, resource: ResourceRef) -> Option<&mut Resource> {
        self.resources.get_mut(resource.index())
    }

    pub fn metadata(&self, resource: ResourceRef) -> Option<ResourceMetadata> {
        self.get(resource).map(|r| ResourceMetadata {
            strategy: r.strategy,
            device: r.device,
            size: r.size,
            allocation_timestamp: r.allocation_timestamp,
        })
    }

    /// Reconciles estimate with actual size after backend allocation.
    pub fn update_size(&mut self, resource: ResourceRef, new_size: u64) {
        if let Some(r) = self.get_mut(resource) {
            r.size = new_size;
        }
    }

    /// Records a deallocation and detaches from aliasing, but does not free
    /// until the owning node's cleanup runs (spec §4.2).
    pub fn release(&mut self, resource: ResourceRef) {
        if let Some(r) = self.get_mut(resource) {
            r.alias_group = None;
            r.released = true;
            r.valid = false;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}
