//! Constant injection (spec §4.5 mode 3): "Builds a resource carrying
//! `value` and attaches it as an input without creating an edge."

use rg_core::{NodeHandle, ResourceRef};
use rg_slots::ResourceDescriptor;

#[derive(Clone, Debug, PartialEq)]
pub struct ConstantInjection {
    pub target: NodeHandle,
    pub target_slot: usize,
    pub descriptor: ResourceDescriptor,
    pub array_index: Option<usize>,
}

/// Result of running a constant injection through the registry: the
/// resource the target's bundle should bind at `target_slot`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedConstant {
    pub target: NodeHandle,
    pub target_slot: usize,
    pub resource: ResourceRef,
    pub array_index: Option<usize>,
}
