//! Resource type registry and typed slot system (spec §4.1).

mod kind;
mod registry;
mod slot;

pub use kind::{
    AccelerationStructureDescriptor, BufferDescriptor, BufferUsage, ImageDescriptor, ImageFormat,
    OpaqueDescriptor, ResourceCategory, ResourceDescriptor, ResourceTypeTag,
};
pub use registry::ResourceTypeRegistry;
pub use slot::{
    Mutability, SlotArity, SlotDescriptor, SlotRole, SlotScope, SlotTypeConstraint,
};
