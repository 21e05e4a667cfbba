//! Central resource registry, unified by resource identity (spec §4.2).

mod registry;
mod resource;

pub use registry::ResourceRegistry;
pub use resource::{AllocationStrategy, Resource, ResourceMetadata};

pub use rg_core::ScopeHash;
