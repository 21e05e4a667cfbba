//! Single-source-of-truth registry (spec §4.1). Because
//! [`crate::kind::ResourceTypeTag`] is a closed sum type generated once by
//! `declare_resource_kinds!`, an unregistered handle type cannot be named in
//! Rust code at all — but node schemas are frequently assembled from
//! string-keyed configuration (parameter bundles, tooling), so this registry
//! still offers a runtime lookup from name to tag that rejects anything
//! outside the closed set.

use rg_core::SchemaError;

use crate::kind::{ResourceCategory, ResourceTypeTag};

#[derive(Debug, Default)]
pub struct ResourceTypeRegistry;

impl ResourceTypeRegistry {
    pub fn new() -> Self {
        ResourceTypeRegistry
    }

    /// All handle types known to the engine.
    pub fn all(&self) -> &'static [ResourceTypeTag] {
        ResourceTypeTag::all()
    }

    pub fn category_of(&self, tag: ResourceTypeTag) -> ResourceCategory {
        tag.category()
    }

    /// Resolve a handle type by name, rejecting unregistered names
    /// (spec §4.1: "The registry rejects unregistered handle types at
    /// type-check time").
    pub fn resolve(&self, name: &str) -> Result<ResourceTypeTag, SchemaError> {
        self.all()
            .iter()
            .copied()
            .find(|tag| tag.name() == name)
            .ok_or_else(|| SchemaError::UnregisteredType(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_type_by_name() {
        let registry = ResourceTypeRegistry::new();
        assert_eq!(registry.resolve("Image").unwrap(), ResourceTypeTag::Image);
    }

    #[test]
    fn rejects_unknown_type_name() {
        let registry = ResourceTypeRegistry::new();
        assert!(matches!(
            registry.resolve("Voxel"),
            Err(SchemaError::UnregisteredType(ref n)) if n == "Voxel"
        ));
    }
}
