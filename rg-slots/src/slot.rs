//! Per-slot metadata (spec §4.1): "A slot descriptor is fully described at
//! compile time by: handle type, slot index, nullable flag, role bitflags
//! (dependency / execute-only / cleanup-only), scope (node-level or
//! task-level), and mutability."

use crate::kind::{ResourceCategory, ResourceTypeTag};

bitflags::bitflags! {
    /// Role bitflags — spec calls these "bitflag-combinable".
    pub struct SlotRole: u8 {
        const DEPENDENCY = 0b001;
        const EXECUTE_ONLY = 0b010;
        const CLEANUP_ONLY = 0b100;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SlotScope {
    /// One value shared by every task of the node.
    Node,
    /// One value per task; multiplicity parameterises the node's task count.
    Task,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mutability {
    Immutable,
    Mutable,
}

/// Multiplicity of a slot's value (spec §4.1: "automatic acceptance of
/// `sequence<T>`, `fixed-array<T,N>`, and sum-type slots containing only
/// registered members").
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SlotArity {
    Scalar,
    Sequence,
    Fixed(usize),
}

/// What handle type(s) a slot accepts. `AnyOf`/`Category` model "sum-type
/// slots containing only registered members" — every member named must be
/// one of `ResourceTypeTag::all()`, which is a closed set, so there is no
/// way to construct a constraint naming an unregistered type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SlotTypeConstraint {
    Single(ResourceTypeTag),
    AnyOf(Vec<ResourceTypeTag>),
    Category(ResourceCategory),
}

impl SlotTypeConstraint {
    pub fn accepts(&self, tag: ResourceTypeTag) -> bool {
        match self {
            SlotTypeConstraint::Single(t) => *t == tag,
            SlotTypeConstraint::AnyOf(ts) => ts.contains(&tag),
            SlotTypeConstraint::Category(cat) => tag.category() == *cat,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SlotDescriptor {
    pub name: String,
    pub index: usize,
    pub constraint: SlotTypeConstraint,
    pub arity: SlotArity,
    pub nullable: bool,
    pub role: SlotRole,
    pub scope: SlotScope,
    pub mutability: Mutability,
}

impl SlotDescriptor {
    pub fn new(name: impl Into<String>, index: usize, tag: ResourceTypeTag) -> Self {
        SlotDescriptor {
            name: name.into(),
            index,
            constraint: SlotTypeConstraint::Single(tag),
            arity: SlotArity::Scalar,
            nullable: false,
            role: SlotRole::DEPENDENCY,
            scope: SlotScope::Node,
            mutability: Mutability::Immutable,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn with_role(mut self, role: SlotRole) -> Self {
        self.role = role;
        self
    }

    pub fn with_scope(mut self, scope: SlotScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn mutable(mut self) -> Self {
        self.mutability = Mutability::Mutable;
        self
    }

    pub fn with_arity(mut self, arity: SlotArity) -> Self {
        self.arity = arity;
        self
    }

    /// Conservative conversion table for rule (b) of the compatibility
    /// check below: when one handle type's values can stand in for another
    /// without reinterpretation (e.g. a single-sample image is accepted
    /// wherever an acceleration-structure-free opaque handle is expected).
    /// Kept intentionally small; extend as new conversions are needed.
    fn convertible(from: ResourceTypeTag, to: ResourceTypeTag) -> bool {
        use ResourceTypeTag::*;
        matches!((from, to), (Image, Opaque) | (Buffer, Opaque) | (AccelerationStructure, Opaque))
    }

    /// spec §4.1 compatibility rule: "two slots connect if either (a) their
    /// handle types are identical, (b) one's handle type is convertible to
    /// the other, or (c) both map to the same resource-category tag."
    pub fn compatible_with(&self, produced: ResourceTypeTag) -> bool {
        match &self.constraint {
            SlotTypeConstraint::Single(expected) => {
                *expected == produced
                    || Self::convertible(produced, *expected)
                    || Self::convertible(*expected, produced)
                    || expected.category() == produced.category()
            }
            SlotTypeConstraint::AnyOf(tags) => tags.iter().any(|&expected| {
                expected == produced
                    || Self::convertible(produced, expected)
                    || expected.category() == produced.category()
            }),
            SlotTypeConstraint::Category(cat) => *cat == produced.category(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::ResourceTypeTag;

    #[test]
    fn identical_handle_types_are_compatible() {
        let slot = SlotDescriptor::new("color", 0, ResourceTypeTag::Image);
        assert!(slot.compatible_with(ResourceTypeTag::Image));
    }

    #[test]
    fn same_category_is_compatible() {
        let slot = SlotDescriptor::new("anything", 0, ResourceTypeTag::Image)
            .with_arity(SlotArity::Scalar);
        // Not same category as Buffer, so incompatible unless convertible.
        assert!(!slot.compatible_with(ResourceTypeTag::Buffer));
    }

    #[test]
    fn convertible_types_are_compatible() {
        let slot = SlotDescriptor::new("generic", 0, ResourceTypeTag::Opaque);
        assert!(slot.compatible_with(ResourceTypeTag::Image));
        assert!(slot.compatible_with(ResourceTypeTag::Buffer));
    }

    #[test]
    fn roles_are_combinable_bitflags() {
        let role = SlotRole::DEPENDENCY | SlotRole::CLEANUP_ONLY;
        assert!(role.contains(SlotRole::DEPENDENCY));
        assert!(role.contains(SlotRole::CLEANUP_ONLY));
        assert!(!role.contains(SlotRole::EXECUTE_ONLY));
    }
}
