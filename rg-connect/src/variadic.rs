//! Variadic binding (spec §4.5 mode 5): "Creates a *tentative* slot on the
//! variadic node carrying {resource, slot name, binding index,
//! descriptor-type tag, source node, source output, state=Tentative}.
//! Validation is deferred to the dst node's compile phase, where the
//! slot's state transitions to Validated, Compiled, or Invalid."

use rg_core::NodeHandle;
use rg_slots::ResourceTypeTag;

use crate::edge::SlotRef;
use crate::field_extraction::FieldExtractor;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VariadicState {
    Tentative,
    Validated,
    Compiled,
    Invalid,
}

/// A tentative slot registered on a variadic node (spec §4.5, §8 scenario
/// 3). `field_extractor` is `Some` for the field-extracting variant of
/// `connect_variadic`.
#[derive(Debug)]
pub struct VariadicSlot {
    pub dst: NodeHandle,
    pub binding: usize,
    pub slot_name: String,
    pub descriptor_type: ResourceTypeTag,
    pub source: SlotRef,
    pub state: VariadicState,
    pub field_extractor: Option<FieldExtractor>,
}

impl VariadicSlot {
    pub fn new(
        dst: NodeHandle,
        binding: usize,
        slot_name: impl Into<String>,
        descriptor_type: ResourceTypeTag,
        source: SlotRef,
    ) -> Self {
        VariadicSlot {
            dst,
            binding,
            slot_name: slot_name.into(),
            descriptor_type,
            source,
            state: VariadicState::Tentative,
            field_extractor: None,
        }
    }

    pub fn with_field_extractor(mut self, extractor: FieldExtractor) -> Self {
        self.field_extractor = Some(extractor);
        self
    }

    /// Run at the dst node's compile phase (spec §4.5). `produced` is the
    /// type tag actually produced by the source's output slot.
    pub fn validate(&mut self, produced: ResourceTypeTag) {
        self.state = if produced == self.descriptor_type {
            VariadicState::Validated
        } else {
            VariadicState::Invalid
        };
    }

    pub fn mark_compiled(&mut self) {
        if self.state == VariadicState::Validated {
            self.state = VariadicState::Compiled;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rg_core::NodeHandle;

    #[test]
    fn matching_type_validates() {
        let mut slot = VariadicSlot::new(
            NodeHandle(0),
            0,
            "gathered",
            ResourceTypeTag::Image,
            SlotRef { node: NodeHandle(1), slot: 0 },
        );
        assert_eq!(slot.state, VariadicState::Tentative);
        slot.validate(ResourceTypeTag::Image);
        assert_eq!(slot.state, VariadicState::Validated);
        slot.mark_compiled();
        assert_eq!(slot.state, VariadicState::Compiled);
    }

    #[test]
    fn mismatched_type_is_invalid() {
        let mut slot = VariadicSlot::new(
            NodeHandle(0),
            0,
            "gathered",
            ResourceTypeTag::Image,
            SlotRef { node: NodeHandle(1), slot: 0 },
        );
        slot.validate(ResourceTypeTag::Buffer);
        assert_eq!(slot.state, VariadicState::Invalid);
    }
}
