//! Struct-field extraction (spec §4.5 mode 4): "The member reference is
//! resolved after the source's compile produces the struct; the extracted
//! field is exposed as the dst input. Implemented by registering a
//! post-compile callback; a placeholder resource is injected immediately so
//! topology validation passes, and a dependency edge is added so the
//! topological sort orders `src` before `dst`."
//!
//! Grounded on §9's redesign note for "pointer-to-member field extractors":
//! "Replace with a small typed-offset abstraction: {offset in bytes,
//! extractor function}. The connection builder stores the extractor as a
//! boxed closure."

use rg_core::{NodeHandle, ResourceRef};
use rg_slots::ResourceDescriptor;

/// The typed-offset abstraction from §9: `offset` is informational (kept
/// for parity with the source system's layout reasoning; the core never
/// dereferences raw memory per §1's scope), `extract` is the boxed closure
/// that actually derives the field's descriptor from the struct's.
pub struct FieldExtractor {
    pub offset: usize,
    pub extract: Box<dyn Fn(&ResourceDescriptor) -> ResourceDescriptor + Send + Sync>,
}

impl std::fmt::Debug for FieldExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldExtractor")
            .field("offset", &self.offset)
            .finish()
    }
}

/// A registered, not-yet-resolved field extraction. `placeholder` is filled
/// in immediately at `register_all` time (spec: "a placeholder resource is
/// injected immediately so topology validation passes"); the real value
/// replaces it once `resolve` runs after the source node's compile.
#[derive(Debug)]
pub struct FieldExtraction {
    pub source: NodeHandle,
    pub source_slot: usize,
    pub target: NodeHandle,
    pub target_slot: usize,
    pub array_index: Option<usize>,
    pub extractor: FieldExtractor,
    pub placeholder: ResourceRef,
}

impl FieldExtraction {
    /// Run the extractor against the source's now-compiled struct
    /// descriptor, producing the real descriptor for the target's input.
    pub fn resolve(&self, source_descriptor: &ResourceDescriptor) -> ResourceDescriptor {
        (self.extractor.extract)(source_descriptor)
    }
}
