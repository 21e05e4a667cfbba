//! Batched, type-checked connection builder (spec §4.5): direct edges,
//! array fan-out, constant injection, struct-field extraction, and
//! deferred variadic binding.

mod builder;
mod constant;
mod edge;
mod field_extraction;
mod variadic;

pub use builder::{ConnectionBuilder, RegisteredConnections};
pub use constant::{ConstantInjection, ResolvedConstant};
pub use edge::{Edge, SlotRef};
pub use field_extraction::{FieldExtraction, FieldExtractor};
pub use variadic::{VariadicSlot, VariadicState};
