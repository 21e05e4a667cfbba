//! Aliasing engine (spec §4.8): best-fit memory pooling over resources
//! with disjoint, compatible lifetimes.

mod engine;
mod requirements;
mod stats;

pub use engine::{AliasingEngine, DEFAULT_ALIAS_THRESHOLD_BYTES};
pub use requirements::MemoryRequirements;
pub use stats::AliasStats;
