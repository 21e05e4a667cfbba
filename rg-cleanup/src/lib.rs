//! Cleanup stack and dependency tracker (spec §4.10): correct teardown
//! ordering consistent with data-flow dependencies, with partial cleanup
//! by node, tag, type, or root.

mod stack;
mod tracker;

pub use stack::CleanupStack;
pub use tracker::DependencyTracker;
