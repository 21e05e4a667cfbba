//! Lifetime analyser (spec §4.7): per-resource birth/death timelines,
//! scope classification, and greedy interval-based aliasing grouping.

mod analyser;
mod timeline;

pub use analyser::LifetimeAnalyser;
pub use timeline::{ResourceInfo, Timeline};
