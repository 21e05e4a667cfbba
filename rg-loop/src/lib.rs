//! Loop manager (spec §4.11): fixed-timestep accumulators with a
//! configurable catch-up policy, exposing stable per-loop state references
//! that nodes connect to.

mod loop_ref;
mod manager;
mod mode;

pub use loop_ref::{any_should_execute, LoopRef};
pub use manager::{LoopManager, DEFAULT_MAX_CATCH_UP_SECONDS};
pub use mode::CatchUpMode;
