//! Stable per-loop state reference (spec §3, "Loop reference"): "A stable
//! record {loop id, should-execute-this-frame, delta time, step count, last
//! executed frame, last execution time, catch-up mode}."
//!
//! Grounded on `frame/src/frame.rs`'s `Frame`/`FrameIndex` pair in the
//! teacher: a small, cheaply-cloned handle whose identity stays fixed for
//! the lifetime of the thing it tracks. Here the "thing" is a registered
//! loop rather than a single frame, so the handle wraps a shared, mutable
//! snapshot behind a `parking_lot::RwLock` instead of being an immutable
//! per-frame value — nodes hold the same `LoopRef` across many frames and
//! must observe each `update()`'s results without the manager handing out a
//! new reference every time.

use std::sync::Arc;

use parking_lot::RwLock;

use rg_core::LoopId;

use crate::mode::CatchUpMode;

#[derive(Clone, Copy, Debug)]
pub(crate) struct LoopRefData {
    pub loop_id: LoopId,
    pub should_execute_this_frame: bool,
    pub delta_time: f64,
    pub step_count: u64,
    pub last_executed_frame: u64,
    pub last_execution_time: f64,
    pub catch_up_mode: CatchUpMode,
}

/// A node connects to zero or more of these; its effective execute
/// predicate is the OR of their `should_execute_this_frame` flags (spec
/// §3). Addresses/handles must not change for the loop's lifetime — this
/// is an `Arc` clone, so every holder observes the same underlying state.
#[derive(Clone, Debug)]
pub struct LoopRef(Arc<RwLock<LoopRefData>>);

impl LoopRef {
    pub(crate) fn new(data: LoopRefData) -> Self {
        LoopRef(Arc::new(RwLock::new(data)))
    }

    pub(crate) fn set(&self, data: LoopRefData) {
        *self.0.write() = data;
    }

    pub fn loop_id(&self) -> LoopId {
        self.0.read().loop_id
    }

    pub fn should_execute_this_frame(&self) -> bool {
        self.0.read().should_execute_this_frame
    }

    pub fn delta_time(&self) -> f64 {
        self.0.read().delta_time
    }

    pub fn step_count(&self) -> u64 {
        self.0.read().step_count
    }

    pub fn last_executed_frame(&self) -> u64 {
        self.0.read().last_executed_frame
    }

    pub fn last_execution_time(&self) -> f64 {
        self.0.read().last_execution_time
    }

    pub fn catch_up_mode(&self) -> CatchUpMode {
        self.0.read().catch_up_mode
    }
}

/// The OR of `refs`' `should_execute_this_frame` flags (spec §3, "its
/// effective execute predicate is the OR of their should-execute-this-frame
/// flags").
pub fn any_should_execute(refs: &[LoopRef]) -> bool {
    refs.iter().any(LoopRef::should_execute_this_frame)
}
