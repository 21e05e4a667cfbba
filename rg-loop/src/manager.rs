//! Loop manager (spec §4.11): maintains a set of loops keyed by loop id,
//! each with a fixed timestep, an accumulator, a catch-up policy, and a
//! stable [`LoopRef`] that nodes read from.
//!
//! Grounded on `frame/src/frame.rs`'s `FrameGen` (a monotonic id generator
//! owning a single "next" counter) in the teacher, generalized from "one
//! global frame counter" to "many independently-clocked loops".

use std::collections::HashMap;

use rg_core::LoopId;

use crate::loop_ref::{LoopRef, LoopRefData};
use crate::mode::CatchUpMode;

/// Default max catch-up cap: 250 ms (spec §4.11).
pub const DEFAULT_MAX_CATCH_UP_SECONDS: f64 = 0.25;

struct LoopEntry {
    name: String,
    fixed_timestep: f64,
    catch_up_mode: CatchUpMode,
    max_catch_up: f64,
    accumulator: f64,
    /// Monotonically increasing diagnostic counter fed only by
    /// `SingleCorrectiveStep` (see `SPEC_FULL.md` §4.11): the clamped
    /// remainder left after taking one corrective step, never drained
    /// automatically. Not a second accumulator.
    debt: f64,
    /// Running wall-clock total of catch-up-clamped frame time fed to this
    /// loop, used to populate `last_execution_time`.
    clock: f64,
    step_count: u64,
    loop_ref: LoopRef,
}

#[derive(Default)]
pub struct LoopManager {
    loops: HashMap<LoopId, LoopEntry>,
    next_id: u32,
}

impl LoopManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new loop. `fixed_timestep == 0.0` means variable-step:
    /// every `update` executes with `delta = accumulator` (spec §4.11).
    pub fn register_loop(
        &mut self,
        name: impl Into<String>,
        fixed_timestep: f64,
        catch_up_mode: CatchUpMode,
    ) -> LoopId {
        self.register_loop_with_cap(name, fixed_timestep, catch_up_mode, DEFAULT_MAX_CATCH_UP_SECONDS)
    }

    pub fn register_loop_with_cap(
        &mut self,
        name: impl Into<String>,
        fixed_timestep: f64,
        catch_up_mode: CatchUpMode,
        max_catch_up: f64,
    ) -> LoopId {
        let id = LoopId(self.next_id);
        self.next_id += 1;
        let loop_ref = LoopRef::new(LoopRefData {
            loop_id: id,
            should_execute_this_frame: false,
            delta_time: 0.0,
            step_count: 0,
            last_executed_frame: 0,
            last_execution_time: 0.0,
            catch_up_mode,
        });
        self.loops.insert(
            id,
            LoopEntry {
                name: name.into(),
                fixed_timestep,
                catch_up_mode,
                max_catch_up,
                accumulator: 0.0,
                debt: 0.0,
                clock: 0.0,
                step_count: 0,
                loop_ref,
            },
        );
        id
    }

    pub fn loop_ref(&self, id: LoopId) -> Option<LoopRef> {
        self.loops.get(&id).map(|e| e.loop_ref.clone())
    }

    pub fn name(&self, id: LoopId) -> Option<&str> {
        self.loops.get(&id).map(|e| e.name.as_str())
    }

    /// Diagnostic-only: the accumulated `SingleCorrectiveStep` debt for a
    /// loop. Never reset by the manager itself; an embedder polls and
    /// clears it with [`Self::reset_debt`].
    pub fn debt(&self, id: LoopId) -> f64 {
        self.loops.get(&id).map_or(0.0, |e| e.debt)
    }

    pub fn reset_debt(&mut self, id: LoopId) {
        if let Some(entry) = self.loops.get_mut(&id) {
            entry.debt = 0.0;
        }
    }

    /// Advance every registered loop by one frame (spec §4.11's
    /// per-loop `update(frame_time)` algorithm, applied to all loops).
    pub fn update(&mut self, frame_index: u64, frame_time: f64) {
        for entry in self.loops.values_mut() {
            Self::update_one(entry, frame_index, frame_time);
        }
    }

    fn update_one(entry: &mut LoopEntry, frame_index: u64, frame_time: f64) {
        let clamped = frame_time.min(entry.max_catch_up);
        entry.accumulator += clamped;
        entry.clock += clamped;

        let (should_execute, delta) = if entry.fixed_timestep == 0.0 {
            let delta = entry.accumulator;
            entry.accumulator = 0.0;
            entry.step_count += 1;
            (true, delta)
        } else {
            match entry.catch_up_mode {
                CatchUpMode::FireAndForget => {
                    if entry.accumulator >= entry.fixed_timestep {
                        let delta = entry.accumulator;
                        entry.accumulator = 0.0;
                        entry.step_count += 1;
                        (true, delta)
                    } else {
                        (false, 0.0)
                    }
                }
                CatchUpMode::SingleCorrectiveStep => {
                    if entry.accumulator >= entry.fixed_timestep {
                        let delta = entry.fixed_timestep;
                        entry.accumulator -= entry.fixed_timestep;
                        entry.debt += (entry.accumulator - entry.fixed_timestep).max(0.0);
                        entry.accumulator = entry.accumulator.min(entry.fixed_timestep);
                        entry.step_count += 1;
                        (true, delta)
                    } else {
                        (false, 0.0)
                    }
                }
                CatchUpMode::MultipleSteps => {
                    // Safety bound, not a tunable: the accumulator can
                    // never hold more than `max_catch_up` of unconsumed
                    // time entering this loop, so it can never need more
                    // than `max_catch_up / fixed_timestep` steps (+1 for
                    // floating-point slack) to drain.
                    let safety_cap = (entry.max_catch_up / entry.fixed_timestep).ceil() as u64 + 1;
                    let mut executed = false;
                    let mut delta = 0.0;
                    let mut iterations = 0u64;
                    while entry.accumulator >= entry.fixed_timestep && iterations < safety_cap {
                        entry.accumulator -= entry.fixed_timestep;
                        entry.step_count += 1;
                        delta = entry.fixed_timestep;
                        executed = true;
                        iterations += 1;
                    }
                    (executed, delta)
                }
            }
        };

        if should_execute {
            entry.last_executed_frame = frame_index;
            entry.last_execution_time = entry.clock;
        }

        entry.loop_ref.set(LoopRefData {
            loop_id: entry.loop_ref.loop_id(),
            should_execute_this_frame: should_execute,
            delta_time: delta,
            step_count: entry.step_count,
            last_executed_frame: entry.last_executed_frame,
            last_execution_time: entry.last_execution_time,
            catch_up_mode: entry.catch_up_mode,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variable_step_always_executes_with_full_accumulator() {
        let mut mgr = LoopManager::new();
        let id = mgr.register_loop("variable", 0.0, CatchUpMode::FireAndForget);
        mgr.update(1, 0.05);
        let r = mgr.loop_ref(id).unwrap();
        assert!(r.should_execute_this_frame());
        assert!((r.delta_time() - 0.05).abs() < 1e-9);
        assert_eq!(r.step_count(), 1);
    }

    #[test]
    fn fire_and_forget_drains_the_whole_accumulator_in_one_step() {
        let mut mgr = LoopManager::new();
        let id = mgr.register_loop("physics", 1.0 / 60.0, CatchUpMode::FireAndForget);
        mgr.update(1, 0.5);
        let r = mgr.loop_ref(id).unwrap();
        assert!(r.should_execute_this_frame());
        assert!((r.delta_time() - 0.5).abs() < 1e-9);
        assert_eq!(r.step_count(), 1);
    }

    #[test]
    fn single_corrective_step_takes_one_step_and_banks_debt() {
        let mut mgr = LoopManager::new();
        let fixed = 1.0 / 60.0;
        let id = mgr.register_loop("physics", fixed, CatchUpMode::SingleCorrectiveStep);
        mgr.update(1, fixed * 3.0);
        let r = mgr.loop_ref(id).unwrap();
        assert!(r.should_execute_this_frame());
        assert!((r.delta_time() - fixed).abs() < 1e-9);
        assert_eq!(r.step_count(), 1);
        // accumulator was 3*fixed; one step consumes fixed, leaving
        // 2*fixed, of which everything past the re-clamp to `fixed`
        // becomes debt: debt == fixed.
        assert!((mgr.debt(id) - fixed).abs() < 1e-9);
    }

    #[test]
    fn single_corrective_step_debt_is_monotonic_and_not_auto_drained() {
        let mut mgr = LoopManager::new();
        let fixed = 1.0 / 60.0;
        let id = mgr.register_loop("physics", fixed, CatchUpMode::SingleCorrectiveStep);
        mgr.update(1, fixed * 3.0);
        let first_debt = mgr.debt(id);
        mgr.update(2, 0.0);
        assert!(mgr.debt(id) >= first_debt);
        mgr.reset_debt(id);
        assert_eq!(mgr.debt(id), 0.0);
    }

    #[test]
    fn multiple_steps_matches_spec_scenario_4() {
        let mut mgr = LoopManager::new();
        let fixed = 1.0 / 60.0;
        let id = mgr.register_loop_with_cap("physics", fixed, CatchUpMode::MultipleSteps, 0.25);

        mgr.update(1, 0.1);
        let r = mgr.loop_ref(id).unwrap();
        assert!(r.should_execute_this_frame());
        assert_eq!(r.step_count(), 6);
        assert!((r.delta_time() - fixed).abs() < 1e-9);

        mgr.update(2, 1.0);
        let r = mgr.loop_ref(id).unwrap();
        assert_eq!(r.step_count(), 6 + 15);
    }

    #[test]
    fn multiple_steps_below_one_step_does_not_execute() {
        let mut mgr = LoopManager::new();
        let fixed = 1.0 / 60.0;
        let id = mgr.register_loop("physics", fixed, CatchUpMode::MultipleSteps);
        mgr.update(1, fixed / 2.0);
        let r = mgr.loop_ref(id).unwrap();
        assert!(!r.should_execute_this_frame());
        assert_eq!(r.step_count(), 0);
    }

    #[test]
    fn loop_ref_identity_is_stable_across_updates() {
        let mut mgr = LoopManager::new();
        let id = mgr.register_loop("physics", 1.0 / 60.0, CatchUpMode::FireAndForget);
        let r1 = mgr.loop_ref(id).unwrap();
        mgr.update(1, 0.5);
        // Same handle observes the mutation in place; no new reference was
        // handed out by `update`.
        assert!(r1.should_execute_this_frame());
    }

    #[test]
    fn last_executed_frame_only_advances_on_an_executing_update() {
        let mut mgr = LoopManager::new();
        let fixed = 1.0 / 60.0;
        let id = mgr.register_loop("physics", fixed, CatchUpMode::FireAndForget);
        mgr.update(1, fixed);
        assert_eq!(mgr.loop_ref(id).unwrap().last_executed_frame(), 1);
        mgr.update(2, 0.0);
        // No accumulator left to clear, so frame 2 never executes and the
        // bookkeeping should still point at frame 1.
        assert_eq!(mgr.loop_ref(id).unwrap().last_executed_frame(), 1);
    }
}
