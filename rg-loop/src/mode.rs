//! Catch-up policies for a fixed-timestep loop (spec §4.11).

/// How a loop reconciles an accumulator that has drifted past its fixed
/// timestep.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CatchUpMode {
    /// Consume the whole accumulator in a single oversized step.
    FireAndForget,
    /// Take exactly one fixed-size step per `update`, banking the
    /// remainder as diagnostic debt rather than draining it.
    SingleCorrectiveStep,
    /// Take as many fixed-size steps as fit in the accumulator. The number
    /// of steps an update can ever emit is bounded by the loop's own
    /// `max_catch_up / fixed_timestep` (plus one for the remainder), since
    /// the accumulator itself is never allowed to exceed `max_catch_up`
    /// before the stepping loop runs — this is purely a safety bound
    /// against a pathologically small `fixed_timestep`, not a tunable.
    MultipleSteps,
}

impl Default for CatchUpMode {
    fn default() -> Self {
        CatchUpMode::MultipleSteps
    }
}
