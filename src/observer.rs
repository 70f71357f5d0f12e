//! Hooks into the phases of a world step.

/// Notified as [`World::step_observed`](crate::world::World::step_observed)
/// moves through a step. Useful for drawing intermediate states or timing
/// phases. Every method defaults to doing nothing.
pub trait StepObserver {
    /// Behaviors (gravity included) have queued their displacements.
    fn on_behaviors(&mut self) {}

    /// Every particle has been integrated.
    fn on_integrate(&mut self) {}

    /// One relaxation pass over all springs finished.
    fn on_spring_iteration(&mut self, _iteration: usize) {}

    /// Constraints and world bounds have been applied.
    fn on_constraints(&mut self) {}

    /// The step finished; `step` is the new step count.
    fn on_step_complete(&mut self, _step: u64) {}
}

/// Observer used by [`World::step`](crate::world::World::step).
pub struct NoOpStepObserver;

impl StepObserver for NoOpStepObserver {}
