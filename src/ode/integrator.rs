use crate::ode::{Model, PhaseState};

pub trait Integrator<M: Model> {
  type Settings: Clone;

  fn new(settings: Self::Settings) -> Self;

  /// Position and velocity one `time_step` after `state`.
  fn step_internal(
    &mut self,
    model: &M,
    state: &PhaseState<M::S>,
    time_step: M::S,
  ) -> (M::S, M::S);

  fn step(
    &mut self,
    model: &M,
    state: &PhaseState<M::S>,
    time_step: M::S,
  ) -> PhaseState<M::S> {
    let (x, v) = self.step_internal(model, state, time_step);

    PhaseState::new(state.t + time_step, x, v)
  }

  fn n_steps(
    &mut self,
    model: &M,
    state: &PhaseState<M::S>,
    time_step: M::S,
    steps: usize,
  ) -> PhaseState<M::S> {
    let mut state = *state;
    for _ in 0..steps {
      state = self.step(model, &state, time_step);
    }
    state
  }
}
