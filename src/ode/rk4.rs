use crate::ode::{Integrator, Model, NullSettings, PhaseState};
use std::marker::PhantomData;

pub type RK4Settings = NullSettings;

/// Classical fourth order Runge-Kutta applied to the first order pair
/// `x' = v`, `v' = f(t, x, v)`.
///
/// `k` stages are position increments and `l` stages are velocity
/// increments. Each stage is evaluated from both increments of the stage
/// before it.
pub fn step<M: Model>(
  model: &M,
  t: M::S,
  x: M::S,
  v: M::S,
  h: M::S,
) -> (M::S, M::S) {
  let half: M::S = 0.5.into();
  let two: M::S = 2.0.into();
  let six: M::S = 6.0.into();

  let k0 = h * v;
  let l0 = h * model.acceleration(t, x, v);

  let k1 = h * (v + half * l0);
  let l1 = h * model.acceleration(t + half * h, x + half * k0, v + half * l0);

  let k2 = h * (v + half * l1);
  let l2 = h * model.acceleration(t + half * h, x + half * k1, v + half * l1);

  let k3 = h * (v + l2);
  let l3 = h * model.acceleration(t + h, x + k2, v + l2);

  let x_new = x + (k0 + two * (k1 + k2) + k3) / six;
  let v_new = v + (l0 + two * (l1 + l2) + l3) / six;

  (x_new, v_new)
}

pub struct RK4<M: Model> {
  model: PhantomData<M>,
}

impl<M: Model> Integrator<M> for RK4<M> {
  type Settings = RK4Settings;

  fn new(_: Self::Settings) -> Self {
    Self { model: PhantomData }
  }

  fn step_internal(
    &mut self,
    model: &M,
    state: &PhaseState<M::S>,
    time_step: M::S,
  ) -> (M::S, M::S) {
    step(model, state.t, state.x, state.v, time_step)
  }
}
