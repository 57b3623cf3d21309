use crate::error::{ConfigError, Result};
use crate::ode::{Integrator, Model, PhaseState, RK4Settings, RK4};
use std::slice::Iter;

#[cfg(test)]
use crate::assert_float_eq;
#[cfg(test)]
use proptest::prelude::*;
#[cfg(test)]
use proptest_derive::Arbitrary;

pub type S = f64;

pub type Sample = PhaseState<S>;

/// How the independent variable is carried from step to step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(test, derive(Arbitrary))]
pub enum TimeAdvance {
  /// `t = t0 + n * h` after the `n`th step, free of summation drift.
  Analytic,
  /// `t += h` after every step.
  Accumulated,
}

impl Default for TimeAdvance {
  fn default() -> Self {
    TimeAdvance::Analytic
  }
}

#[derive(Clone, Debug, PartialEq)]
pub struct IntegrationParams {
  pub time_step: S,
  pub total_time: S,
  /// Internal steps between recorded samples.
  pub output_interval: usize,
  pub time_advance: TimeAdvance,
}

impl IntegrationParams {
  pub fn new(time_step: S, total_time: S, output_interval: usize) -> Self {
    Self {
      time_step,
      total_time,
      output_interval,
      time_advance: TimeAdvance::default(),
    }
  }

  pub fn validate(&self) -> std::result::Result<(), ConfigError> {
    if !(self.time_step.is_finite() && self.time_step > 0.0) {
      return Err(ConfigError::InvalidTimeStep(self.time_step));
    }
    if !(self.total_time.is_finite() && self.total_time > 0.0) {
      return Err(ConfigError::InvalidTotalTime(self.total_time));
    }
    if self.output_interval == 0 {
      return Err(ConfigError::ZeroOutputInterval);
    }
    Ok(())
  }

  pub fn total_steps(&self) -> S {
    self.total_time / self.time_step
  }
}

/// Number of samples a run records, the initial condition included.
///
/// Only whole output intervals are integrated, so a remainder of
/// `total_time` shorter than `time_step * output_interval` is dropped.
pub fn sample_count(
  params: &IntegrationParams,
) -> std::result::Result<usize, ConfigError> {
  params.validate()?;

  let overflow = || ConfigError::StepCountOverflow {
    time_step: params.time_step,
    total_time: params.total_time,
  };

  let intervals = (params.total_steps() / params.output_interval as S).floor();
  if !intervals.is_finite() || intervals >= std::usize::MAX as S {
    return Err(overflow());
  }

  let intervals = intervals as usize;
  intervals
    .checked_mul(params.output_interval)
    .ok_or_else(overflow)?;

  Ok(intervals + 1)
}

/// Ordered samples of a run. Index 0 is the initial condition.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Trajectory {
  samples: Vec<Sample>,
}

impl Trajectory {
  pub fn from_samples(samples: Vec<Sample>) -> Self {
    Self { samples }
  }

  pub fn len(&self) -> usize {
    self.samples.len()
  }

  pub fn is_empty(&self) -> bool {
    self.samples.is_empty()
  }

  pub fn samples(&self) -> &[Sample] {
    &self.samples
  }

  pub fn last(&self) -> Option<&Sample> {
    self.samples.last()
  }

  pub fn iter(&self) -> Iter<'_, Sample> {
    self.samples.iter()
  }

  pub fn times(&self) -> Vec<S> {
    self.samples.iter().map(|s| s.t).collect()
  }

  pub fn positions(&self) -> Vec<S> {
    self.samples.iter().map(|s| s.x).collect()
  }

  pub fn velocities(&self) -> Vec<S> {
    self.samples.iter().map(|s| s.v).collect()
  }

  /// First sample holding a NaN or infinity.
  pub fn first_non_finite(&self) -> Option<(usize, &Sample)> {
    self.samples.iter().enumerate().find(|(_, s)| !s.is_finite())
  }
}

impl<'a> IntoIterator for &'a Trajectory {
  type Item = &'a Sample;

  type IntoIter = Iter<'a, Sample>;

  #[inline]
  fn into_iter(self) -> Self::IntoIter {
    self.samples.iter()
  }
}

pub fn integrate<M: Model<S = S>>(
  initial: Sample,
  params: &IntegrationParams,
  model: &M,
) -> Result<Trajectory> {
  integrate_with(
    initial,
    params,
    model,
    &mut RK4::new(RK4Settings {}),
    |_, _| {},
  )
}

/// Runs `integrator` from `initial`, recording a sample every
/// `params.output_interval` steps and handing each recorded sample to
/// `on_sample` as it is produced.
///
/// Non-finite values produced by `model` are carried into the trajectory
/// unchanged.
pub fn integrate_with<M, I, F>(
  initial: Sample,
  params: &IntegrationParams,
  model: &M,
  integrator: &mut I,
  mut on_sample: F,
) -> Result<Trajectory>
where
  M: Model<S = S>,
  I: Integrator<M>,
  F: FnMut(usize, &Sample),
{
  let count = sample_count(params)?;
  if !initial.is_finite() {
    return Err(ConfigError::NonFiniteInitialConditions(initial).into());
  }

  let time_step = params.time_step;

  let mut samples = Vec::with_capacity(count.min(1 << 20));
  samples.push(initial);
  on_sample(0, &initial);

  let mut state = initial;
  let mut steps_taken: usize = 0;

  for index in 1..count {
    for _ in 0..params.output_interval {
      state = integrator.step(model, &state, time_step);
      steps_taken += 1;

      if params.time_advance == TimeAdvance::Analytic {
        state.t = initial.t + steps_taken as S * time_step;
      }
    }

    samples.push(state);
    on_sample(index, &state);
  }

  Ok(Trajectory::from_samples(samples))
}

#[cfg(test)]
fn free(_: S, _: S, _: S) -> S {
  0.0
}

#[cfg(test)]
fn damped(_: S, x: S, v: S) -> S {
  -x - 0.01 * v
}

#[cfg(test)]
struct CountingIntegrator {
  steps: usize,
}

#[cfg(test)]
impl<M: Model<S = S>> Integrator<M> for CountingIntegrator {
  type Settings = ();

  fn new(_: ()) -> Self {
    Self { steps: 0 }
  }

  fn step_internal(
    &mut self,
    _: &M,
    state: &Sample,
    _: S,
  ) -> (S, S) {
    self.steps += 1;
    (state.x, state.v)
  }
}

#[test]
fn minimal_run() {
  let trajectory = integrate(
    PhaseState::new(0.0, 0.0, 2.0),
    &IntegrationParams::new(1.0, 1.0, 1),
    &free,
  )
  .unwrap();

  assert_eq!(trajectory.len(), 2);
  assert_eq!(trajectory.samples()[1], PhaseState::new(1.0, 2.0, 2.0));
}

#[test]
fn sample_count_follows_floor_law() {
  assert_eq!(sample_count(&IntegrationParams::new(0.1, 10.0, 10)), Ok(11));
  assert_eq!(sample_count(&IntegrationParams::new(0.1, 100.0, 10)), Ok(101));
  assert_eq!(sample_count(&IntegrationParams::new(1.0, 0.5, 1)), Ok(1));
  assert_eq!(sample_count(&IntegrationParams::new(0.5, 5.0, 3)), Ok(4));
}

#[test]
fn zero_output_interval_fails_fast() {
  let mut integrator = CountingIntegrator { steps: 0 };
  let result = integrate_with(
    PhaseState::new(0.0, 0.0, 2.0),
    &IntegrationParams::new(0.1, 10.0, 0),
    &free,
    &mut integrator,
    |_, _| panic!("no sample expected"),
  );

  assert!(matches!(
    result,
    Err(crate::Error::Config(ConfigError::ZeroOutputInterval))
  ));
  assert_eq!(integrator.steps, 0);
}

#[test]
fn rejects_degenerate_spans() {
  assert_eq!(
    sample_count(&IntegrationParams::new(0.0, 10.0, 1)),
    Err(ConfigError::InvalidTimeStep(0.0))
  );
  assert_eq!(
    sample_count(&IntegrationParams::new(-0.1, 10.0, 1)),
    Err(ConfigError::InvalidTimeStep(-0.1))
  );
  assert_eq!(
    sample_count(&IntegrationParams::new(0.1, 0.0, 1)),
    Err(ConfigError::InvalidTotalTime(0.0))
  );
  assert!(matches!(
    sample_count(&IntegrationParams::new(1e-300, 1e300, 1)),
    Err(ConfigError::StepCountOverflow { .. })
  ));
}

#[test]
fn rejects_non_finite_initial_conditions() {
  let result = integrate(
    PhaseState::new(0.0, std::f64::NAN, 2.0),
    &IntegrationParams::new(0.1, 1.0, 1),
    &free,
  );
  assert!(matches!(
    result,
    Err(crate::Error::Config(ConfigError::NonFiniteInitialConditions(_)))
  ));
}

#[test]
fn remainder_steps_are_not_taken() {
  let mut integrator = CountingIntegrator { steps: 0 };
  let mut seen = Vec::new();
  let trajectory = integrate_with(
    PhaseState::new(0.0, 1.0, 0.0),
    &IntegrationParams::new(0.5, 5.25, 3),
    &free,
    &mut integrator,
    |index, _| seen.push(index),
  )
  .unwrap();

  // 10.5 steps requested, three whole intervals of three steps
  assert_eq!(trajectory.len(), 4);
  assert_eq!(integrator.steps, 9);
  assert_eq!(seen, vec![0, 1, 2, 3]);
  assert_eq!(trajectory.last().unwrap().t, 4.5);
}

#[test]
fn constant_acceleration_is_exact() {
  let c = -9.81;
  let (x0, v0) = (1.0, 4.0);
  let trajectory = integrate(
    PhaseState::new(0.0, x0, v0),
    &IntegrationParams::new(0.1, 3.0, 5),
    &|_: S, _: S, _: S| c,
  )
  .unwrap();

  assert_eq!(trajectory.len(), 7);
  for sample in &trajectory {
    let t = sample.t;
    let x = x0 + v0 * t + 0.5 * c * t * t;
    assert_float_eq!(sample.x, x, 1e-9 * x.abs().max(1.0));
    assert_float_eq!(sample.v, v0 + c * t, 1e-9 * (v0 + c * t).abs().max(1.0));
  }
}

#[test]
fn first_stage_sees_start_of_step_time() {
  let first_t = std::cell::Cell::new(None);
  integrate(
    PhaseState::new(0.25, 0.0, 2.0),
    &IntegrationParams::new(0.1, 1.0, 1),
    &|t: S, _: S, _: S| {
      if first_t.get().is_none() {
        first_t.set(Some(t));
      }
      0.0
    },
  )
  .unwrap();

  assert_eq!(first_t.get(), Some(0.25));
}

#[test]
fn time_dependent_drive_is_exact() {
  let force = crate::ForceLaw {
    drive: 1.0,
    stiffness: 0.0,
    damping: 0.0,
    mass: 1.0,
  };
  let (x0, v0) = (0.5, 2.0);
  let trajectory = integrate(
    PhaseState::new(0.0, x0, v0),
    &IntegrationParams::new(0.1, 5.0, 5),
    &force,
  )
  .unwrap();

  assert_eq!(trajectory.len(), 11);
  for sample in &trajectory {
    let t = sample.t;
    let x = x0 + v0 * t + t * t * t / 6.0;
    let v = v0 + t * t / 2.0;
    assert_float_eq!(sample.x, x, 1e-9 * x.abs().max(1.0));
    assert_float_eq!(sample.v, v, 1e-9 * v.abs().max(1.0));
  }
}

#[test]
fn damped_oscillator_decays_with_period_two_pi() {
  let initial = PhaseState::new(0.0, 0.0, 2.0);
  let trajectory =
    integrate(initial, &IntegrationParams::new(0.1, 10.0, 10), &damped)
      .unwrap();
  assert_eq!(trajectory.len(), 11);

  let omega = (1.0f64 - 0.005 * 0.005).sqrt();
  for sample in &trajectory {
    let envelope = 2.0 * (-0.005 * sample.t).exp();
    assert!(sample.x.abs() <= 1.01 * envelope);
    assert!(sample.v.abs() <= 1.01 * envelope);

    let exact = 2.0 / omega * (-0.005 * sample.t).exp() * (omega * sample.t).sin();
    assert_float_eq!(sample.x, exact, 1e-4);
  }

  // (x^2 + v^2) / 2 only ever loses energy to damping
  let energies: Vec<S> = trajectory
    .iter()
    .map(|s| 0.5 * (s.x * s.x + s.v * s.v))
    .collect();
  for pair in energies.windows(2) {
    assert!(pair[1] <= pair[0]);
  }

  let fine =
    integrate(initial, &IntegrationParams::new(0.01, 10.0, 1), &damped)
      .unwrap();
  let upward_crossing = fine
    .samples()
    .windows(2)
    .skip(1)
    .find(|pair| pair[0].x < 0.0 && pair[1].x >= 0.0)
    .map(|pair| {
      let frac = -pair[0].x / (pair[1].x - pair[0].x);
      pair[0].t + frac * (pair[1].t - pair[0].t)
    })
    .unwrap();
  assert_float_eq!(upward_crossing, 2.0 * std::f64::consts::PI, 1e-2);
}

#[test]
fn analytic_time_is_reconstructed_per_sample() {
  let initial = PhaseState::new(0.25, 0.0, 2.0);
  let mut params = IntegrationParams::new(0.1, 100.0, 7);
  let analytic = integrate(initial, &params, &damped).unwrap();

  for (i, sample) in analytic.iter().enumerate() {
    assert_eq!(sample.t, 0.25 + (i * 7) as S * 0.1);
  }

  params.time_advance = TimeAdvance::Accumulated;
  let accumulated = integrate(initial, &params, &damped).unwrap();
  assert_eq!(accumulated.len(), analytic.len());
  for (a, b) in accumulated.iter().zip(&analytic) {
    assert_float_eq!(a.t, b.t, 1e-9);
    // steps are evaluated from the same start times up to summation drift
    assert_float_eq!(a.x, b.x, 1e-9);
  }
}

#[test]
fn runs_are_deterministic() {
  let initial = PhaseState::new(0.0, 0.3, -1.0);
  let params = IntegrationParams::new(0.05, 20.0, 4);
  assert_eq!(
    integrate(initial, &params, &damped).unwrap(),
    integrate(initial, &params, &damped).unwrap()
  );
}

#[test]
fn non_finite_forces_propagate() {
  let trajectory = integrate(
    PhaseState::new(0.0, 1.0, 0.0),
    &IntegrationParams::new(0.1, 1.0, 1),
    &|t: S, _: S, _: S| if t > 0.42 { std::f64::NAN } else { 0.0 },
  )
  .unwrap();

  let (index, sample) = trajectory.first_non_finite().unwrap();
  assert_eq!(index, 5);
  assert!(sample.v.is_nan());
}

#[cfg(test)]
proptest! {
#[test]
fn sample_count_law(
  time_step in 0.01f64..1.0,
  total_time in 0.1f64..50.0,
  output_interval in 1usize..20,
  time_advance: TimeAdvance,
) {
  let initial = PhaseState::new(1.0, -0.5, 0.75);
  let params = IntegrationParams {
    time_step,
    total_time,
    output_interval,
    time_advance,
  };
  let trajectory = integrate(initial, &params, &damped).unwrap();

  let expected =
    ((total_time / time_step) / output_interval as f64).floor() as usize + 1;
  prop_assert_eq!(trajectory.len(), expected);
  prop_assert_eq!(trajectory.samples()[0], initial);

  let spacing = time_step * output_interval as f64;
  for pair in trajectory.samples().windows(2) {
    prop_assert!(pair[0].t < pair[1].t);
    prop_assert!(((pair[1].t - pair[0].t) - spacing).abs() < 1e-9);
  }
}

#[test]
fn uniform_motion_without_force(
  time_step in 0.01f64..1.0,
  total_time in 0.1f64..20.0,
  output_interval in 1usize..10,
  x0 in -10.0f64..10.0,
  v0 in -10.0f64..10.0,
) {
  let trajectory = integrate(
    PhaseState::new(0.0, x0, v0),
    &IntegrationParams::new(time_step, total_time, output_interval),
    &free,
  )
  .unwrap();

  for sample in &trajectory {
    prop_assert!((sample.x - (x0 + v0 * sample.t)).abs() < 1e-9);
    prop_assert_eq!(sample.v, v0);
  }
}
}
