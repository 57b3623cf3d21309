use alga::general::RealField;

/// Independent variable, position and velocity of a scalar second-order
/// system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhaseState<S: RealField> {
  pub t: S,
  pub x: S,
  pub v: S,
}

impl<S: RealField> PhaseState<S> {
  pub fn new(t: S, x: S, v: S) -> Self {
    Self { t, x, v }
  }
}

impl PhaseState<f64> {
  pub fn is_finite(&self) -> bool {
    self.t.is_finite() && self.x.is_finite() && self.v.is_finite()
  }
}
