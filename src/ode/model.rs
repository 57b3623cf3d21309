use alga::general::RealField;

/// Right-hand side of `x''(t) = f(t, x, x'(t))`.
pub trait Model {
  type S: RealField + From<f32>;

  /// Acceleration at time `t` for position `x` and velocity `v`.
  fn acceleration(&self, t: Self::S, x: Self::S, v: Self::S) -> Self::S;
}

impl<F> Model for F
where
  F: Fn(f64, f64, f64) -> f64,
{
  type S = f64;

  fn acceleration(&self, t: f64, x: f64, v: f64) -> f64 {
    self(t, x, v)
  }
}
