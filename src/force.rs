use crate::error::ConfigError;
use crate::ode::Model;
use serde::{Deserialize, Serialize};

/// Linear force law `F(t, x, v) = drive * t - stiffness * x - damping * v`
/// acting on a body of the given mass.
///
/// The default is a lightly damped unit harmonic oscillator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForceLaw {
  pub drive: f64,
  pub stiffness: f64,
  pub damping: f64,
  pub mass: f64,
}

impl Default for ForceLaw {
  fn default() -> Self {
    Self {
      drive: 0.0,
      stiffness: 1.0,
      damping: 0.01,
      mass: 1.0,
    }
  }
}

impl ForceLaw {
  pub fn force(&self, t: f64, x: f64, v: f64) -> f64 {
    self.drive * t - self.stiffness * x - self.damping * v
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    for &(field, value) in [
      ("drive", self.drive),
      ("stiffness", self.stiffness),
      ("damping", self.damping),
      ("mass", self.mass),
    ]
    .iter()
    {
      if !value.is_finite() {
        return Err(ConfigError::NonFiniteForceCoefficient {
          field,
          value,
        });
      }
    }

    if self.mass == 0.0 {
      return Err(ConfigError::ZeroMass);
    }

    Ok(())
  }
}

impl Model for ForceLaw {
  type S = f64;

  fn acceleration(&self, t: f64, x: f64, v: f64) -> f64 {
    self.force(t, x, v) / self.mass
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::assert_float_eq;

  #[test]
  fn default_is_damped_oscillator() {
    let law = ForceLaw::default();
    assert_float_eq!(law.acceleration(3.0, 2.0, -1.0), -2.0 + 0.01, 1e-12);
  }

  #[test]
  fn acceleration_divides_by_mass() {
    let law = ForceLaw {
      drive: 1.0,
      stiffness: 2.0,
      damping: 0.5,
      mass: 4.0,
    };
    assert_float_eq!(law.force(2.0, 1.0, 2.0), -1.0, 1e-12);
    assert_float_eq!(law.acceleration(2.0, 1.0, 2.0), -0.25, 1e-12);
  }

  #[test]
  fn rejects_zero_mass() {
    let law = ForceLaw {
      mass: 0.0,
      ..ForceLaw::default()
    };
    assert_eq!(law.validate(), Err(ConfigError::ZeroMass));
  }

  #[test]
  fn rejects_non_finite_coefficients() {
    let law = ForceLaw {
      damping: std::f64::NAN,
      ..ForceLaw::default()
    };
    match law.validate() {
      Err(ConfigError::NonFiniteForceCoefficient { field, .. }) => {
        assert_eq!(field, "damping")
      }
      other => panic!("unexpected {:?}", other),
    }
  }
}
