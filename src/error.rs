//! Error types for the integrator and its I/O boundary.

use crate::ode::PhaseState;
use thiserror::Error;

/// Rejected run configuration. Raised before any integration step is taken.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
  #[error("time step must be finite and positive, got {0}")]
  InvalidTimeStep(f64),

  #[error("total time must be finite and positive, got {0}")]
  InvalidTotalTime(f64),

  #[error("output interval must be at least 1")]
  ZeroOutputInterval,

  #[error(
    "total time {total_time} with time step {time_step} needs more steps than can be counted"
  )]
  StepCountOverflow { time_step: f64, total_time: f64 },

  #[error("initial conditions must be finite, got {0:?}")]
  NonFiniteInitialConditions(PhaseState<f64>),

  #[error("force law {field} must be finite, got {value}")]
  NonFiniteForceCoefficient { field: &'static str, value: f64 },

  #[error("force law mass must be nonzero")]
  ZeroMass,
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("configuration error: {0}")]
  Config(#[from] ConfigError),

  #[error("non-finite value in sample {index}: {sample:?}")]
  NonFinite {
    index: usize,
    sample: PhaseState<f64>,
  },

  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),

  #[error("YAML error: {0}")]
  Yaml(#[from] serde_yaml::Error),

  #[error("image error: {0}")]
  Image(#[from] image::ImageError),

  #[error("malformed trajectory row at line {line}: {content:?}")]
  Parse { line: usize, content: String },

  #[error("cannot plot an empty trajectory")]
  EmptyTrajectory,

  #[error("{width}x{height} leaves no room for a plot")]
  PlotTooSmall { width: u32, height: u32 },
}

pub type Result<T> = std::result::Result<T, Error>;
