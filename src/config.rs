use crate::error::{ConfigError, Result};
use crate::force::ForceLaw;
use crate::trajectory::{IntegrationParams, Sample};
use serde::{Deserialize, Serialize};
use serde_yaml::from_reader;
use std::fs::File;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InitialConditions {
  pub t0: f64,
  pub x0: f64,
  pub v0: f64,
}

impl Default for InitialConditions {
  fn default() -> Self {
    Self {
      t0: 0.0,
      x0: 0.0,
      v0: 2.0,
    }
  }
}

impl InitialConditions {
  pub fn state(&self) -> Sample {
    Sample::new(self.t0, self.x0, self.v0)
  }
}

/// Per-run physical setup: where the body starts and what acts on it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Scenario {
  pub initial: InitialConditions,
  pub force: ForceLaw,
}

pub fn load_scenario(path: &Path) -> Result<Scenario> {
  let file = File::open(path)?;
  let scenario: Scenario = from_reader(file)?;
  Ok(scenario)
}

pub fn parse_scenario(source: &str) -> Result<Scenario> {
  Ok(serde_yaml::from_str(source)?)
}

/// Everything a run needs, assembled once before integration starts.
#[derive(Clone, Debug)]
pub struct RunConfig {
  pub params: IntegrationParams,
  pub scenario: Scenario,
  pub output: PathBuf,
  /// Directory for rendered plots, `None` to skip plotting.
  pub plot_dir: Option<PathBuf>,
}

impl RunConfig {
  pub fn validate(&self) -> std::result::Result<(), ConfigError> {
    self.params.validate()?;

    let initial = self.scenario.initial.state();
    if !initial.is_finite() {
      return Err(ConfigError::NonFiniteInitialConditions(initial));
    }

    self.scenario.force.validate()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::Error;

  #[test]
  fn defaults_match_reference_run() {
    let scenario = Scenario::default();
    assert_eq!(scenario.initial.state(), Sample::new(0.0, 0.0, 2.0));
    assert_eq!(scenario.force, ForceLaw::default());
  }

  #[test]
  fn partial_yaml_keeps_defaults() {
    let scenario = parse_scenario(
      "initial:\n  x0: 1.5\nforce:\n  damping: 0.2\n  mass: 2.0\n",
    )
    .unwrap();

    assert_eq!(scenario.initial.state(), Sample::new(0.0, 1.5, 2.0));
    assert_eq!(
      scenario.force,
      ForceLaw {
        damping: 0.2,
        mass: 2.0,
        ..ForceLaw::default()
      }
    );
  }

  #[test]
  fn unknown_keys_are_rejected() {
    assert!(matches!(
      parse_scenario("initial:\n  y0: 1.0\n"),
      Err(Error::Yaml(_))
    ));
  }

  #[test]
  fn missing_file_is_io_error() {
    assert!(matches!(
      load_scenario(Path::new("does/not/exist.yaml")),
      Err(Error::Io(_))
    ));
  }

  #[test]
  fn validate_checks_every_part() {
    let mut config = RunConfig {
      params: IntegrationParams::new(0.1, 10.0, 10),
      scenario: Scenario::default(),
      output: PathBuf::from("out.txt"),
      plot_dir: None,
    };
    assert_eq!(config.validate(), Ok(()));

    config.scenario.force.mass = 0.0;
    assert_eq!(config.validate(), Err(ConfigError::ZeroMass));

    config.scenario.initial.v0 = std::f64::INFINITY;
    assert!(matches!(
      config.validate(),
      Err(ConfigError::NonFiniteInitialConditions(_))
    ));

    config.params.output_interval = 0;
    assert_eq!(config.validate(), Err(ConfigError::ZeroOutputInterval));
  }
}
