use crate::config::RunConfig;
use crate::error::{Error, Result};
use crate::ode::{Integrator, RK4Settings, RK4};
use crate::output::{load_table, TableSink, TrajectorySink};
use crate::plot::PlotSink;
use crate::trajectory::{integrate_with, Sample, Trajectory};

/// Integrates `config`, then writes the table and, when a plot directory is
/// set, the plots drawn from that table.
///
/// Nothing is written unless the configuration is valid and every sample is
/// finite.
pub fn run<F>(config: &RunConfig, on_sample: F) -> Result<Trajectory>
where
  F: FnMut(usize, &Sample),
{
  config.validate()?;

  let trajectory = integrate_with(
    config.scenario.initial.state(),
    &config.params,
    &config.scenario.force,
    &mut RK4::new(RK4Settings {}),
    on_sample,
  )?;

  if let Some((index, sample)) = trajectory.first_non_finite() {
    return Err(Error::NonFinite {
      index,
      sample: *sample,
    });
  }

  let mut table = TableSink::new(&config.output);
  table.consume(&trajectory)?;

  if let Some(plot_dir) = &config.plot_dir {
    // plots are drawn from the table on disk
    PlotSink::new(plot_dir).consume(&load_table(table.path())?)?;
  }

  Ok(trajectory)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::Scenario;
  use crate::error::ConfigError;
  use crate::plot::{PHASE_SPACE_FILE, TIME_SERIES_FILE};
  use crate::trajectory::IntegrationParams;
  use std::env;
  use std::fs;
  use std::path::PathBuf;

  fn scratch(name: &str) -> PathBuf {
    env::temp_dir().join(format!("rk4_ode2_run_{}_{}", std::process::id(), name))
  }

  fn config(output: PathBuf, plot_dir: Option<PathBuf>) -> RunConfig {
    RunConfig {
      params: IntegrationParams::new(0.1, 10.0, 10),
      scenario: Scenario::default(),
      output,
      plot_dir,
    }
  }

  #[test]
  fn writes_table_and_plots() {
    let output = scratch("ok.txt");
    let plot_dir = scratch("ok_plots");
    let mut seen = 0;
    let trajectory =
      run(&config(output.clone(), Some(plot_dir.clone())), |_, _| seen += 1)
        .unwrap();

    assert_eq!(trajectory.len(), 11);
    assert_eq!(seen, 11);
    assert_eq!(load_table(&output).unwrap().len(), 11);
    assert!(plot_dir.join(TIME_SERIES_FILE).is_file());
    assert!(plot_dir.join(PHASE_SPACE_FILE).is_file());

    fs::remove_file(&output).unwrap();
    fs::remove_dir_all(&plot_dir).unwrap();
  }

  #[test]
  fn zero_output_interval_writes_nothing() {
    let output = scratch("zero_interval.txt");
    let plot_dir = scratch("zero_interval_plots");
    let mut config = config(output.clone(), Some(plot_dir.clone()));
    config.params.output_interval = 0;

    assert!(matches!(
      run(&config, |_, _| panic!("no sample expected")),
      Err(Error::Config(ConfigError::ZeroOutputInterval))
    ));
    assert!(!output.exists());
    assert!(!plot_dir.exists());
  }

  #[test]
  fn overflowing_force_writes_nothing() {
    let output = scratch("overflow.txt");
    let plot_dir = scratch("overflow_plots");
    let mut config = config(output.clone(), Some(plot_dir.clone()));
    config.params = IntegrationParams::new(0.1, 1.0, 10);
    config.scenario.force.stiffness = -1e300;

    assert!(matches!(
      run(&config, |_, _| {}),
      Err(Error::NonFinite { index: 1, .. })
    ));
    assert!(!output.exists());
    assert!(!plot_dir.exists());
  }
}
