use clap::Parser;
use indicatif::{ProgressBar, ProgressDrawTarget};
use rk4_ode2::{
  load_scenario, sample_count, Error, IntegrationParams, RunConfig, Scenario,
  TimeAdvance,
};
use std::path::PathBuf;
use std::process;

/// Integrates x''(t) = f(t, x, v) with fourth order Runge-Kutta and writes
/// the sampled trajectory as a `t x v` table.
#[derive(Parser)]
#[command(version = "1.0", author = "Ryan G.")]
struct Opts {
  /// Integration time step
  #[arg(allow_negative_numbers = true)]
  time_step: f64,

  /// Total simulated time
  #[arg(allow_negative_numbers = true)]
  total_time: f64,

  /// Internal steps between written samples
  output_interval: usize,

  /// YAML scenario with initial conditions and force law
  #[arg(short = 'c', long = "config")]
  config: Option<PathBuf>,

  #[arg(short = 'o', long = "output", default_value = "RK4_2_output.txt")]
  output: PathBuf,

  #[arg(short = 'p', long = "plot-dir", default_value = ".")]
  plot_dir: PathBuf,

  #[arg(long = "no-plot")]
  no_plot: bool,

  /// Advance t by repeated addition instead of t0 + n * h
  #[arg(long = "accumulate-time")]
  accumulate_time: bool,

  #[arg(short = 'q', long = "quiet")]
  quiet: bool,
}

impl Opts {
  fn run_config(&self) -> Result<RunConfig, Error> {
    let scenario = match &self.config {
      Some(path) => load_scenario(path)?,
      None => Scenario::default(),
    };

    Ok(RunConfig {
      params: IntegrationParams {
        time_step: self.time_step,
        total_time: self.total_time,
        output_interval: self.output_interval,
        time_advance: if self.accumulate_time {
          TimeAdvance::Accumulated
        } else {
          TimeAdvance::Analytic
        },
      },
      scenario,
      output: self.output.clone(),
      plot_dir: if self.no_plot {
        None
      } else {
        Some(self.plot_dir.clone())
      },
    })
  }
}

fn run(opts: &Opts) -> Result<(), Error> {
  let config = opts.run_config()?;
  config.validate()?;
  let samples = sample_count(&config.params)?;

  println!("Running Runge-Kutta with the following parameters:");
  println!(
    "Time step: {}\tTotal time: {}\t",
    config.params.time_step, config.params.total_time
  );
  println!("Output interval: {}", config.params.output_interval);

  let p_bar = ProgressBar::new(samples as u64);
  if opts.quiet {
    p_bar.set_draw_target(ProgressDrawTarget::hidden());
  }

  let trajectory = rk4_ode2::run(&config, |_, _| p_bar.inc(1))?;
  p_bar.finish();

  eprintln!(
    "wrote {} samples to {}",
    trajectory.len(),
    config.output.display()
  );
  if let Some(plot_dir) = &config.plot_dir {
    eprintln!("wrote plots to {}", plot_dir.display());
  }

  Ok(())
}

fn main() {
  let opts: Opts = Opts::parse();

  if let Err(err) = run(&opts) {
    eprintln!("error: {}", err);
    process::exit(1);
  }
}
