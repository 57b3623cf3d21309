pub mod config;
pub mod error;
pub mod force;
pub mod ode;
pub mod output;
pub mod plot;
pub mod run;
pub mod trajectory;
pub mod utils;

pub use config::{load_scenario, InitialConditions, RunConfig, Scenario};
pub use error::{ConfigError, Error, Result};
pub use force::ForceLaw;
pub use output::{load_table, save_table, TableSink, TrajectorySink};
pub use plot::PlotSink;
pub use run::run;
pub use trajectory::{
  integrate, integrate_with, sample_count, IntegrationParams, Sample,
  TimeAdvance, Trajectory,
};
