pub mod integrator;
pub mod model;
pub mod null_settings;
pub mod rk4;
pub mod state;

pub use integrator::Integrator;
pub use model::Model;
pub use null_settings::NullSettings;
pub use rk4::{RK4Settings, RK4};
pub use state::PhaseState;
