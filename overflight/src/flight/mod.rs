//! Flight model: control inputs, vehicle state and the per-frame integrator.

mod controls;
mod dynamics;
mod state;

pub use controls::ControlInputs;
pub use dynamics::FlightDynamics;
pub use state::{Attitude, VehicleState};
