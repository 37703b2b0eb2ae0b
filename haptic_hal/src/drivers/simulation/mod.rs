//! Simulation device module.
//!
//! Software device that replays a scripted trajectory, for development and
//! testing without physical hardware.

mod device;
mod trajectory;

pub use device::{SimulationConfig, SimulationDevice};
pub use trajectory::Trajectory;

use haptic_common::device::HapticDevice;

/// Factory function to create a simulation device with default settings.
pub fn create_device() -> Box<dyn HapticDevice> {
    Box::new(SimulationDevice::default())
}
