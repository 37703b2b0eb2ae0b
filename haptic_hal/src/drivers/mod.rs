//! Haptic device implementations.
//!
//! - [`simulation`] - Scripted software device for development and testing
//!
//! # Adding New Devices
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement the `HapticDevice` trait from `haptic_common::device`
//! 3. Register its factory in [`register_all`]

pub mod simulation;

use crate::device_registry::DeviceRegistry;
use tracing::warn;

/// Register every built-in device with `registry`.
///
/// Names already present in `registry` are left untouched.
pub fn register_all(registry: &mut DeviceRegistry) {
    if let Err(e) = registry.register(simulation::SimulationDevice::NAME, simulation::create_device) {
        warn!("Skipping built-in device: {}", e);
    }
}
