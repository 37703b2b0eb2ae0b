//! Safety module root.
//!
//! Gates applied to commanded forces before they reach the device.

pub mod ramp;

pub use ramp::{RampState, StartupRamp};
