//! Prelude module for common re-exports.
//!
//! ```rust
//! use haptic_common::prelude::*;
//! ```

use std::time::Duration;

// ─── Math ───────────────────────────────────────────────────────────
pub use crate::{Mat3, Vec3};

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};

// ─── Constants ──────────────────────────────────────────────────────
pub use crate::consts::{CYCLE_TIME_US, PROXY_RADIUS_SCALE, SMALL_FORCE_SQ};

// ─── Device ─────────────────────────────────────────────────────────
pub use crate::device::{CommandKind, DeviceError, DeviceFactory, HapticDevice};

// ─── World ──────────────────────────────────────────────────────────
pub use crate::world::{Contact, FieldSource, ObjectRef, Plane, Scene, Sphere, World};

/// Default haptic cycle time as Duration.
pub const DEFAULT_CYCLE_TIME: Duration = Duration::from_micros(CYCLE_TIME_US);
