//! Workspace-wide constants.
//!
//! Single source of truth for numeric defaults shared by the device,
//! world and tool crates.

/// Default haptic cycle time in microseconds (1 kHz).
pub const CYCLE_TIME_US: u64 = 1000;

/// Lower bound accepted for a configured cycle time [µs].
pub const MIN_CYCLE_TIME_US: u64 = 100;

/// Default display radius of the tool sphere [world units].
pub const DEFAULT_DISPLAY_RADIUS: f64 = 0.05;

/// Collision radius of the proxy relative to its display radius.
pub const PROXY_RADIUS_SCALE: f64 = 0.01;

/// Squared local force magnitude under which the startup ramp releases.
pub const SMALL_FORCE_SQ: f64 = 1e-6;

/// Tolerance used when checking that a matrix is orthonormal.
pub const ORTHONORMAL_TOLERANCE: f64 = 1e-6;

/// Maximum number of constraint planes the proxy resolves per cycle.
pub const MAX_PROXY_CONTACTS: usize = 3;

/// Default device name used when none is configured.
pub const DEFAULT_DEVICE: &str = "simulation";

static_assertions::const_assert!(MAX_PROXY_CONTACTS >= 1);
static_assertions::const_assert!(CYCLE_TIME_US >= MIN_CYCLE_TIME_US);
