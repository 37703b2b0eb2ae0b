//! Haptic Common Library
//!
//! Contracts shared by every crate in the haptic tool workspace.
//!
//! # Module Structure
//!
//! - [`device`] - `HapticDevice` trait implemented by device drivers
//! - [`world`] - `World` trait queried by force algorithms, plus the
//!   reference [`world::Scene`]
//! - [`config`] - TOML configuration loading traits and types
//! - [`consts`] - Workspace-wide constants
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use haptic_common::prelude::*;
//!
//! let scene = Scene::new().with_plane(Plane::new(Vec3::zeros(), Vec3::z()));
//! assert_eq!(scene.planes().len(), 1);
//! ```

pub mod config;
pub mod consts;
pub mod device;
pub mod prelude;
pub mod world;

/// Three-component vector used for positions, velocities and forces.
pub type Vec3 = nalgebra::Vector3<f64>;

/// 3×3 matrix used for orientations.
pub type Mat3 = nalgebra::Matrix3<f64>;
