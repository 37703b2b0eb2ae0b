//! # Haptic Tool
//!
//! Control loop of a 3-DOF haptic tool: a virtual sphere driven by a
//! physical device that renders contact forces back to the operator's hand.
//!
//! ## Cycle
//!
//! 1. **Pose**: read the device, scale normalized readings into the tool
//!    frame and place the tool frame in the world ([`frame`], [`state`]).
//! 2. **Forces**: evaluate every [`force::ForceSource`] at the global
//!    position and sum them ([`force::ForceComposer`]).
//! 3. **Output**: rotate the force back into the device frame, gate it
//!    with the [`safety::StartupRamp`] and the enable flag, and send it.
//!
//! [`controller::ToolController`] owns all of this; [`cycle::HapticLoop`]
//! runs it at a fixed rate.
//!
//! ```rust
//! use haptic_common::prelude::*;
//! use haptic_tool::controller::ToolController;
//! use haptic_tool::force::ProxyPointForce;
//! use std::sync::Arc;
//!
//! let world: Arc<dyn World> = Arc::new(Scene::new().with_plane(Plane::new(Vec3::zeros(), Vec3::z())));
//! let mut tool = ToolController::new(world)
//!     .with_device(Box::new(haptic_hal::SimulationDevice::default()));
//! tool.add_force_source(Box::new(ProxyPointForce::new(400.0)));
//!
//! tool.initialize()?;
//! tool.start()?;
//! tool.run_cycle()?;
//! tool.stop()?;
//! # Ok::<(), haptic_tool::error::ToolError>(())
//! ```

pub mod config;
pub mod controller;
pub mod cycle;
pub mod error;
pub mod force;
pub mod frame;
pub mod safety;
pub mod state;
