//! # Haptic HAL Library
//!
//! Device implementations behind the `HapticDevice` trait defined in
//! `haptic_common::device`.
//!
//! # Module Structure
//!
//! - [`device_registry`] - Device factory registration
//! - [`drivers`] - Device implementations
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                haptic_hal (single crate)               │
//! │  ┌──────────────────┐         ┌─────────────────────┐  │
//! │  │  DeviceRegistry  │────────►│  HapticDevice       │  │
//! │  │  (name→factory)  │ creates │  (trait object)     │  │
//! │  └──────────────────┘         └──────────┬──────────┘  │
//! │                                          │             │
//! │                                          ▼             │
//! │                               ┌─────────────────────┐  │
//! │                               │  SimulationDevice   │  │
//! │                               └─────────────────────┘  │
//! └────────────────────────────────────────────────────────┘
//! ```

#![deny(missing_docs)]

pub mod device_registry;
pub mod drivers;

pub use crate::device_registry::{DeviceRegistry, RegistryError};
pub use crate::drivers::simulation::{SimulationConfig, SimulationDevice, Trajectory};
