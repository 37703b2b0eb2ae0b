//! Haptic device trait and error types.
//!
//! This module defines:
//! - `HapticDevice` trait - Interface for pluggable 3-DOF device drivers
//! - `DeviceError` enum - Error types for device operations
//! - `CommandKind` enum - The command channel kinds, for diagnostics
//! - `DeviceFactory` type alias - Factory function type

use crate::{Mat3, Vec3};
use std::fmt;
use thiserror::Error;

/// Kinds of command a device understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// Read the normalized position, each axis in `[-1, 1]`.
    GetPositionNormalized,
    /// Read the orientation of the end effector.
    GetRotationMatrix,
    /// Read the linear velocity in device-local coordinates.
    GetVelocity,
    /// Read the state of switch 0.
    GetSwitch0,
    /// Command a force in device-local coordinates.
    SetForce,
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::GetPositionNormalized => "GET_POSITION_NORMALIZED",
            Self::GetRotationMatrix => "GET_ROTATION_MATRIX",
            Self::GetVelocity => "GET_VELOCITY",
            Self::GetSwitch0 => "GET_SWITCH_0",
            Self::SetForce => "SET_FORCE",
        };
        f.write_str(name)
    }
}

/// Error types for device operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeviceError {
    /// A command was issued while the connection is closed.
    #[error("Device connection is not open")]
    NotOpen,

    /// Opening the connection failed.
    #[error("Open failed: {0}")]
    OpenFailed(String),

    /// Closing the connection failed.
    #[error("Close failed: {0}")]
    CloseFailed(String),

    /// Calibration / initialization failed.
    #[error("Initialization failed: {0}")]
    InitFailed(String),

    /// A command on the device channel failed.
    #[error("Command {kind} failed: {reason}")]
    CommandFailed {
        /// Command that failed.
        kind: CommandKind,
        /// Driver-supplied reason.
        reason: String,
    },

    /// The device does not implement this command.
    #[error("Command {0} not supported by device")]
    Unsupported(CommandKind),
}

/// Factory function type for creating device instances.
pub type DeviceFactory = fn() -> Box<dyn HapticDevice>;

/// Trait defining the interface for 3-DOF haptic devices.
///
/// The tool controller owns at most one device through this trait and
/// drives it from the haptic cycle.
///
/// # Lifecycle
///
/// 1. `open()` - Acquire the connection
/// 2. `initialize()` - Calibrate (requires an open connection)
/// 3. `read_*()` / `set_force()` - Called every cycle while open
/// 4. `close()` - Release the connection
///
/// # Timing Contracts
///
/// | Operation | Max Duration | RT Constraint |
/// |-----------|--------------|---------------|
/// | `open()` / `initialize()` | driver-defined | None (pre-loop) |
/// | `read_*()` / `set_force()` | well under one cycle | **HARD** |
/// | `close()` | driver-defined | None |
///
/// A transport that can block indefinitely is a driver defect; callers do
/// not add timeouts.
pub trait HapticDevice: Send {
    /// Returns the device's identifier (e.g., "simulation").
    fn name(&self) -> &'static str;

    /// Open the connection to the device.
    fn open(&mut self) -> Result<(), DeviceError>;

    /// Close the connection to the device.
    fn close(&mut self) -> Result<(), DeviceError>;

    /// Calibrate the device.
    fn initialize(&mut self) -> Result<(), DeviceError>;

    /// `GET_POSITION_NORMALIZED`: position with each axis in `[-1, 1]`.
    fn read_position_normalized(&mut self) -> Result<Vec3, DeviceError>;

    /// `GET_ROTATION_MATRIX`: end effector orientation.
    ///
    /// Default: identity, for devices without orientation sensing.
    fn read_rotation(&mut self) -> Result<Mat3, DeviceError> {
        Ok(Mat3::identity())
    }

    /// `GET_VELOCITY`: linear velocity in device-local coordinates.
    ///
    /// Default: unsupported.
    fn read_velocity(&mut self) -> Result<Vec3, DeviceError> {
        Err(DeviceError::Unsupported(CommandKind::GetVelocity))
    }

    /// `GET_SWITCH_n`: state of the given switch.
    ///
    /// Default: unsupported.
    fn read_switch(&mut self, _index: usize) -> Result<bool, DeviceError> {
        Err(DeviceError::Unsupported(CommandKind::GetSwitch0))
    }

    /// `SET_FORCE`: command a force in device-local coordinates.
    fn set_force(&mut self, force: &Vec3) -> Result<(), DeviceError>;
}
