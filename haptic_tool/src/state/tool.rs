//! Per-cycle tool pose.

use crate::frame::{ToolPlacement, WorkspaceScale};
use haptic_common::{Mat3, Vec3};

/// One raw reading from the device, in device-local terms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceSample {
    /// Normalized position, each axis in `[-1, 1]`.
    pub position: Vec3,
    /// End effector orientation.
    pub rotation: Mat3,
    /// Linear velocity.
    pub velocity: Vec3,
    /// Switch 0.
    pub button: bool,
}

/// Tool pose in both frames, rebuilt from scratch every cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolState {
    /// Position in the tool frame.
    pub local_position: Vec3,
    /// Position in the world.
    pub global_position: Vec3,
    /// Orientation in the tool frame.
    pub local_rotation: Mat3,
    /// Orientation in the world.
    pub global_rotation: Mat3,
    /// Velocity in the tool frame.
    pub local_velocity: Vec3,
    /// Velocity in the world.
    pub global_velocity: Vec3,
    /// Switch 0.
    pub button: bool,
}

impl Default for ToolState {
    fn default() -> Self {
        Self {
            local_position: Vec3::zeros(),
            global_position: Vec3::zeros(),
            local_rotation: Mat3::identity(),
            global_rotation: Mat3::identity(),
            local_velocity: Vec3::zeros(),
            global_velocity: Vec3::zeros(),
            button: false,
        }
    }
}

impl ToolState {
    /// Map a device sample through the workspace scale and tool placement.
    pub fn from_sample(
        sample: &DeviceSample,
        scale: &WorkspaceScale,
        placement: &ToolPlacement,
    ) -> Self {
        let local_position = scale.to_local(&sample.position);
        Self {
            local_position,
            global_position: placement.to_global_position(&local_position),
            local_rotation: sample.rotation,
            global_rotation: placement.to_global_rotation(&sample.rotation),
            local_velocity: sample.velocity,
            global_velocity: placement.to_global_velocity(&sample.velocity),
            button: sample.button,
        }
    }
}
