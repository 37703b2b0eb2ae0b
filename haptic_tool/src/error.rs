//! Controller error type.

use crate::state::LifecycleState;
use haptic_common::device::DeviceError;
use thiserror::Error;

/// Errors surfaced by [`crate::controller::ToolController`] operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ToolError {
    /// The operation needs a device and none is attached.
    #[error("No haptic device attached")]
    NoDevice,

    /// The attached device reported a failure.
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),

    /// The operation is not valid in the current lifecycle state.
    #[error("Cannot {op} while {from}: {reason}")]
    Lifecycle {
        /// State the controller was in.
        from: LifecycleState,
        /// Rejected operation.
        op: &'static str,
        /// Why the transition was rejected.
        reason: &'static str,
    },
}
