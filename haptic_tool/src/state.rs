//! State module root.
//!
//! Controller lifecycle and the per-cycle tool pose.

pub mod lifecycle;
pub mod tool;

pub use lifecycle::{Lifecycle, LifecycleEvent, LifecycleState, TransitionResult};
pub use tool::{DeviceSample, ToolState};
