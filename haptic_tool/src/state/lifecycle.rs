//! Tool controller lifecycle.
//!
//! ```text
//! Uninitialized ──Initialize──▶ Initialized ──Start──▶ Running
//!                                   ▲                  │   ▲
//!                                   │                Stop  │
//!                              Initialize              ▼   │
//!                                   └────────────── Stopped ─Start
//! ```
//!
//! `Initialize` is accepted whenever the device is closed, so a stopped tool
//! can be re-seeded. `Stop` is accepted from every state and always closes
//! the device. Before the first `Start` it leaves the state unchanged, so
//! `Start` still requires a completed `Initialize`.

use std::fmt;

/// Controller lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    /// Constructed, force sources not yet seeded.
    Uninitialized,
    /// Baseline pose read and force sources seeded; device closed.
    Initialized,
    /// Device open, cycles may run.
    Running,
    /// Device closed after running.
    Stopped,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "UNINITIALIZED",
            Self::Initialized => "INITIALIZED",
            Self::Running => "RUNNING",
            Self::Stopped => "STOPPED",
        };
        f.write_str(name)
    }
}

/// Event that can trigger a lifecycle transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// `initialize()` succeeded.
    Initialize,
    /// `start()` opened the device.
    Start,
    /// `stop()` closed the device.
    Stop,
}

impl LifecycleEvent {
    /// Name of the controller operation that raises this event.
    pub const fn operation(self) -> &'static str {
        match self {
            Self::Initialize => "initialize",
            Self::Start => "start",
            Self::Stop => "stop",
        }
    }
}

/// Result of a lifecycle transition attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionResult {
    /// Transition succeeded, new state.
    Ok(LifecycleState),
    /// Transition rejected, reason.
    Rejected(&'static str),
}

/// Lifecycle state holder.
#[derive(Debug, Clone)]
pub struct Lifecycle {
    state: LifecycleState,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    /// Start in `Uninitialized`.
    pub const fn new() -> Self {
        Self {
            state: LifecycleState::Uninitialized,
        }
    }

    /// Current state.
    #[inline]
    pub const fn state(&self) -> LifecycleState {
        self.state
    }

    /// Whether the device connection is expected to be open.
    #[inline]
    pub const fn is_running(&self) -> bool {
        matches!(self.state, LifecycleState::Running)
    }

    /// Check an event without applying it.
    pub fn check(&self, event: LifecycleEvent) -> TransitionResult {
        use LifecycleEvent::*;
        use LifecycleState::*;

        match (self.state, event) {
            (Uninitialized | Initialized | Stopped, Initialize) => TransitionResult::Ok(Initialized),
            (Initialized | Stopped, Start) => TransitionResult::Ok(Running),
            (Running | Stopped, Stop) => TransitionResult::Ok(Stopped),
            (state @ (Uninitialized | Initialized), Stop) => TransitionResult::Ok(state),
            (Running, Initialize) => TransitionResult::Rejected("Running: stop before re-initializing"),
            (Running, Start) => TransitionResult::Rejected("Running: already started"),
            (Uninitialized, Start) => TransitionResult::Rejected("Uninitialized: initialize first"),
        }
    }

    /// Attempt a transition.
    pub fn handle_event(&mut self, event: LifecycleEvent) -> TransitionResult {
        let result = self.check(event);
        if let TransitionResult::Ok(next) = result {
            self.state = next;
        }
        result
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
