//! Startup force ramp.
//!
//! When a tool starts (or forces are re-enabled) the proxy may already sit
//! far from the device, and sending that force at once would kick the
//! operator's hand. The ramp holds the output at zero until the candidate
//! force has dropped below a small threshold, then passes forces through
//! unchanged until it is re-armed.
//!
//! ```text
//!            |f|² < SMALL_FORCE_SQ  or  !wait_for_small_force
//!   Armed ─────────────────────────────────────────────────▶ Released
//!     ▲                                                          │
//!     └───────────────────────── rearm() ────────────────────────┘
//! ```

use haptic_common::Vec3;
use haptic_common::consts::SMALL_FORCE_SQ;
use tracing::debug;

/// Ramp phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RampState {
    /// Waiting for a small candidate force; output is held at zero.
    Armed,
    /// Forces pass through unchanged.
    Released,
}

/// Startup gate applied to the local force right before it reaches the device.
#[derive(Debug, Clone)]
pub struct StartupRamp {
    state: RampState,
    wait_for_small_force: bool,
}

impl Default for StartupRamp {
    fn default() -> Self {
        Self::new(true)
    }
}

impl StartupRamp {
    /// Create an armed ramp.
    pub const fn new(wait_for_small_force: bool) -> Self {
        Self {
            state: RampState::Armed,
            wait_for_small_force,
        }
    }

    /// Current phase.
    #[inline]
    pub const fn state(&self) -> RampState {
        self.state
    }

    /// Whether forces currently pass through.
    #[inline]
    pub const fn is_released(&self) -> bool {
        matches!(self.state, RampState::Released)
    }

    /// Whether release waits for a small candidate force.
    #[inline]
    pub const fn wait_for_small_force(&self) -> bool {
        self.wait_for_small_force
    }

    /// Change the release policy. Takes effect on the next [`Self::gate`].
    pub fn set_wait_for_small_force(&mut self, wait: bool) {
        self.wait_for_small_force = wait;
    }

    /// Return to `Armed`.
    pub fn rearm(&mut self) {
        if self.state != RampState::Armed {
            debug!("Startup ramp re-armed");
        }
        self.state = RampState::Armed;
    }

    /// Evaluate one candidate local force.
    ///
    /// Returns the force to send: `candidate` once released, otherwise the
    /// zero vector.
    pub fn gate(&mut self, candidate: &Vec3) -> Vec3 {
        if self.state == RampState::Armed
            && (!self.wait_for_small_force || candidate.norm_squared() < SMALL_FORCE_SQ)
        {
            self.state = RampState::Released;
            debug!(
                "Startup ramp released (|f|² = {:.3e})",
                candidate.norm_squared()
            );
        }

        match self.state {
            RampState::Released => *candidate,
            RampState::Armed => Vec3::zeros(),
        }
    }
}
