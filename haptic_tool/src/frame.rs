//! Device-local ⇄ world-global frame mapping.
//!
//! The tool frame sits in the world at `placement.origin` with orientation
//! `placement.rotation`. Device readings are expressed in that frame after
//! scaling by [`WorkspaceScale`].
//!
//! ```text
//! position  : global = R · local + O
//! rotation  : global = local · R
//! velocity  : global = R · local
//! force     : local  = Rᵀ · global
//! ```
//!
//! All transforms are pure. Orthonormality of `R` is checked once when a
//! placement is built, so `Rᵀ` is a valid inverse everywhere else.

use haptic_common::consts::ORTHONORMAL_TOLERANCE;
use haptic_common::{Mat3, Vec3};
use thiserror::Error;

/// Errors raised while building frame parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrameError {
    /// Placement rotation is not orthonormal (or not finite).
    #[error("placement rotation is not orthonormal")]
    NonOrthonormal,

    /// Placement origin has a NaN or infinite component.
    #[error("placement origin {0:?} is not finite")]
    NonFiniteOrigin([f64; 3]),

    /// Workspace half-extent is not finite and positive.
    #[error("invalid workspace half-extents {0:?}")]
    InvalidScale([f64; 3]),
}

/// Returns true if `m` is finite and `mᵀ·m ≈ I`.
pub fn is_orthonormal(m: &Mat3) -> bool {
    if !m.iter().all(|v| v.is_finite()) {
        return false;
    }
    let residual = m.transpose() * m - Mat3::identity();
    residual.amax() < ORTHONORMAL_TOLERANCE
}

// ─── Tool Placement ─────────────────────────────────────────────────

/// Position and orientation of the tool frame in the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolPlacement {
    origin: Vec3,
    rotation: Mat3,
}

impl Default for ToolPlacement {
    fn default() -> Self {
        Self::identity()
    }
}

impl ToolPlacement {
    /// Tool frame coincides with the world frame.
    pub fn identity() -> Self {
        Self {
            origin: Vec3::zeros(),
            rotation: Mat3::identity(),
        }
    }

    /// Build a placement.
    ///
    /// # Errors
    /// - `FrameError::NonOrthonormal` if `rotation` is not orthonormal
    /// - `FrameError::NonFiniteOrigin` if `origin` is not finite
    pub fn new(origin: Vec3, rotation: Mat3) -> Result<Self, FrameError> {
        if !is_orthonormal(&rotation) {
            return Err(FrameError::NonOrthonormal);
        }
        if !origin.iter().all(|v| v.is_finite()) {
            return Err(FrameError::NonFiniteOrigin([origin.x, origin.y, origin.z]));
        }
        Ok(Self { origin, rotation })
    }

    /// Pure translation.
    ///
    /// # Errors
    /// `FrameError::NonFiniteOrigin` if `origin` is not finite.
    pub fn from_origin(origin: Vec3) -> Result<Self, FrameError> {
        Self::new(origin, Mat3::identity())
    }

    /// World origin of the tool frame.
    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Orientation of the tool frame.
    #[inline]
    pub fn rotation(&self) -> Mat3 {
        self.rotation
    }

    /// `R · local + O`.
    #[inline]
    pub fn to_global_position(&self, local: &Vec3) -> Vec3 {
        self.debug_check();
        self.rotation * local + self.origin
    }

    /// `local · R`.
    #[inline]
    pub fn to_global_rotation(&self, local: &Mat3) -> Mat3 {
        self.debug_check();
        local * self.rotation
    }

    /// `R · local`. Velocities do not translate.
    #[inline]
    pub fn to_global_velocity(&self, local: &Vec3) -> Vec3 {
        self.debug_check();
        self.rotation * local
    }

    /// `Rᵀ · global`.
    #[inline]
    pub fn to_local_force(&self, global: &Vec3) -> Vec3 {
        self.debug_check();
        self.rotation.transpose() * global
    }

    /// `Rᵀ · (global − O)`, the inverse of [`Self::to_global_position`].
    #[inline]
    pub fn to_local_position(&self, global: &Vec3) -> Vec3 {
        self.debug_check();
        self.rotation.transpose() * (global - self.origin)
    }

    #[inline]
    fn debug_check(&self) {
        debug_assert!(
            is_orthonormal(&self.rotation),
            "placement rotation lost orthonormality: {:?}",
            self.rotation
        );
    }
}

// ─── Workspace Scale ────────────────────────────────────────────────

/// Per-axis half-extents mapping normalized `[-1, 1]` readings to world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkspaceScale {
    half_extents: Vec3,
}

impl Default for WorkspaceScale {
    fn default() -> Self {
        Self::uniform(1.0)
    }
}

impl WorkspaceScale {
    /// Build a scale from per-axis half-extents.
    ///
    /// # Errors
    /// `FrameError::InvalidScale` unless every half-extent is finite and > 0.
    pub fn new(half_extents: Vec3) -> Result<Self, FrameError> {
        if half_extents.iter().all(|h| h.is_finite() && *h > 0.0) {
            Ok(Self { half_extents })
        } else {
            Err(FrameError::InvalidScale([
                half_extents.x,
                half_extents.y,
                half_extents.z,
            ]))
        }
    }

    /// Same half-extent on every axis. Non-positive values fall back to 1.
    pub fn uniform(half_extent: f64) -> Self {
        let h = if half_extent.is_finite() && half_extent > 0.0 {
            half_extent
        } else {
            1.0
        };
        Self {
            half_extents: Vec3::repeat(h),
        }
    }

    /// Per-axis half-extents.
    #[inline]
    pub fn half_extents(&self) -> Vec3 {
        self.half_extents
    }

    /// Scale a normalized reading into the tool frame.
    #[inline]
    pub fn to_local(&self, normalized: &Vec3) -> Vec3 {
        self.half_extents.component_mul(normalized)
    }
}
