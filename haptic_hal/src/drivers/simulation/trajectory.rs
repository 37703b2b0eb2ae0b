//! Scripted end-effector trajectories in normalized device space.

use haptic_common::Vec3;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Path followed by the simulated end effector.
///
/// Every sample is clamped to the normalized workspace `[-1, 1]` per axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Trajectory {
    /// Stay at a fixed position.
    Hold {
        /// Normalized position.
        position: [f64; 3],
    },
    /// Circle in the XY plane.
    Circle {
        /// Normalized center.
        center: [f64; 3],
        /// Normalized radius.
        radius: f64,
        /// Cycles per revolution.
        period_cycles: u64,
    },
    /// Back and forth along a line.
    Sweep {
        /// Start point.
        from: [f64; 3],
        /// Turning point.
        to: [f64; 3],
        /// Cycles for a full there-and-back.
        period_cycles: u64,
    },
}

impl Default for Trajectory {
    fn default() -> Self {
        Self::Circle {
            center: [0.0; 3],
            radius: 0.5,
            period_cycles: 2000,
        }
    }
}

impl Trajectory {
    /// Normalized position at `tick`.
    pub fn sample(&self, tick: u64) -> Vec3 {
        let raw = match *self {
            Self::Hold { position } => Vec3::from(position),
            Self::Circle {
                center,
                radius,
                period_cycles,
            } => {
                let angle = TAU * phase(tick, period_cycles);
                Vec3::from(center) + Vec3::new(angle.cos(), angle.sin(), 0.0) * radius
            }
            Self::Sweep {
                from,
                to,
                period_cycles,
            } => {
                let p = phase(tick, period_cycles);
                let s = if p < 0.5 { 2.0 * p } else { 2.0 - 2.0 * p };
                let from = Vec3::from(from);
                from + (Vec3::from(to) - from) * s
            }
        };
        raw.map(|c| c.clamp(-1.0, 1.0))
    }
}

/// Fraction of the period elapsed at `tick`, in `[0, 1)`.
fn phase(tick: u64, period_cycles: u64) -> f64 {
    let period = period_cycles.max(1);
    (tick % period) as f64 / period as f64
}
