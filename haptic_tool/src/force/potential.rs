//! Potential field force.
//!
//! Each [`FieldSource`] reported by the world pushes (positive stiffness) or
//! pulls (negative stiffness) the tool along the line to its center, with a
//! magnitude that falls linearly to zero at the influence radius:
//!
//! ```text
//! f = k · (R − d) · (p − c) / d      for 0 < d < R
//! f = 0                              otherwise
//! ```

use super::ForceSource;
use haptic_common::Vec3;
use haptic_common::world::{FieldSource, World};
use std::fmt;
use std::sync::Arc;

/// Distance-based attraction/repulsion around the world's field sources.
#[derive(Default)]
pub struct PotentialFieldForce {
    world: Option<Arc<dyn World>>,
}

impl fmt::Debug for PotentialFieldForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PotentialFieldForce")
            .field("initialized", &self.world.is_some())
            .finish()
    }
}

impl PotentialFieldForce {
    /// Create an uninitialized potential field source.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Contribution of one field source at `position`.
pub fn field_contribution(field: &FieldSource, position: &Vec3) -> Vec3 {
    let offset = position - field.center;
    let d = offset.norm();
    if d > 0.0 && d < field.influence_radius {
        offset * (field.stiffness * (field.influence_radius - d) / d)
    } else {
        Vec3::zeros()
    }
}

impl ForceSource for PotentialFieldForce {
    fn initialize(&mut self, world: Arc<dyn World>, _initial_position: &Vec3) {
        self.world = Some(world);
    }

    fn compute(&mut self, position: &Vec3) -> Vec3 {
        let Some(world) = &self.world else {
            return Vec3::zeros();
        };
        world
            .field_sources()
            .iter()
            .fold(Vec3::zeros(), |total, field| {
                total + field_contribution(field, position)
            })
    }

    fn name(&self) -> &'static str {
        "potential_field"
    }
}
