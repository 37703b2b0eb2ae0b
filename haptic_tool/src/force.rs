//! Force algorithms.
//!
//! A tool carries an ordered set of [`ForceSource`]s. Each cycle every
//! source is evaluated at the tool's global position and the results are
//! summed by the [`ForceComposer`].
//!
//! | Source | Effect |
//! |--------|--------|
//! | [`ProxyPointForce`] | Contact with world geometry through a non-penetrating proxy |
//! | [`PotentialFieldForce`] | Distance-based attraction/repulsion around field sources |

pub mod composer;
pub mod potential;
pub mod proxy;

pub use composer::ForceComposer;
pub use potential::PotentialFieldForce;
pub use proxy::ProxyPointForce;

use haptic_common::Vec3;
use haptic_common::world::{Contact, World};
use std::sync::Arc;

/// A force-generating algorithm.
///
/// Sources are owned by one tool and driven from its cycle, so they may keep
/// mutable per-cycle state (a proxy position, contact list) without locking.
///
/// # Lifecycle
///
/// 1. `initialize()` - once, before the first `compute()`
/// 2. `compute()` - once per haptic cycle
///
/// Only `initialize` and `compute` are required. The remaining hooks default
/// to no-ops so simple sources stay small.
pub trait ForceSource: Send {
    /// Bind to the world and seed internal state at the tool's position.
    fn initialize(&mut self, world: Arc<dyn World>, initial_position: &Vec3);

    /// Force in global coordinates at `position`; zero without interaction.
    fn compute(&mut self, position: &Vec3) -> Vec3;

    /// Identifier used in logs.
    fn name(&self) -> &'static str {
        "force_source"
    }

    /// Collision radius of the source's proxy, if it has one.
    fn set_proxy_radius(&mut self, _radius: f64) {}

    /// Global position of the source's proxy, if it has one.
    fn proxy_global_position(&self) -> Option<Vec3> {
        None
    }

    /// Constraint contacts resolved during the last `compute()`.
    fn contacts(&self) -> &[Contact] {
        &[]
    }
}
