//! Proxy-point contact force.
//!
//! The proxy is a small sphere that follows the device position but cannot
//! enter world geometry. Each cycle it is swept toward the device; on
//! contact the remaining motion is projected onto the constraint, up to
//! three constraints (plane, then edge line, then corner point). The
//! rendered force is a spring from the device back to the proxy.
//!
//! ```text
//!          device goal
//!              ×
//!   ───────────┼────────  surface
//!   ▒▒▒▒▒▒▒▒▒▒▒●▒▒▒▒▒▒▒▒  ● proxy stays on the surface
//!              f = k · (proxy − device)
//! ```

use super::ForceSource;
use haptic_common::Vec3;
use haptic_common::consts::{DEFAULT_DISPLAY_RADIUS, MAX_PROXY_CONTACTS, PROXY_RADIUS_SCALE};
use haptic_common::world::{Contact, World};
use heapless::Vec as FixedVec;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Default spring stiffness between proxy and device.
pub const DEFAULT_PROXY_STIFFNESS: f64 = 1.0;

/// Cross products shorter than this mean two constraint planes are parallel.
const PARALLEL_EPSILON: f64 = 1e-9;

/// Contact force through a non-penetrating proxy point.
pub struct ProxyPointForce {
    stiffness: f64,
    radius: f64,
    world: Option<Arc<dyn World>>,
    proxy: Vec3,
    contacts: FixedVec<Contact, MAX_PROXY_CONTACTS>,
}

impl fmt::Debug for ProxyPointForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyPointForce")
            .field("stiffness", &self.stiffness)
            .field("radius", &self.radius)
            .field("initialized", &self.world.is_some())
            .field("proxy", &self.proxy)
            .field("contacts", &self.contacts.len())
            .finish()
    }
}

impl Default for ProxyPointForce {
    fn default() -> Self {
        Self::new(DEFAULT_PROXY_STIFFNESS)
    }
}

impl ProxyPointForce {
    /// Create an uninitialized proxy with the given spring stiffness.
    /// Negative stiffness is clamped to zero.
    pub fn new(stiffness: f64) -> Self {
        Self {
            stiffness: stiffness.max(0.0),
            radius: DEFAULT_DISPLAY_RADIUS * PROXY_RADIUS_SCALE,
            world: None,
            proxy: Vec3::zeros(),
            contacts: FixedVec::new(),
        }
    }

    /// Spring stiffness.
    #[inline]
    pub fn stiffness(&self) -> f64 {
        self.stiffness
    }

    /// Collision radius of the proxy sphere.
    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Move the proxy toward `goal`, resolving at most `MAX_PROXY_CONTACTS`
    /// constraints against `world`.
    fn solve(&mut self, world: &dyn World, goal: Vec3) {
        self.contacts.clear();
        let mut from = self.proxy;
        let mut goal = goal;

        loop {
            let Some(contact) = world.collide_segment(&from, &goal, self.radius) else {
                from = goal;
                break;
            };

            from = contact.point;
            if self.contacts.push(contact).is_err() || self.contacts.is_full() {
                // Corner: every direction is blocked.
                break;
            }
            goal = self.constrain(goal, &contact.point);
        }

        self.proxy = from;
    }

    /// Project `goal` onto the subspace allowed by the current contacts.
    fn constrain(&self, goal: Vec3, anchor: &Vec3) -> Vec3 {
        match self.contacts.as_slice() {
            [] => goal,
            [only] => project_on_plane(goal, anchor, &only.normal),
            [first, second, ..] => {
                let edge = first.normal.cross(&second.normal);
                if edge.norm() < PARALLEL_EPSILON {
                    project_on_plane(goal, anchor, &second.normal)
                } else {
                    anchor + edge * ((goal - anchor).dot(&edge) / edge.norm_squared())
                }
            }
        }
    }
}

#[inline]
fn project_on_plane(goal: Vec3, anchor: &Vec3, normal: &Vec3) -> Vec3 {
    goal - normal * (goal - anchor).dot(normal)
}

impl ForceSource for ProxyPointForce {
    fn initialize(&mut self, world: Arc<dyn World>, initial_position: &Vec3) {
        self.world = Some(world);
        self.proxy = *initial_position;
        self.contacts.clear();
    }

    fn compute(&mut self, position: &Vec3) -> Vec3 {
        let Some(world) = self.world.clone() else {
            return Vec3::zeros();
        };

        self.solve(world.as_ref(), *position);

        if self.contacts.is_empty() && self.proxy == *position {
            return Vec3::zeros();
        }

        let force = (self.proxy - position) * self.stiffness;
        trace!(
            "proxy {:?} contacts={} force={:?}",
            self.proxy,
            self.contacts.len(),
            force
        );
        force
    }

    fn name(&self) -> &'static str {
        "proxy_point"
    }

    fn set_proxy_radius(&mut self, radius: f64) {
        self.radius = radius.max(0.0);
    }

    fn proxy_global_position(&self) -> Option<Vec3> {
        self.world.as_ref().map(|_| self.proxy)
    }

    fn contacts(&self) -> &[Contact] {
        &self.contacts
    }
}
