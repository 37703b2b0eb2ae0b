//! World queries used by force algorithms.
//!
//! The collision engine is an external collaborator; force algorithms only
//! see it through the [`World`] trait. [`Scene`] is a small reference world
//! made of one-sided planes, solid spheres and potential field sources. It
//! backs the simulation binary and the tests.

use crate::Vec3;

/// Below this, distances and segment lengths are treated as zero.
const GEOMETRY_EPSILON: f64 = 1e-9;

/// Reference to the scene object a contact was found on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectRef {
    /// Index into [`Scene::planes`].
    Plane(usize),
    /// Index into [`Scene::spheres`].
    Sphere(usize),
}

/// First contact of a sphere swept along a segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Sphere center at the moment of contact.
    pub point: Vec3,
    /// Unit surface normal at the contact, pointing out of the geometry.
    pub normal: Vec3,
    /// Position of the contact along the segment, in `[0, 1]`.
    pub fraction: f64,
    /// Object that was hit.
    pub object: ObjectRef,
}

/// Source of a distance-based attraction/repulsion field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSource {
    /// Field center in global coordinates.
    pub center: Vec3,
    /// Distance beyond which the field has no effect.
    pub influence_radius: f64,
    /// Positive repels, negative attracts [force / distance].
    pub stiffness: f64,
}

/// Collision and field queries exposed to force algorithms.
///
/// Implementations must be cheap enough to call several times per haptic
/// cycle and must not block.
pub trait World: Send + Sync {
    /// Sweep a sphere of `radius` from `from` to `to` and return the first
    /// contact, if any.
    ///
    /// A sphere that starts inside a solid is not reported as colliding
    /// with it, so a proxy that ends up inside geometry can always leave.
    fn collide_segment(&self, from: &Vec3, to: &Vec3, radius: f64) -> Option<Contact>;

    /// Field sources contributing to potential field forces.
    fn field_sources(&self) -> &[FieldSource];
}

/// One-sided infinite plane. The half-space behind the normal is solid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    point: Vec3,
    normal: Vec3,
}

impl Plane {
    /// Create a plane through `point`. `normal` is normalized; a zero
    /// normal falls back to +Z.
    pub fn new(point: Vec3, normal: Vec3) -> Self {
        let normal = normal
            .try_normalize(GEOMETRY_EPSILON)
            .unwrap_or_else(Vec3::z);
        Self { point, normal }
    }

    /// A point on the plane.
    pub fn point(&self) -> Vec3 {
        self.point
    }

    /// Unit outward normal.
    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    /// Signed distance of `p` from the plane (positive in front).
    #[inline]
    pub fn signed_distance(&self, p: &Vec3) -> f64 {
        (p - self.point).dot(&self.normal)
    }

    fn sweep(&self, from: &Vec3, to: &Vec3, radius: f64) -> Option<(f64, Vec3, Vec3)> {
        let s0 = self.signed_distance(from) - radius;
        let s1 = self.signed_distance(to) - radius;

        // Ends in front of the offset surface, or started behind it.
        if s1 >= -GEOMETRY_EPSILON || s0 < -GEOMETRY_EPSILON {
            return None;
        }

        let t = (s0 / (s0 - s1)).clamp(0.0, 1.0);
        let point = from + (to - from) * t;
        Some((t, point, self.normal))
    }
}

/// Solid sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    center: Vec3,
    radius: f64,
}

impl Sphere {
    /// Create a sphere. Negative radii are clamped to zero.
    pub fn new(center: Vec3, radius: f64) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
        }
    }

    /// Sphere center.
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Sphere radius.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    fn sweep(&self, from: &Vec3, to: &Vec3, radius: f64) -> Option<(f64, Vec3, Vec3)> {
        let inflated = self.radius + radius;
        let d = to - from;
        let f = from - self.center;

        let a = d.dot(&d);
        if a < GEOMETRY_EPSILON * GEOMETRY_EPSILON {
            return None;
        }
        let b = 2.0 * f.dot(&d);
        let c = f.dot(&f) - inflated * inflated;

        if c < -GEOMETRY_EPSILON {
            return None;
        }

        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 {
            return None;
        }

        let mut t = (-b - disc.sqrt()) / (2.0 * a);
        if t > 1.0 {
            return None;
        }
        if t < 0.0 {
            // Starting on the surface: only a move inward collides.
            if b >= 0.0 {
                return None;
            }
            t = 0.0;
        }

        let point = from + d * t;
        let normal = (point - self.center)
            .try_normalize(GEOMETRY_EPSILON)
            .unwrap_or_else(|| -d.normalize());
        Some((t, point, normal))
    }
}

/// Reference world made of planes, spheres and field sources.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    planes: Vec<Plane>,
    spheres: Vec<Sphere>,
    fields: Vec<FieldSource>,
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plane.
    pub fn with_plane(mut self, plane: Plane) -> Self {
        self.planes.push(plane);
        self
    }

    /// Add a sphere.
    pub fn with_sphere(mut self, sphere: Sphere) -> Self {
        self.spheres.push(sphere);
        self
    }

    /// Add a field source.
    pub fn with_field(mut self, field: FieldSource) -> Self {
        self.fields.push(field);
        self
    }

    /// Planes in insertion order.
    pub fn planes(&self) -> &[Plane] {
        &self.planes
    }

    /// Spheres in insertion order.
    pub fn spheres(&self) -> &[Sphere] {
        &self.spheres
    }
}

impl World for Scene {
    fn collide_segment(&self, from: &Vec3, to: &Vec3, radius: f64) -> Option<Contact> {
        let planes = self
            .planes
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.sweep(from, to, radius).map(|hit| (hit, ObjectRef::Plane(i))));
        let spheres = self
            .spheres
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.sweep(from, to, radius).map(|hit| (hit, ObjectRef::Sphere(i))));

        planes
            .chain(spheres)
            .min_by(|(a, _), (b, _)| a.0.total_cmp(&b.0))
            .map(|((fraction, point, normal), object)| Contact {
                point,
                normal,
                fraction,
                object,
            })
    }

    fn field_sources(&self) -> &[FieldSource] {
        &self.fields
    }
}

static_assertions::assert_impl_all!(Scene: World, Send, Sync);
