//! Ordered sum of force sources.

use super::ForceSource;
use haptic_common::Vec3;
use haptic_common::world::World;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Insertion-ordered set of force sources whose outputs are summed.
#[derive(Default)]
pub struct ForceComposer {
    sources: Vec<Box<dyn ForceSource>>,
}

impl fmt::Debug for ForceComposer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.sources.iter().map(|s| s.name()))
            .finish()
    }
}

impl ForceComposer {
    /// Create an empty composer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a source. Evaluation follows insertion order.
    pub fn push(&mut self, source: Box<dyn ForceSource>) {
        debug!("Force source added: {}", source.name());
        self.sources.push(source);
    }

    /// Number of sources.
    #[inline]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Whether no source is attached.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Sources in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn ForceSource> {
        self.sources.iter().map(|s| s.as_ref())
    }

    /// Mutable access in evaluation order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut (dyn ForceSource + 'static)> {
        self.sources.iter_mut().map(|s| s.as_mut())
    }

    /// Initialize every source against `world` at `position`.
    pub fn initialize_all(&mut self, world: &Arc<dyn World>, position: &Vec3) {
        for source in &mut self.sources {
            source.initialize(Arc::clone(world), position);
        }
    }

    /// Forward the proxy collision radius to every source.
    pub fn set_proxy_radius(&mut self, radius: f64) {
        for source in &mut self.sources {
            source.set_proxy_radius(radius);
        }
    }

    /// Proxy position of the first source that exposes one.
    pub fn proxy_global_position(&self) -> Option<Vec3> {
        self.sources.iter().find_map(|s| s.proxy_global_position())
    }

    /// Sum of all contributions at `position`. Empty set yields zero.
    pub fn compute(&mut self, position: &Vec3) -> Vec3 {
        self.sources
            .iter_mut()
            .fold(Vec3::zeros(), |total, source| {
                let contribution = source.compute(position);
                debug_assert!(
                    contribution.iter().all(|v| v.is_finite()),
                    "force source '{}' produced a non-finite force {contribution:?}",
                    source.name()
                );
                total + contribution
            })
    }
}
