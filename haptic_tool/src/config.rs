//! TOML configuration for the haptic tool.
//!
//! Loaded through [`ConfigLoader`]. Every section except `[shared]` has
//! defaults, so a minimal file only names the service:
//!
//! ```toml
//! [shared]
//! service_name = "haptic-tool"
//!
//! [tool]
//! radius = 0.05
//! half_extents = [0.1, 0.1, 0.1]
//!
//! [[scene.planes]]
//! point = [0.0, 0.0, -0.05]
//! normal = [0.0, 0.0, 1.0]
//! ```
//!
//! Validation runs separately from parsing; see [`ToolConfig::validate`].

use crate::controller::ToolController;
use crate::force::{PotentialFieldForce, ProxyPointForce};
use crate::force::proxy::DEFAULT_PROXY_STIFFNESS;
use crate::frame::{FrameError, ToolPlacement, WorkspaceScale};
use haptic_common::config::{ConfigError, ConfigLoader, SharedConfig};
use haptic_common::consts::{CYCLE_TIME_US, DEFAULT_DEVICE, DEFAULT_DISPLAY_RADIUS, MIN_CYCLE_TIME_US};
use haptic_common::world::{FieldSource, Plane, Scene, Sphere, World};
use haptic_common::{Mat3, Vec3};
use haptic_hal::SimulationConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

// ─── Sections ───────────────────────────────────────────────────────

/// `[tool]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSection {
    /// Display radius; the proxy collision radius is derived from it.
    pub radius: f64,
    /// Hold output at zero until the first small force.
    pub wait_for_small_force: bool,
    /// Force output enabled at startup.
    pub forces_enabled: bool,
    /// Workspace half-extents per axis [world units].
    pub half_extents: [f64; 3],
    /// Registered device name.
    pub device: String,
}

impl Default for ToolSection {
    fn default() -> Self {
        Self {
            radius: DEFAULT_DISPLAY_RADIUS,
            wait_for_small_force: true,
            forces_enabled: true,
            half_extents: [1.0; 3],
            device: DEFAULT_DEVICE.to_string(),
        }
    }
}

/// `[placement]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementSection {
    /// Tool frame origin in the world.
    pub origin: [f64; 3],
    /// Tool frame orientation, row-major.
    pub rotation: [[f64; 3]; 3],
}

impl Default for PlacementSection {
    fn default() -> Self {
        Self {
            origin: [0.0; 3],
            rotation: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }
}

/// `[proxy]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySection {
    /// Attach a proxy-point force source.
    pub enabled: bool,
    /// Proxy spring stiffness.
    pub stiffness: f64,
}

impl Default for ProxySection {
    fn default() -> Self {
        Self {
            enabled: true,
            stiffness: DEFAULT_PROXY_STIFFNESS,
        }
    }
}

/// `[potential_field]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PotentialFieldSection {
    /// Attach a potential field force source.
    pub enabled: bool,
}

impl Default for PotentialFieldSection {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// `[cycle]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleSection {
    /// Haptic cycle period [µs].
    pub cycle_time_us: u64,
}

impl Default for CycleSection {
    fn default() -> Self {
        Self {
            cycle_time_us: CYCLE_TIME_US,
        }
    }
}

/// `[[scene.planes]]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaneEntry {
    /// A point on the plane.
    pub point: [f64; 3],
    /// Outward normal; need not be unit length.
    pub normal: [f64; 3],
}

/// `[[scene.spheres]]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SphereEntry {
    /// Center.
    pub center: [f64; 3],
    /// Radius.
    pub radius: f64,
}

/// `[[scene.fields]]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldEntry {
    /// Center.
    pub center: [f64; 3],
    /// Distance beyond which the field vanishes.
    pub influence_radius: f64,
    /// Positive repels, negative attracts.
    pub stiffness: f64,
}

/// `[scene]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSection {
    /// One-sided planes.
    pub planes: Vec<PlaneEntry>,
    /// Solid spheres.
    pub spheres: Vec<SphereEntry>,
    /// Potential field sources.
    pub fields: Vec<FieldEntry>,
}

// ─── Tool Config ────────────────────────────────────────────────────

/// Complete haptic tool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Service name and log level.
    pub shared: SharedConfig,
    /// Tool sphere, startup policy and device.
    #[serde(default)]
    pub tool: ToolSection,
    /// Tool frame in the world.
    #[serde(default)]
    pub placement: PlacementSection,
    /// Proxy-point force source.
    #[serde(default)]
    pub proxy: ProxySection,
    /// Potential field force source.
    #[serde(default)]
    pub potential_field: PotentialFieldSection,
    /// Loop timing.
    #[serde(default)]
    pub cycle: CycleSection,
    /// Reference world geometry.
    #[serde(default)]
    pub scene: SceneSection,
    /// Settings for the built-in simulation device.
    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl ToolConfig {
    /// Load and validate a configuration file.
    ///
    /// # Errors
    /// Any [`ConfigError`] from loading or [`Self::validate`].
    pub fn load_validated(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::load(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Check semantic constraints the TOML shape cannot express.
    ///
    /// # Errors
    /// `ConfigError::ValidationError` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;

        if !(self.tool.radius.is_finite() && self.tool.radius > 0.0) {
            return Err(invalid(format!("tool.radius must be > 0, got {}", self.tool.radius)));
        }
        self.workspace_scale()?;
        self.placement()?;

        if !(self.proxy.stiffness.is_finite() && self.proxy.stiffness >= 0.0) {
            return Err(invalid(format!(
                "proxy.stiffness must be >= 0, got {}",
                self.proxy.stiffness
            )));
        }
        if self.cycle.cycle_time_us < MIN_CYCLE_TIME_US {
            return Err(invalid(format!(
                "cycle.cycle_time_us must be >= {MIN_CYCLE_TIME_US}, got {}",
                self.cycle.cycle_time_us
            )));
        }
        if self.tool.device.trim().is_empty() {
            return Err(invalid("tool.device cannot be empty".to_string()));
        }

        for (i, plane) in self.scene.planes.iter().enumerate() {
            let normal = vec3(plane.normal);
            if !(all_finite(&plane.point) && normal.iter().all(|v| v.is_finite())) {
                return Err(invalid(format!("scene.planes[{i}] is not finite")));
            }
            if normal.norm() < 1e-9 {
                return Err(invalid(format!("scene.planes[{i}].normal is zero")));
            }
        }
        for (i, sphere) in self.scene.spheres.iter().enumerate() {
            if !(all_finite(&sphere.center) && sphere.radius.is_finite() && sphere.radius > 0.0) {
                return Err(invalid(format!(
                    "scene.spheres[{i}].radius must be > 0, got {}",
                    sphere.radius
                )));
            }
        }
        for (i, field) in self.scene.fields.iter().enumerate() {
            if !(all_finite(&field.center)
                && field.influence_radius.is_finite()
                && field.influence_radius > 0.0
                && field.stiffness.is_finite())
            {
                return Err(invalid(format!("scene.fields[{i}] is invalid")));
            }
        }

        Ok(())
    }

    /// Workspace scale from `tool.half_extents`.
    ///
    /// # Errors
    /// `ConfigError::ValidationError` for non-positive extents.
    pub fn workspace_scale(&self) -> Result<WorkspaceScale, ConfigError> {
        WorkspaceScale::new(vec3(self.tool.half_extents)).map_err(frame_error)
    }

    /// Tool placement from `[placement]`.
    ///
    /// # Errors
    /// `ConfigError::ValidationError` for a non-orthonormal rotation or a
    /// non-finite origin.
    pub fn placement(&self) -> Result<ToolPlacement, ConfigError> {
        let rows = &self.placement.rotation;
        let rotation = Mat3::from_fn(|r, c| rows[r][c]);
        ToolPlacement::new(vec3(self.placement.origin), rotation).map_err(frame_error)
    }

    /// Cycle period.
    pub fn cycle_time(&self) -> Duration {
        Duration::from_micros(self.cycle.cycle_time_us)
    }

    /// Reference world described by `[scene]`.
    pub fn build_scene(&self) -> Scene {
        let scene = self
            .scene
            .planes
            .iter()
            .fold(Scene::new(), |s, p| s.with_plane(Plane::new(vec3(p.point), vec3(p.normal))));
        let scene = self
            .scene
            .spheres
            .iter()
            .fold(scene, |s, sp| s.with_sphere(Sphere::new(vec3(sp.center), sp.radius)));
        self.scene.fields.iter().fold(scene, |s, f| {
            s.with_field(FieldSource {
                center: vec3(f.center),
                influence_radius: f.influence_radius,
                stiffness: f.stiffness,
            })
        })
    }

    /// Build a controller over `world` with the configured force sources
    /// and settings. No device is attached.
    ///
    /// # Errors
    /// `ConfigError::ValidationError` for invalid frame parameters.
    pub fn build_controller(&self, world: Arc<dyn World>) -> Result<ToolController, ConfigError> {
        let mut tool = ToolController::new(world)
            .with_workspace_scale(self.workspace_scale()?)
            .with_placement(self.placement()?);

        if self.proxy.enabled {
            tool.add_force_source(Box::new(ProxyPointForce::new(self.proxy.stiffness)));
        }
        if self.potential_field.enabled {
            tool.add_force_source(Box::new(PotentialFieldForce::new()));
        }

        tool.set_radius(self.tool.radius);
        tool.set_wait_for_small_force(self.tool.wait_for_small_force);
        if !self.tool.forces_enabled {
            tool.disable_forces();
        }
        Ok(tool)
    }
}

fn vec3(a: [f64; 3]) -> Vec3 {
    Vec3::new(a[0], a[1], a[2])
}

fn all_finite(a: &[f64; 3]) -> bool {
    a.iter().all(|v| v.is_finite())
}

fn invalid(msg: String) -> ConfigError {
    ConfigError::ValidationError(msg)
}

fn frame_error(e: FrameError) -> ConfigError {
    ConfigError::ValidationError(e.to_string())
}

// ─── Tests ──────────────────────────────────────────────────────────
