//! Tool controller: one haptic cycle, end to end.
//!
//! ```text
//! device ──read──▶ scale ──▶ placement ──▶ ToolState
//!                                             │ global position
//!                                             ▼
//!                                      ForceComposer ──▶ global force
//!                                                           │ Rᵀ
//!                                                           ▼
//! device ◀──SET_FORCE── enable ◀── StartupRamp ◀── local force
//! ```
//!
//! The controller exclusively owns an optional device, the ordered force
//! sources and all per-cycle state. It performs no locking; the cycle body
//! (`update_pose` → `compute_forces` → `apply_forces`) runs on one thread.

use crate::error::ToolError;
use crate::force::{ForceComposer, ForceSource};
use crate::frame::{ToolPlacement, WorkspaceScale};
use crate::safety::{RampState, StartupRamp};
use crate::state::{DeviceSample, Lifecycle, LifecycleEvent, LifecycleState, ToolState, TransitionResult};
use haptic_common::consts::{DEFAULT_DISPLAY_RADIUS, PROXY_RADIUS_SCALE};
use haptic_common::device::HapticDevice;
use haptic_common::world::World;
use haptic_common::Vec3;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, trace, warn};

/// 3-DOF haptic tool.
pub struct ToolController {
    device: Option<Box<dyn HapticDevice>>,
    world: Arc<dyn World>,
    sources: ForceComposer,
    placement: ToolPlacement,
    scale: WorkspaceScale,
    state: ToolState,
    /// False until a pose read succeeds, and after any failed read.
    pose_valid: bool,
    display_radius: f64,
    ramp: StartupRamp,
    forces_enabled: bool,
    last_global_force: Vec3,
    last_local_force: Vec3,
    last_sent_force: Vec3,
    lifecycle: Lifecycle,
}

static_assertions::assert_impl_all!(ToolController: Send);

impl fmt::Debug for ToolController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolController")
            .field("device", &self.device.as_ref().map(|d| d.name()))
            .field("sources", &self.sources)
            .field("lifecycle", &self.lifecycle.state())
            .field("ramp", &self.ramp.state())
            .field("forces_enabled", &self.forces_enabled)
            .field("display_radius", &self.display_radius)
            .finish_non_exhaustive()
    }
}

impl ToolController {
    /// Create a controller over `world` with no device and no force sources.
    ///
    /// Forces start enabled, the ramp armed and waiting for a small force.
    pub fn new(world: Arc<dyn World>) -> Self {
        Self {
            device: None,
            world,
            sources: ForceComposer::new(),
            placement: ToolPlacement::identity(),
            scale: WorkspaceScale::default(),
            state: ToolState::default(),
            pose_valid: false,
            display_radius: DEFAULT_DISPLAY_RADIUS,
            ramp: StartupRamp::new(true),
            forces_enabled: true,
            last_global_force: Vec3::zeros(),
            last_local_force: Vec3::zeros(),
            last_sent_force: Vec3::zeros(),
            lifecycle: Lifecycle::new(),
        }
    }

    /// Set the workspace scale. Only available at construction.
    pub fn with_workspace_scale(mut self, scale: WorkspaceScale) -> Self {
        self.scale = scale;
        self
    }

    /// Set the tool placement at construction.
    pub fn with_placement(mut self, placement: ToolPlacement) -> Self {
        self.placement = placement;
        self
    }

    /// Attach a device at construction.
    pub fn with_device(mut self, device: Box<dyn HapticDevice>) -> Self {
        self.set_device(device);
        self
    }

    // ─── Device ─────────────────────────────────────────────────────

    /// Attach `device`, closing and dropping the previous one.
    ///
    /// The controller returns to `Uninitialized`: the new device has to be
    /// initialized before it can be started.
    pub fn set_device(&mut self, device: Box<dyn HapticDevice>) {
        if let Some(mut old) = self.device.take() {
            if let Err(e) = old.close() {
                warn!("Closing replaced device '{}' failed: {}", old.name(), e);
            }
        }
        info!("Haptic device attached: {}", device.name());
        self.device = Some(device);
        self.reset_lifecycle();
    }

    /// Detach the device without closing it.
    pub fn take_device(&mut self) -> Option<Box<dyn HapticDevice>> {
        let device = self.device.take();
        if device.is_some() {
            self.reset_lifecycle();
        }
        device
    }

    /// Whether a device is attached.
    #[inline]
    pub fn has_device(&self) -> bool {
        self.device.is_some()
    }

    fn reset_lifecycle(&mut self) {
        self.lifecycle = Lifecycle::new();
        self.pose_valid = false;
    }

    // ─── Force Sources ──────────────────────────────────────────────

    /// Append a force source.
    ///
    /// The source receives the current proxy radius. If the controller is
    /// already initialized it is seeded at the current global position.
    pub fn add_force_source(&mut self, mut source: Box<dyn ForceSource>) {
        source.set_proxy_radius(self.proxy_radius());
        if self.lifecycle.state() != LifecycleState::Uninitialized {
            source.initialize(Arc::clone(&self.world), &self.state.global_position);
        }
        self.sources.push(source);
    }

    /// Force sources in evaluation order.
    #[inline]
    pub fn force_sources(&self) -> &ForceComposer {
        &self.sources
    }

    // ─── Lifecycle ──────────────────────────────────────────────────

    /// Establish a baseline pose and seed every force source.
    ///
    /// Opens the device, calibrates it, reads one pose and closes it again.
    /// Then every force source is initialized with the world and the
    /// current global position.
    ///
    /// # Errors
    ///
    /// - `ToolError::NoDevice` without a device; no source is touched
    /// - `ToolError::Lifecycle` while running
    /// - `ToolError::Device` if open, calibration or close fails
    pub fn initialize(&mut self) -> Result<(), ToolError> {
        if self.device.is_none() {
            return Err(ToolError::NoDevice);
        }
        self.guard(LifecycleEvent::Initialize)?;

        {
            let device = self.device_mut()?;
            device.open()?;
            if let Err(e) = device.initialize() {
                if let Err(close_err) = device.close() {
                    warn!("Close after failed calibration also failed: {}", close_err);
                }
                return Err(e.into());
            }
        }

        self.update_pose();
        if !self.pose_valid {
            warn!("Baseline pose read failed, seeding force sources at last known position");
        }

        self.device_mut()?.close()?;

        self.sources
            .initialize_all(&self.world, &self.state.global_position);
        self.lifecycle.handle_event(LifecycleEvent::Initialize);

        info!(
            "Tool initialized at {:?} with {} force source(s)",
            self.state.global_position,
            self.sources.len()
        );
        Ok(())
    }

    /// Open the device connection.
    ///
    /// # Errors
    ///
    /// `ToolError::NoDevice`, `ToolError::Lifecycle`, or the device's open error.
    pub fn start(&mut self) -> Result<(), ToolError> {
        self.guard(LifecycleEvent::Start)?;
        self.device_mut()?.open()?;
        self.lifecycle.handle_event(LifecycleEvent::Start);
        info!("Tool started");
        Ok(())
    }

    /// Close the device connection.
    ///
    /// Accepted in every state, so a device left open by a failed
    /// `initialize` can still be closed.
    ///
    /// # Errors
    ///
    /// `ToolError::NoDevice` or the device's close error.
    pub fn stop(&mut self) -> Result<(), ToolError> {
        self.guard(LifecycleEvent::Stop)?;
        self.device_mut()?.close()?;
        self.lifecycle.handle_event(LifecycleEvent::Stop);
        self.pose_valid = false;
        info!("Tool stopped");
        Ok(())
    }

    fn guard(&self, event: LifecycleEvent) -> Result<(), ToolError> {
        if self.device.is_none() {
            return Err(ToolError::NoDevice);
        }
        match self.lifecycle.check(event) {
            TransitionResult::Ok(_) => Ok(()),
            TransitionResult::Rejected(reason) => Err(ToolError::Lifecycle {
                from: self.lifecycle.state(),
                op: event.operation(),
                reason,
            }),
        }
    }

    fn device_mut(&mut self) -> Result<&mut Box<dyn HapticDevice>, ToolError> {
        self.device.as_mut().ok_or(ToolError::NoDevice)
    }

    // ─── Cycle ──────────────────────────────────────────────────────

    /// Read the device and rebuild [`ToolState`].
    ///
    /// No-op without a device. If the position read fails the previous
    /// state is kept and this cycle's output will be zero. Orientation,
    /// velocity and switch reads that fail keep their previous values.
    pub fn update_pose(&mut self) {
        let Some(device) = self.device.as_mut() else {
            return;
        };

        let position = match device.read_position_normalized() {
            Ok(p) => p,
            Err(e) => {
                if self.pose_valid {
                    debug!("Pose read failed, keeping previous state: {}", e);
                }
                self.pose_valid = false;
                return;
            }
        };

        let sample = DeviceSample {
            position,
            rotation: device.read_rotation().unwrap_or(self.state.local_rotation),
            velocity: device.read_velocity().unwrap_or(self.state.local_velocity),
            button: device.read_switch(0).unwrap_or(self.state.button),
        };

        self.state = ToolState::from_sample(&sample, &self.scale, &self.placement);
        self.pose_valid = true;
        trace!("pose {:?}", self.state.global_position);
    }

    /// Evaluate all force sources at the current global position.
    pub fn compute_forces(&mut self) {
        self.last_global_force = self.sources.compute(&self.state.global_position);
    }

    /// Send the last computed force to the device.
    ///
    /// No-op without a device. The force is rotated into the tool frame and
    /// gated by the startup ramp; the device receives it only when forces
    /// are enabled and the ramp is released. In every other case, and after
    /// a failed pose read, the device receives an explicit zero vector.
    ///
    /// # Errors
    ///
    /// `ToolError::Device` if the force command fails.
    pub fn apply_forces(&mut self) -> Result<(), ToolError> {
        let Some(device) = self.device.as_mut() else {
            return Ok(());
        };

        self.last_local_force = self.placement.to_local_force(&self.last_global_force);

        let output = if self.pose_valid {
            let gated = self.ramp.gate(&self.last_local_force);
            if self.forces_enabled { gated } else { Vec3::zeros() }
        } else {
            Vec3::zeros()
        };

        self.last_sent_force = output;
        device.set_force(&output)?;
        Ok(())
    }

    /// `update_pose` → `compute_forces` → `apply_forces`.
    ///
    /// # Errors
    ///
    /// Propagates `apply_forces` errors.
    pub fn run_cycle(&mut self) -> Result<(), ToolError> {
        self.update_pose();
        self.compute_forces();
        self.apply_forces()
    }

    // ─── Settings ───────────────────────────────────────────────────

    /// Set the display radius. The proxy collision radius follows at
    /// `PROXY_RADIUS_SCALE` of it.
    pub fn set_radius(&mut self, radius: f64) {
        self.display_radius = radius.max(0.0);
        self.sources.set_proxy_radius(self.proxy_radius());
    }

    /// Enable force output. Re-arms the startup ramp only when forces were
    /// disabled.
    pub fn enable_forces(&mut self) {
        if !self.forces_enabled {
            self.forces_enabled = true;
            self.ramp.rearm();
            info!("Forces enabled");
        }
    }

    /// Disable force output. The device receives zero until re-enabled.
    pub fn disable_forces(&mut self) {
        if self.forces_enabled {
            info!("Forces disabled");
        }
        self.forces_enabled = false;
    }

    /// Whether release waits for a small force.
    pub fn set_wait_for_small_force(&mut self, wait: bool) {
        self.ramp.set_wait_for_small_force(wait);
    }

    /// Move the tool frame. Takes effect on the next pose update.
    pub fn set_placement(&mut self, placement: ToolPlacement) {
        self.placement = placement;
    }

    // ─── Accessors ──────────────────────────────────────────────────

    /// Current tool placement.
    #[inline]
    pub fn placement(&self) -> &ToolPlacement {
        &self.placement
    }

    /// Workspace scale.
    #[inline]
    pub fn workspace_scale(&self) -> &WorkspaceScale {
        &self.scale
    }

    /// Pose from the last successful read.
    #[inline]
    pub fn tool_state(&self) -> &ToolState {
        &self.state
    }

    /// Whether the last pose read succeeded.
    #[inline]
    pub fn pose_valid(&self) -> bool {
        self.pose_valid
    }

    /// Switch 0 state.
    #[inline]
    pub fn button(&self) -> bool {
        self.state.button
    }

    /// Display radius of the tool sphere.
    #[inline]
    pub fn display_radius(&self) -> f64 {
        self.display_radius
    }

    /// Collision radius passed to force sources.
    #[inline]
    pub fn proxy_radius(&self) -> f64 {
        self.display_radius * PROXY_RADIUS_SCALE
    }

    /// Proxy position of the first source exposing one.
    pub fn proxy_global_position(&self) -> Option<Vec3> {
        self.sources.proxy_global_position()
    }

    /// Proxy position expressed in the tool frame.
    pub fn proxy_local_position(&self) -> Option<Vec3> {
        self.proxy_global_position()
            .map(|p| self.placement.to_local_position(&p))
    }

    /// Sum of all sources from the last `compute_forces`.
    #[inline]
    pub fn last_global_force(&self) -> Vec3 {
        self.last_global_force
    }

    /// Candidate local force from the last `apply_forces`, before gating.
    #[inline]
    pub fn last_local_force(&self) -> Vec3 {
        self.last_local_force
    }

    /// Force actually sent by the last `apply_forces`.
    #[inline]
    pub fn last_sent_force(&self) -> Vec3 {
        self.last_sent_force
    }

    /// Startup ramp phase.
    #[inline]
    pub fn ramp_state(&self) -> RampState {
        self.ramp.state()
    }

    /// Whether force output is enabled.
    #[inline]
    pub fn forces_enabled(&self) -> bool {
        self.forces_enabled
    }

    /// Lifecycle state.
    #[inline]
    pub fn lifecycle(&self) -> LifecycleState {
        self.lifecycle.state()
    }
}

impl Drop for ToolController {
    fn drop(&mut self) {
        if let Some(device) = self.device.as_mut() {
            if let Err(e) = device.close() {
                error!("Closing device '{}' on drop failed: {}", device.name(), e);
            }
        }
    }
}
