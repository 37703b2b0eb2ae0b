//! Simulation device implementation.
//!
//! `SimulationDevice` replays a [`Trajectory`] one step per commanded force,
//! so a controller driving it at its cycle rate sees the end effector move
//! at the scripted speed. Commands issued while the connection is closed
//! fail with `DeviceError::NotOpen`, exactly like real hardware would.

use super::trajectory::Trajectory;
use haptic_common::consts::CYCLE_TIME_US;
use haptic_common::device::{CommandKind, DeviceError, HapticDevice};
use haptic_common::{Mat3, Vec3};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Simulation settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Scripted path of the end effector.
    pub trajectory: Trajectory,
    /// Simulated cycle time, used to derive velocity [µs].
    pub cycle_time_us: u64,
    /// Switch 0 toggles every this many cycles; 0 keeps it released.
    pub switch_period_cycles: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            trajectory: Trajectory::default(),
            cycle_time_us: CYCLE_TIME_US,
            switch_period_cycles: 0,
        }
    }
}

/// Scripted 3-DOF device.
#[derive(Debug)]
pub struct SimulationDevice {
    config: SimulationConfig,
    open: bool,
    calibrated: bool,
    tick: u64,
    last_force: Vec3,
    force_commands: u64,
}

impl SimulationDevice {
    /// Registry name of the simulation device.
    pub const NAME: &'static str = "simulation";

    /// Create a new simulation device.
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            open: false,
            calibrated: false,
            tick: 0,
            last_force: Vec3::zeros(),
            force_commands: 0,
        }
    }

    /// Whether the connection is open.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Whether `initialize()` has completed.
    pub fn is_calibrated(&self) -> bool {
        self.calibrated
    }

    /// Simulated cycles elapsed since calibration.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Last force received through `set_force`.
    pub fn last_force(&self) -> Vec3 {
        self.last_force
    }

    /// Number of `set_force` commands received.
    pub fn force_commands(&self) -> u64 {
        self.force_commands
    }

    fn ensure_open(&self) -> Result<(), DeviceError> {
        if self.open {
            Ok(())
        } else {
            Err(DeviceError::NotOpen)
        }
    }

    fn dt_seconds(&self) -> f64 {
        self.config.cycle_time_us.max(1) as f64 * 1e-6
    }
}

impl Default for SimulationDevice {
    fn default() -> Self {
        Self::new(SimulationConfig::default())
    }
}

impl HapticDevice for SimulationDevice {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn open(&mut self) -> Result<(), DeviceError> {
        if !self.open {
            debug!("Simulation device opened at tick {}", self.tick);
        }
        self.open = true;
        Ok(())
    }

    fn close(&mut self) -> Result<(), DeviceError> {
        if self.open {
            debug!(
                "Simulation device closed after {} force commands",
                self.force_commands
            );
        }
        self.open = false;
        Ok(())
    }

    fn initialize(&mut self) -> Result<(), DeviceError> {
        self.ensure_open()
            .map_err(|e| DeviceError::InitFailed(e.to_string()))?;
        self.tick = 0;
        self.calibrated = true;
        info!("Simulation device calibrated ({:?})", self.config.trajectory);
        Ok(())
    }

    fn read_position_normalized(&mut self) -> Result<Vec3, DeviceError> {
        self.ensure_open()?;
        Ok(self.config.trajectory.sample(self.tick))
    }

    fn read_rotation(&mut self) -> Result<Mat3, DeviceError> {
        self.ensure_open()?;
        Ok(Mat3::identity())
    }

    fn read_velocity(&mut self) -> Result<Vec3, DeviceError> {
        self.ensure_open()?;
        let now = self.config.trajectory.sample(self.tick);
        let before = self.config.trajectory.sample(self.tick.saturating_sub(1));
        Ok((now - before) / self.dt_seconds())
    }

    fn read_switch(&mut self, index: usize) -> Result<bool, DeviceError> {
        self.ensure_open()?;
        if index != 0 {
            return Err(DeviceError::CommandFailed {
                kind: CommandKind::GetSwitch0,
                reason: format!("no switch {index}"),
            });
        }
        let period = self.config.switch_period_cycles;
        Ok(period > 0 && (self.tick / period) % 2 == 1)
    }

    fn set_force(&mut self, force: &Vec3) -> Result<(), DeviceError> {
        self.ensure_open()?;
        self.last_force = *force;
        self.force_commands += 1;
        self.tick += 1;
        Ok(())
    }
}
