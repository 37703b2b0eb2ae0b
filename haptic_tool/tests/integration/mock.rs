//! Recording device shared by the integration tests.
//!
//! The device half is handed to the controller; the test keeps a
//! [`DeviceHandle`] to script readings and inspect every command.

use haptic_common::device::{CommandKind, DeviceError, HapticDevice};
use haptic_common::world::{Scene, World};
use haptic_common::{Mat3, Vec3};
use haptic_tool::controller::ToolController;
use haptic_tool::force::ForceSource;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug)]
pub struct DeviceScript {
    pub position: Vec3,
    pub rotation: Mat3,
    pub velocity: Vec3,
    pub button: bool,
    pub fail_position: bool,
    pub fail_open: bool,
    pub fail_init: bool,
    /// Number of upcoming `close` calls that fail.
    pub failing_closes: u32,
    pub open: bool,
    pub opens: u32,
    pub closes: u32,
    pub inits: u32,
    pub forces: Vec<Vec3>,
}

impl Default for DeviceScript {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Mat3::identity(),
            velocity: Vec3::zeros(),
            button: false,
            fail_position: false,
            fail_open: false,
            fail_init: false,
            failing_closes: 0,
            open: false,
            opens: 0,
            closes: 0,
            inits: 0,
            forces: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeviceHandle(Arc<Mutex<DeviceScript>>);

impl DeviceHandle {
    pub fn get(&self) -> MutexGuard<'_, DeviceScript> {
        self.0.lock().unwrap()
    }

    pub fn set_position(&self, position: Vec3) {
        self.get().position = position;
    }

    pub fn last_force(&self) -> Option<Vec3> {
        self.get().forces.last().copied()
    }

    pub fn force_count(&self) -> usize {
        self.get().forces.len()
    }
}

pub struct RecordingDevice(DeviceHandle);

impl HapticDevice for RecordingDevice {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn open(&mut self) -> Result<(), DeviceError> {
        let mut s = self.0.get();
        if s.fail_open {
            return Err(DeviceError::OpenFailed("scripted".to_string()));
        }
        s.opens += 1;
        s.open = true;
        Ok(())
    }

    fn close(&mut self) -> Result<(), DeviceError> {
        let mut s = self.0.get();
        s.closes += 1;
        if s.failing_closes > 0 {
            s.failing_closes -= 1;
            return Err(DeviceError::CloseFailed("scripted".to_string()));
        }
        s.open = false;
        Ok(())
    }

    fn initialize(&mut self) -> Result<(), DeviceError> {
        let mut s = self.0.get();
        if s.fail_init {
            return Err(DeviceError::InitFailed("scripted".to_string()));
        }
        s.inits += 1;
        Ok(())
    }

    fn read_position_normalized(&mut self) -> Result<Vec3, DeviceError> {
        let s = self.0.get();
        if s.fail_position {
            return Err(DeviceError::CommandFailed {
                kind: CommandKind::GetPositionNormalized,
                reason: "scripted".to_string(),
            });
        }
        Ok(s.position)
    }

    fn read_rotation(&mut self) -> Result<Mat3, DeviceError> {
        Ok(self.0.get().rotation)
    }

    fn read_velocity(&mut self) -> Result<Vec3, DeviceError> {
        Ok(self.0.get().velocity)
    }

    fn read_switch(&mut self, _index: usize) -> Result<bool, DeviceError> {
        Ok(self.0.get().button)
    }

    fn set_force(&mut self, force: &Vec3) -> Result<(), DeviceError> {
        self.0.get().forces.push(*force);
        Ok(())
    }
}

pub fn recording_device() -> (Box<dyn HapticDevice>, DeviceHandle) {
    let handle = DeviceHandle::default();
    (Box::new(RecordingDevice(handle.clone())), handle)
}

/// Source returning a fixed, adjustable global force.
pub struct ScriptedForce(pub Arc<Mutex<Vec3>>);

impl ForceSource for ScriptedForce {
    fn initialize(&mut self, _world: Arc<dyn World>, _initial_position: &Vec3) {}

    fn compute(&mut self, _position: &Vec3) -> Vec3 {
        *self.0.lock().unwrap()
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

pub fn scripted_force(initial: Vec3) -> (Box<dyn ForceSource>, Arc<Mutex<Vec3>>) {
    let cell = Arc::new(Mutex::new(initial));
    (Box::new(ScriptedForce(Arc::clone(&cell))), cell)
}

pub fn empty_world() -> Arc<dyn World> {
    Arc::new(Scene::new())
}

/// Controller with a recording device, initialized and started.
pub fn running_tool(sources: Vec<Box<dyn ForceSource>>) -> (ToolController, DeviceHandle) {
    let (device, handle) = recording_device();
    let mut tool = ToolController::new(empty_world()).with_device(device);
    for source in sources {
        tool.add_force_source(source);
    }
    tool.initialize().unwrap();
    tool.start().unwrap();
    (tool, handle)
}
