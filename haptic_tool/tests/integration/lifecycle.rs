//! Integration test: controller lifecycle and device ownership.

use super::mock::{empty_world, recording_device, scripted_force};
use haptic_common::Vec3;
use haptic_common::device::DeviceError;
use haptic_tool::controller::ToolController;
use haptic_tool::error::ToolError;
use haptic_tool::force::ProxyPointForce;
use haptic_tool::state::LifecycleState;

#[test]
fn initialize_reads_baseline_and_seeds_sources() {
    let (device, handle) = recording_device();
    handle.set_position(Vec3::new(0.2, -0.4, 0.6));

    let mut tool = ToolController::new(empty_world()).with_device(device);
    tool.add_force_source(Box::new(ProxyPointForce::default()));
    assert_eq!(tool.proxy_global_position(), None);

    tool.initialize().unwrap();

    {
        let s = handle.get();
        assert_eq!((s.opens, s.inits, s.closes), (1, 1, 1));
        assert!(!s.open);
        assert!(s.forces.is_empty());
    }
    assert_eq!(tool.lifecycle(), LifecycleState::Initialized);
    assert_eq!(tool.proxy_global_position(), Some(Vec3::new(0.2, -0.4, 0.6)));
}

#[test]
fn initialize_without_device_touches_nothing() {
    let mut tool = ToolController::new(empty_world());
    tool.add_force_source(Box::new(ProxyPointForce::default()));

    assert_eq!(tool.initialize(), Err(ToolError::NoDevice));
    assert_eq!(tool.proxy_global_position(), None);
    assert_eq!(tool.lifecycle(), LifecycleState::Uninitialized);
}

#[test]
fn open_failure_is_surfaced() {
    let (device, handle) = recording_device();
    handle.get().fail_open = true;
    let mut tool = ToolController::new(empty_world()).with_device(device);

    assert!(matches!(
        tool.initialize(),
        Err(ToolError::Device(DeviceError::OpenFailed(_)))
    ));
    assert_eq!(tool.lifecycle(), LifecycleState::Uninitialized);
}

#[test]
fn calibration_failure_closes_device() {
    let (device, handle) = recording_device();
    handle.get().fail_init = true;
    let mut tool = ToolController::new(empty_world()).with_device(device);
    tool.add_force_source(Box::new(ProxyPointForce::default()));

    assert!(matches!(
        tool.initialize(),
        Err(ToolError::Device(DeviceError::InitFailed(_)))
    ));
    assert!(!handle.get().open);
    assert_eq!(tool.proxy_global_position(), None);
}

#[test]
fn stop_closes_device_left_open_by_failed_initialize() {
    let (device, handle) = recording_device();
    handle.get().failing_closes = 1;
    let mut tool = ToolController::new(empty_world()).with_device(device);

    assert!(matches!(
        tool.initialize(),
        Err(ToolError::Device(DeviceError::CloseFailed(_)))
    ));
    assert!(handle.get().open);
    assert_eq!(tool.lifecycle(), LifecycleState::Uninitialized);

    tool.stop().unwrap();
    assert!(!handle.get().open);
    assert_eq!(tool.lifecycle(), LifecycleState::Uninitialized);
    assert!(matches!(tool.start(), Err(ToolError::Lifecycle { .. })));
}

#[test]
fn stop_before_start_closes_and_keeps_state() {
    let (device, handle) = recording_device();
    let mut tool = ToolController::new(empty_world()).with_device(device);
    tool.initialize().unwrap();

    tool.stop().unwrap();
    assert_eq!(handle.get().closes, 2);
    assert_eq!(tool.lifecycle(), LifecycleState::Initialized);

    tool.start().unwrap();
    assert_eq!(tool.lifecycle(), LifecycleState::Running);
}

#[test]
fn start_stop_open_and_close() {
    let (device, handle) = recording_device();
    let mut tool = ToolController::new(empty_world()).with_device(device);

    assert!(matches!(tool.start(), Err(ToolError::Lifecycle { .. })));
    tool.initialize().unwrap();

    tool.start().unwrap();
    assert!(handle.get().open);
    assert_eq!(tool.lifecycle(), LifecycleState::Running);
    assert!(matches!(tool.initialize(), Err(ToolError::Lifecycle { .. })));

    tool.stop().unwrap();
    assert!(!handle.get().open);
    assert_eq!(tool.lifecycle(), LifecycleState::Stopped);

    tool.start().unwrap();
    assert_eq!(tool.lifecycle(), LifecycleState::Running);
    assert_eq!(handle.get().opens, 3);
}

#[test]
fn no_device_cycle_is_noop() {
    let (source, _) = scripted_force(Vec3::new(0.0, 0.0, 1.0));
    let mut tool = ToolController::new(empty_world());
    tool.add_force_source(source);

    let before = *tool.tool_state();
    tool.update_pose();
    tool.apply_forces().unwrap();
    assert_eq!(*tool.tool_state(), before);
    assert_eq!(tool.last_sent_force(), Vec3::zeros());
}

#[test]
fn drop_closes_device() {
    let (device, handle) = recording_device();
    {
        let mut tool = ToolController::new(empty_world()).with_device(device);
        tool.initialize().unwrap();
        tool.start().unwrap();
        assert!(handle.get().open);
    }
    assert!(!handle.get().open);
}

#[test]
fn replacing_device_closes_previous() {
    let (first, first_handle) = recording_device();
    let (second, second_handle) = recording_device();
    let mut tool = ToolController::new(empty_world()).with_device(first);
    tool.initialize().unwrap();
    tool.start().unwrap();

    tool.set_device(second);
    assert!(!first_handle.get().open);
    assert_eq!(tool.lifecycle(), LifecycleState::Uninitialized);

    tool.initialize().unwrap();
    assert_eq!(second_handle.get().inits, 1);
}

#[test]
fn sources_added_after_initialize_are_seeded() {
    let (device, handle) = recording_device();
    handle.set_position(Vec3::new(0.1, 0.0, 0.0));
    let mut tool = ToolController::new(empty_world()).with_device(device);
    tool.initialize().unwrap();

    tool.add_force_source(Box::new(ProxyPointForce::default()));
    assert_eq!(tool.proxy_global_position(), Some(Vec3::new(0.1, 0.0, 0.0)));
}
