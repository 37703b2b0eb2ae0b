//! Integration test: pose → force → device output.

use super::mock::{empty_world, recording_device, running_tool, scripted_force};
use approx::assert_relative_eq;
use haptic_common::world::{FieldSource, Plane, Scene, World};
use haptic_common::{Mat3, Vec3};
use haptic_tool::controller::ToolController;
use haptic_tool::force::{PotentialFieldForce, ProxyPointForce};
use haptic_tool::frame::{ToolPlacement, WorkspaceScale};
use haptic_tool::safety::RampState;
use nalgebra::Rotation3;
use std::sync::Arc;

fn rot_z(angle: f64) -> Mat3 {
    Rotation3::from_axis_angle(&Vec3::z_axis(), angle).into_inner()
}

#[test]
fn normalized_reading_maps_to_world() {
    let (device, handle) = recording_device();
    handle.set_position(Vec3::new(0.5, 0.0, -1.0));
    handle.get().velocity = Vec3::new(0.0, 0.3, 0.0);
    handle.get().button = true;

    let mut tool = ToolController::new(empty_world())
        .with_workspace_scale(WorkspaceScale::new(Vec3::repeat(0.1)).unwrap())
        .with_device(device);
    tool.initialize().unwrap();
    tool.start().unwrap();
    tool.update_pose();

    let state = tool.tool_state();
    assert_relative_eq!(state.local_position, Vec3::new(0.05, 0.0, -0.1), epsilon = 1e-15);
    assert_eq!(state.global_position, state.local_position);
    assert_eq!(state.global_velocity, Vec3::new(0.0, 0.3, 0.0));
    assert!(tool.button());
}

#[test]
fn placement_rotates_pose_and_force() {
    let placement = ToolPlacement::new(Vec3::new(1.0, 0.0, 0.0), rot_z(std::f64::consts::FRAC_PI_2)).unwrap();
    let (source, _) = scripted_force(Vec3::new(0.0, 1e-4, 0.0));
    let (device, handle) = recording_device();
    handle.set_position(Vec3::new(1.0, 0.0, 0.0));
    handle.get().rotation = rot_z(0.25);

    let mut tool = ToolController::new(empty_world())
        .with_placement(placement)
        .with_device(device);
    tool.add_force_source(source);
    tool.initialize().unwrap();
    tool.start().unwrap();
    tool.run_cycle().unwrap();

    let state = tool.tool_state();
    assert_relative_eq!(state.global_position, Vec3::new(1.0, 1.0, 0.0), epsilon = 1e-12);
    assert_relative_eq!(state.global_rotation, rot_z(0.25) * rot_z(std::f64::consts::FRAC_PI_2), epsilon = 1e-12);

    // Global +Y seen from a frame rotated +90° about Z is local +X.
    let sent = handle.last_force().unwrap();
    assert_relative_eq!(sent, Vec3::new(1e-4, 0.0, 0.0), epsilon = 1e-15);
    assert_relative_eq!(tool.last_global_force(), Vec3::new(0.0, 1e-4, 0.0));
}

#[test]
fn sources_are_summed_before_output() {
    let (a, _) = scripted_force(Vec3::new(1e-4, 0.0, 0.0));
    let (b, _) = scripted_force(Vec3::new(0.0, 0.0, -2e-4));
    let (mut tool, handle) = running_tool(vec![a, b]);
    tool.run_cycle().unwrap();

    assert_eq!(tool.force_sources().len(), 2);
    assert_relative_eq!(handle.last_force().unwrap(), Vec3::new(1e-4, 0.0, -2e-4));
}

#[test]
fn empty_source_set_sends_zero() {
    let (mut tool, handle) = running_tool(Vec::new());
    tool.run_cycle().unwrap();
    assert_eq!(handle.last_force(), Some(Vec3::zeros()));
    assert_eq!(tool.ramp_state(), RampState::Released);
}

#[test]
fn proxy_renders_floor_contact() {
    let world: Arc<dyn World> = Arc::new(Scene::new().with_plane(Plane::new(Vec3::zeros(), Vec3::z())));
    let (device, handle) = recording_device();
    handle.set_position(Vec3::new(0.0, 0.0, 0.5));

    let mut tool = ToolController::new(world)
        .with_workspace_scale(WorkspaceScale::new(Vec3::repeat(0.1)).unwrap())
        .with_device(device);
    tool.add_force_source(Box::new(ProxyPointForce::new(100.0)));
    tool.set_radius(0.0);
    tool.initialize().unwrap();
    tool.start().unwrap();

    // Above the floor: free motion, ramp releases on zero force.
    tool.run_cycle().unwrap();
    assert_eq!(handle.last_force(), Some(Vec3::zeros()));
    assert_eq!(tool.ramp_state(), RampState::Released);

    // Push 1 cm into the floor.
    handle.set_position(Vec3::new(0.2, 0.0, -0.1));
    tool.run_cycle().unwrap();
    let sent = handle.last_force().unwrap();
    assert_relative_eq!(sent, Vec3::new(0.0, 0.0, 1.0), epsilon = 1e-9);

    let proxy = tool.proxy_global_position().unwrap();
    assert_relative_eq!(proxy.z, 0.0, epsilon = 1e-12);
    assert_eq!(tool.force_sources().iter().next().unwrap().contacts().len(), 1);
}

#[test]
fn proxy_local_position_uses_tool_frame() {
    let world: Arc<dyn World> = Arc::new(Scene::new());
    let placement = ToolPlacement::from_origin(Vec3::new(0.0, 0.0, 1.0)).unwrap();
    let (device, handle) = recording_device();
    handle.set_position(Vec3::new(0.1, 0.2, 0.3));

    let mut tool = ToolController::new(world).with_placement(placement).with_device(device);
    tool.add_force_source(Box::new(ProxyPointForce::default()));
    tool.initialize().unwrap();
    tool.start().unwrap();
    tool.run_cycle().unwrap();

    assert_relative_eq!(tool.proxy_global_position().unwrap(), Vec3::new(0.1, 0.2, 1.3), epsilon = 1e-12);
    assert_relative_eq!(tool.proxy_local_position().unwrap(), Vec3::new(0.1, 0.2, 0.3), epsilon = 1e-12);
}

#[test]
fn potential_field_reaches_device() {
    let world: Arc<dyn World> = Arc::new(Scene::new().with_field(FieldSource {
        center: Vec3::zeros(),
        influence_radius: 1.0,
        stiffness: 1e-3,
    }));
    let (device, handle) = recording_device();
    handle.set_position(Vec3::new(0.5, 0.0, 0.0));

    let mut tool = ToolController::new(world).with_device(device);
    tool.add_force_source(Box::new(PotentialFieldForce::new()));
    tool.initialize().unwrap();
    tool.start().unwrap();
    tool.run_cycle().unwrap();

    // 1e-3 · (1 − 0.5) along +X.
    assert_relative_eq!(handle.last_force().unwrap(), Vec3::new(5e-4, 0.0, 0.0), epsilon = 1e-15);
}

#[test]
fn failed_pose_read_keeps_state_and_sends_zero() {
    let (source, _) = scripted_force(Vec3::new(1e-4, 0.0, 0.0));
    let (mut tool, handle) = running_tool(vec![source]);
    handle.set_position(Vec3::new(0.3, 0.3, 0.3));
    tool.run_cycle().unwrap();
    assert_relative_eq!(handle.last_force().unwrap(), Vec3::new(1e-4, 0.0, 0.0));
    let before = *tool.tool_state();

    handle.get().fail_position = true;
    handle.set_position(Vec3::new(-0.9, 0.0, 0.0));
    tool.run_cycle().unwrap();

    assert!(!tool.pose_valid());
    assert_eq!(*tool.tool_state(), before);
    assert_eq!(handle.last_force(), Some(Vec3::zeros()));
    assert_eq!(tool.ramp_state(), RampState::Released);

    handle.get().fail_position = false;
    tool.run_cycle().unwrap();
    assert!(tool.pose_valid());
    assert_relative_eq!(tool.tool_state().global_position, Vec3::new(-0.9, 0.0, 0.0));
    assert_relative_eq!(handle.last_force().unwrap(), Vec3::new(1e-4, 0.0, 0.0));
}
