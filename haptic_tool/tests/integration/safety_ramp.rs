//! Integration test: startup ramp and force enable as seen by the device.

use super::mock::{running_tool, scripted_force};
use haptic_common::Vec3;
use haptic_tool::safety::RampState;

fn large() -> Vec3 {
    Vec3::new(0.0, 0.0, 2.0)
}

fn small() -> Vec3 {
    Vec3::new(0.0, 0.0, 1e-4)
}

#[test]
fn large_startup_force_is_held_until_small() {
    let (source, force) = scripted_force(large());
    let (mut tool, handle) = running_tool(vec![source]);

    for _ in 0..5 {
        tool.run_cycle().unwrap();
        assert_eq!(handle.last_force(), Some(Vec3::zeros()));
    }
    assert_eq!(tool.ramp_state(), RampState::Armed);
    assert_eq!(tool.last_local_force(), large());

    *force.lock().unwrap() = small();
    tool.run_cycle().unwrap();
    assert_eq!(tool.ramp_state(), RampState::Released);
    assert_eq!(handle.last_force(), Some(small()));

    // Once released, large forces pass unchanged.
    *force.lock().unwrap() = large();
    tool.run_cycle().unwrap();
    assert_eq!(handle.last_force(), Some(large()));
}

#[test]
fn every_cycle_commands_the_device() {
    let (source, _) = scripted_force(large());
    let (mut tool, handle) = running_tool(vec![source]);
    for _ in 0..7 {
        tool.run_cycle().unwrap();
    }
    assert_eq!(handle.force_count(), 7);
}

#[test]
fn no_wait_policy_passes_immediately() {
    let (source, _) = scripted_force(large());
    let (mut tool, handle) = running_tool(vec![source]);
    tool.set_wait_for_small_force(false);

    tool.run_cycle().unwrap();
    assert_eq!(handle.last_force(), Some(large()));
}

#[test]
fn disable_sends_zero_and_enable_rearms() {
    let (source, force) = scripted_force(small());
    let (mut tool, handle) = running_tool(vec![source]);
    tool.run_cycle().unwrap();
    assert_eq!(tool.ramp_state(), RampState::Released);

    *force.lock().unwrap() = large();
    tool.disable_forces();
    tool.run_cycle().unwrap();
    assert_eq!(handle.last_force(), Some(Vec3::zeros()));

    tool.enable_forces();
    assert_eq!(tool.ramp_state(), RampState::Armed);
    tool.run_cycle().unwrap();
    assert_eq!(handle.last_force(), Some(Vec3::zeros()));

    *force.lock().unwrap() = small();
    tool.run_cycle().unwrap();
    assert_eq!(handle.last_force(), Some(small()));
}

#[test]
fn enable_while_enabled_keeps_output_continuous() {
    let (source, force) = scripted_force(small());
    let (mut tool, handle) = running_tool(vec![source]);
    tool.run_cycle().unwrap();

    *force.lock().unwrap() = large();
    tool.enable_forces();
    tool.run_cycle().unwrap();

    assert_eq!(tool.ramp_state(), RampState::Released);
    assert_eq!(handle.last_force(), Some(large()));
}

#[test]
fn disabled_forces_still_release_ramp() {
    let (source, force) = scripted_force(small());
    let (mut tool, handle) = running_tool(vec![source]);
    tool.disable_forces();
    tool.run_cycle().unwrap();

    // The ramp evaluates independently of the enable flag.
    assert_eq!(tool.ramp_state(), RampState::Released);
    assert_eq!(handle.last_force(), Some(Vec3::zeros()));

    *force.lock().unwrap() = large();
    tool.enable_forces();
    tool.run_cycle().unwrap();
    assert_eq!(handle.last_force(), Some(Vec3::zeros()));
}
