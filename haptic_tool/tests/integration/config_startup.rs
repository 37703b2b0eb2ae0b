//! Integration test: TOML config → controller → haptic loop.

use haptic_common::config::ConfigLoader;
use haptic_hal::{DeviceRegistry, SimulationDevice};
use haptic_tool::config::ToolConfig;
use haptic_tool::cycle::HapticLoop;
use haptic_tool::state::LifecycleState;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

const CONFIG: &str = r#"
[shared]
service_name = "haptic-it"

[tool]
half_extents = [0.1, 0.1, 0.1]

[proxy]
stiffness = 400.0

[cycle]
cycle_time_us = 200

[[scene.planes]]
point = [0.0, 0.0, -0.02]
normal = [0.0, 0.0, 1.0]

[simulation.trajectory]
kind = "sweep"
from = [0.0, 0.0, 0.5]
to = [0.0, 0.0, -0.5]
period_cycles = 40
"#;

#[test]
fn configured_tool_runs_against_simulation() {
    let config = ToolConfig::parse(CONFIG).unwrap();
    config.validate().unwrap();

    let world = Arc::new(config.build_scene());
    let mut tool = config.build_controller(world).unwrap();
    assert_eq!(tool.force_sources().len(), 2);

    let registry = DeviceRegistry::with_builtin();
    assert!(registry.create_device(&config.tool.device).is_ok());
    tool.set_device(Box::new(SimulationDevice::new(config.simulation)));

    tool.initialize().unwrap();
    tool.start().unwrap();

    let running = Arc::new(AtomicBool::new(true));
    let stats = HapticLoop::new(config.cycle_time(), running)
        .with_max_cycles(40)
        .run(&mut tool)
        .unwrap();
    assert_eq!(stats.cycle_count, 40);
    assert_eq!(stats.device_errors, 0);

    // The sweep dips below the floor; the proxy stays on it.
    let proxy = tool.proxy_global_position().unwrap();
    assert!(proxy.z >= -0.02 - 1e-9, "proxy went through the floor: {proxy:?}");

    tool.stop().unwrap();
    assert_eq!(tool.lifecycle(), LifecycleState::Stopped);
}
