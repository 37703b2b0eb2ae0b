//! # Haptic Tool
//!
//! Runs one haptic tool against the reference scene described in its
//! configuration file.
//!
//! # Usage
//!
//! ```bash
//! # Built-in defaults: simulation device over a floor plane
//! haptic_tool
//!
//! # Configured scene, 5 seconds at 1 kHz
//! haptic_tool --config config/haptic_tool.toml --cycles 5000
//!
//! # Verbose JSON logs
//! haptic_tool -v --json
//! ```

use clap::Parser;
use haptic_common::config::{ConfigError, ConfigLoader};
use haptic_common::device::HapticDevice;
use haptic_common::world::World;
use haptic_hal::{DeviceRegistry, RegistryError, SimulationDevice};
use haptic_tool::config::ToolConfig;
use haptic_tool::cycle::{DEFAULT_RT_PRIORITY, HapticLoop, rt_setup};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Configuration used when `--config` is not given.
const DEFAULT_CONFIG: &str = r#"
[shared]
service_name = "haptic-tool"

[tool]
half_extents = [0.1, 0.1, 0.1]

[proxy]
stiffness = 400.0

[[scene.planes]]
point = [0.0, 0.0, -0.05]
normal = [0.0, 0.0, 1.0]
"#;

/// Haptic Tool - 3-DOF haptic rendering loop
#[derive(Parser, Debug)]
#[command(name = "haptic_tool")]
#[command(version)]
#[command(about = "Fixed-rate 3-DOF haptic tool loop")]
struct Args {
    /// Path to the tool configuration TOML.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Stop after this many cycles (default: run until Ctrl-C).
    #[arg(long)]
    cycles: Option<u64>,

    /// Device to use, overriding `tool.device`.
    #[arg(short, long)]
    device: Option<String>,

    /// SCHED_FIFO priority (only with the `rt` feature).
    #[arg(long, default_value_t = DEFAULT_RT_PRIORITY)]
    rt_priority: i32,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();
    let config = load_config(&args);

    let level = match &config {
        Ok(c) => c.shared.log_level.as_directive(),
        Err(_) => "info",
    };
    setup_tracing(&args, level);

    info!("Haptic Tool v{} starting...", env!("CARGO_PKG_VERSION"));

    let result = config
        .map_err(Box::<dyn std::error::Error>::from)
        .and_then(|config| run(&args, config));
    if let Err(e) = result {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("Haptic Tool shutdown complete");
}

fn load_config(args: &Args) -> Result<ToolConfig, ConfigError> {
    let config = match &args.config {
        Some(path) => ToolConfig::load(path)?,
        None => ToolConfig::parse(DEFAULT_CONFIG)?,
    };
    config.validate()?;
    Ok(config)
}

fn run(args: &Args, config: ToolConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!("Service: {}", config.shared.service_name);

    let world: Arc<dyn World> = Arc::new(config.build_scene());
    let mut tool = config.build_controller(Arc::clone(&world))?;

    let registry = DeviceRegistry::with_builtin();
    let device_name = args.device.as_deref().unwrap_or(&config.tool.device);
    info!("Available devices: {:?}", registry.list_devices());
    tool.set_device(create_device(&registry, device_name, &config)?);

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        ctrlc::set_handler(move || {
            info!("Received shutdown signal");
            running.store(false, Ordering::SeqCst);
        })?;
    }

    if let Err(e) = rt_setup(args.rt_priority) {
        warn!("{e}; continuing with normal scheduling");
    }

    tool.initialize()?;
    tool.start()?;

    let mut haptic_loop = HapticLoop::new(config.cycle_time(), running);
    if let Some(cycles) = args.cycles {
        haptic_loop = haptic_loop.with_max_cycles(cycles);
    }
    let loop_result = haptic_loop.run(&mut tool);
    let stop_result = tool.stop();

    let stats = loop_result?;
    stop_result?;

    info!(
        "Final pose {:?}, proxy {:?}, last force {:?}, {} stale / {} failed cycles",
        tool.tool_state().global_position,
        tool.proxy_global_position(),
        tool.last_sent_force(),
        stats.stale_cycles,
        stats.device_errors
    );
    Ok(())
}

/// Create `name` from the registry. The simulation device is rebuilt with
/// the `[simulation]` settings.
fn create_device(
    registry: &DeviceRegistry,
    name: &str,
    config: &ToolConfig,
) -> Result<Box<dyn HapticDevice>, RegistryError> {
    let device = registry.create_device(name)?;
    if device.name() == SimulationDevice::NAME {
        return Ok(Box::new(SimulationDevice::new(config.simulation)));
    }
    Ok(device)
}

fn setup_tracing(args: &Args, default_level: &str) {
    let level = if args.verbose { "debug" } else { default_level };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
