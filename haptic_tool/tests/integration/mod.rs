mod config_startup;
mod lifecycle;
mod mock;
mod pipeline;
mod safety_ramp;
