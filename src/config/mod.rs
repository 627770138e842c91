//! Configuration for startstop.
//!
//! Two layers:
//! 1. Per-service `ResourceConfig` snapshots handed to `reconfigure`
//! 2. The host file (./startstop.yml or ~/.config/startstop/startstop.yml)
//!    listing motors and services for the `startstop` binary

mod host;
mod resource;

pub use self::host::{CONFIG_FILE_NAME, HostConfig, MotorSpec, RunnerSettings};
pub use self::resource::ResourceConfig;
