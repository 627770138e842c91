//! StartStop - restartable background loops behind a start/stop controller
//!
//! A `StartStopLoop` owns one repeating unit of work running on its own
//! worker thread. It starts and stops idempotently, swaps configuration only
//! while stopped, and answers `{"start": ..}` / `{"stop": ..}` commands.

pub mod config;
pub mod coordination;
pub mod daemon;
pub mod domain;
pub mod error;
pub mod loops;
pub mod manager;
pub mod resource;
pub mod runner;

pub use config::{HostConfig, ResourceConfig};
pub use domain::{LoopOutcome, LoopStatus};
pub use error::{Result, StartStopError};
pub use manager::{Controllable, LoopService, StartStopLoop};
pub use resource::{Dependencies, Motor, Resource, SimulatedMotor};
pub use runner::{LoopBody, LoopRunner, LoopRunnerConfig};
