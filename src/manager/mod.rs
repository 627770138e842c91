//! Start/stop controller module
//!
//! Owns loop lifecycle - idempotent start/stop, reconfiguration, the remote
//! command surface, and teardown.

mod command;
mod start_stop;

pub use command::{Command, Controllable, dispatch_command};
pub use start_stop::{AUTO_START_ATTRIBUTE, LoopService, StartStopLoop};
