//! Remote command surface.
//!
//! A command is a JSON object whose keys name operations; argument values
//! are ignored. Only `start` and `stop` are recognized. The reply maps every
//! input key to whether it was handled.

use serde_json::{Map, Value};

use crate::config::ResourceConfig;
use crate::domain::{LoopOutcome, LoopStatus};
use crate::error::Result;
use crate::resource::Dependencies;

use super::start_stop::{LoopService, StartStopLoop};

/// Operations reachable through `do_command`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
}

impl Command {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "start" => Some(Command::Start),
            "stop" => Some(Command::Stop),
            _ => None,
        }
    }
}

/// Object-safe view of a controller, independent of its service type.
pub trait Controllable: Send + Sync {
    fn name(&self) -> &str;
    fn model(&self) -> &'static str;
    fn start(&self) -> Result<()>;
    fn stop(&self);
    fn reconfigure(&self, config: ResourceConfig, dependencies: Dependencies) -> Result<()>;
    fn status(&self) -> LoopStatus;
    fn last_outcome(&self) -> Option<LoopOutcome>;

    /// Dispatch a command object. See the module docs for the format.
    fn do_command(&self, command: &Map<String, Value>) -> Map<String, Value> {
        dispatch_command(self, command)
    }
}

impl<S: LoopService> Controllable for StartStopLoop<S> {
    fn name(&self) -> &str {
        StartStopLoop::name(self)
    }

    fn model(&self) -> &'static str {
        StartStopLoop::model(self)
    }

    fn start(&self) -> Result<()> {
        StartStopLoop::start(self)
    }

    fn stop(&self) {
        StartStopLoop::stop(self)
    }

    fn reconfigure(&self, config: ResourceConfig, dependencies: Dependencies) -> Result<()> {
        StartStopLoop::reconfigure(self, config, dependencies)
    }

    fn status(&self) -> LoopStatus {
        StartStopLoop::status(self)
    }

    fn last_outcome(&self) -> Option<LoopOutcome> {
        StartStopLoop::last_outcome(self)
    }
}

/// Run each recognized key of `command` against `target`, in input order.
pub fn dispatch_command<C: Controllable + ?Sized>(target: &C, command: &Map<String, Value>) -> Map<String, Value> {
    log::info!("do_command on '{}' called with: {}", target.name(), Value::Object(command.clone()));

    let mut result = Map::new();
    for name in command.keys() {
        let handled = match Command::parse(name) {
            Some(Command::Start) => match target.start() {
                Ok(()) => true,
                Err(e) => {
                    log::error!("Command start on '{}' failed: {}", target.name(), e);
                    false
                }
            },
            Some(Command::Stop) => {
                target.stop();
                true
            }
            None => {
                log::debug!("Ignoring unknown command '{}' for '{}'", name, target.name());
                false
            }
        };
        result.insert(name.clone(), Value::Bool(handled));
    }
    result
}
