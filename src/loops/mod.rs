//! Concrete loop services and the model registry.
//!
//! - `ExampleService`: logs once per iteration
//! - `MotorRevolutionsOscillation`: drives a motor forward and back
//!
//! A host picks the implementation by the model triplet in each
//! `ResourceConfig`.

mod example;
mod oscillation;

use std::sync::Arc;

use crate::config::ResourceConfig;
use crate::error::{Result, StartStopError};
use crate::manager::{Controllable, LoopService, StartStopLoop};
use crate::resource::Dependencies;
use crate::runner::LoopRunner;

pub use example::ExampleService;
pub use oscillation::MotorRevolutionsOscillation;

/// Model triplets this crate can serve.
pub fn models() -> [&'static str; 2] {
    [ExampleService::MODEL, MotorRevolutionsOscillation::MODEL]
}

/// Run the model's attribute validation without building anything.
pub fn validate_config(config: &ResourceConfig) -> Result<()> {
    match config.model.as_str() {
        ExampleService::MODEL => ExampleService::validate_config(config),
        MotorRevolutionsOscillation::MODEL => MotorRevolutionsOscillation::validate_config(config),
        other => Err(unknown_model(other)),
    }
}

/// Construct a controller for the config's model.
pub fn build(config: ResourceConfig, dependencies: Dependencies, runner: LoopRunner) -> Result<Arc<dyn Controllable>> {
    match config.model.as_str() {
        ExampleService::MODEL => construct::<ExampleService>(config, dependencies, runner),
        MotorRevolutionsOscillation::MODEL => construct::<MotorRevolutionsOscillation>(config, dependencies, runner),
        other => Err(unknown_model(other)),
    }
}

fn construct<S: LoopService>(
    config: ResourceConfig,
    dependencies: Dependencies,
    runner: LoopRunner,
) -> Result<Arc<dyn Controllable>> {
    let controller = StartStopLoop::<S>::with_options(config, dependencies, S::AUTO_START, runner)?;
    Ok(Arc::new(controller))
}

fn unknown_model(model: &str) -> StartStopError {
    StartStopError::Config(format!("unknown model '{}', expected one of {:?}", model, models()))
}
