//! Host context - the motors and services one process brings up
//!
//! ServiceHost builds every simulated motor and service named in a
//! `HostConfig`, keeps them addressable by name, and stops them all on
//! shutdown.

use std::collections::BTreeMap;
use std::sync::Arc;

use eyre::{Context, Result};
use serde::Serialize;

use crate::config::{HostConfig, ResourceConfig};
use crate::domain::{LoopOutcome, LoopStatus};
use crate::loops;
use crate::manager::Controllable;
use crate::resource::{Dependencies, Resource, SimulatedMotor};
use crate::runner::LoopRunner;

/// Point-in-time view of one service, as printed by `list`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceSummary {
    pub name: String,
    pub model: String,
    pub status: LoopStatus,
    pub last_outcome: Option<LoopOutcome>,
}

/// Owns the resources of a running host.
pub struct ServiceHost {
    motors: BTreeMap<String, Arc<SimulatedMotor>>,
    services: Vec<Arc<dyn Controllable>>,
}

impl ServiceHost {
    /// Build motors first, then each service against them. Services with
    /// `auto_start` are running when this returns.
    pub fn build(config: &HostConfig) -> Result<Self> {
        config.validate().context("Invalid host configuration")?;

        let motors: BTreeMap<_, _> = config
            .motors
            .iter()
            .map(|spec| {
                let motor = SimulatedMotor::new(&spec.name).with_ms_per_revolution(spec.ms_per_revolution);
                (spec.name.clone(), Arc::new(motor))
            })
            .collect();

        let runner = LoopRunner::with_config(config.runner.to_runner_config());
        let mut host = Self {
            motors,
            services: Vec::with_capacity(config.services.len()),
        };

        for service in &config.services {
            let dependencies = host.dependencies_for(service);
            let controller = loops::build(service.clone(), dependencies, runner.clone())
                .context(format!("Failed to build service '{}'", service.name))?;
            log::info!("Built service '{}' ({}): {}", service.name, service.model, controller.status());
            host.services.push(controller);
        }

        Ok(host)
    }

    /// `build` from async code. Construction and the teardown of a partly
    /// built host both join worker threads, so this runs on the blocking pool.
    pub async fn spawn(config: HostConfig) -> Result<Self> {
        tokio::task::spawn_blocking(move || Self::build(&config))
            .await
            .context("Host build task failed")?
    }

    fn dependencies_for(&self, service: &ResourceConfig) -> Dependencies {
        let mut dependencies = Dependencies::new();
        for name in &service.depends_on {
            if let Some(motor) = self.motors.get(name) {
                dependencies.insert(name.clone(), Resource::Motor(motor.clone()));
            }
        }
        dependencies
    }

    pub fn service(&self, name: &str) -> Option<&Arc<dyn Controllable>> {
        self.services.iter().find(|s| s.name() == name)
    }

    pub fn motor(&self, name: &str) -> Option<&Arc<SimulatedMotor>> {
        self.motors.get(name)
    }

    pub fn service_names(&self) -> Vec<String> {
        self.services.iter().map(|s| s.name().to_string()).collect()
    }

    pub fn summaries(&self) -> Vec<ServiceSummary> {
        self.services
            .iter()
            .map(|s| ServiceSummary {
                name: s.name().to_string(),
                model: s.model().to_string(),
                status: s.status(),
                last_outcome: s.last_outcome(),
            })
            .collect()
    }

    /// Stop every service in reverse build order.
    pub fn stop_all(&self) {
        for service in self.services.iter().rev() {
            log::info!("Stopping service '{}'", service.name());
            service.stop();
        }
    }
}
