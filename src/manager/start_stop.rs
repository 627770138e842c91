//! Start/stop controller implementation
//!
//! StartStopLoop owns the lifecycle of one repeating background loop: it
//! starts and stops it idempotently, swaps configuration only while the loop
//! is stopped, and tears the loop down when dropped.

use parking_lot::Mutex;

use crate::config::ResourceConfig;
use crate::coordination::CancelSignal;
use crate::domain::{LoopOutcome, LoopStatus};
use crate::error::Result;
use crate::resource::Dependencies;
use crate::runner::{LoopBody, LoopHandle, LoopRunner, RunReport};

/// Attribute that overrides the controller's auto-start default for one
/// reconfigure.
pub const AUTO_START_ATTRIBUTE: &str = "auto_start";

/// A concrete loop service: a loop body plus the rules for building it from
/// configuration.
///
/// The controller clones the configured service at every start, so each run
/// begins from fresh per-run state and sees exactly the config it was
/// started with.
pub trait LoopService: LoopBody + Clone {
    /// Model triplet identifying this service.
    const MODEL: &'static str;

    /// Whether `reconfigure` starts the loop unless the config says otherwise.
    const AUTO_START: bool = true;

    /// Check required attributes before dependencies are looked at.
    fn validate_config(_config: &ResourceConfig) -> Result<()> {
        Ok(())
    }

    /// Build a configured service. Must not have side effects: a failure here
    /// leaves the controller untouched.
    fn from_config(config: &ResourceConfig, dependencies: &Dependencies) -> Result<Self>;
}

struct ControllerState<S> {
    service: S,
    config: ResourceConfig,
    dependencies: Dependencies,
    signal: CancelSignal,
    handle: Option<LoopHandle>,
    last_report: Option<RunReport>,
}

/// Idempotent lifecycle control over one loop.
///
/// Every public operation takes the same per-instance lock, so start, stop,
/// and reconfigure never interleave. `stop` and `reconfigure` block until the
/// previous execution context has exited.
pub struct StartStopLoop<S: LoopService> {
    name: String,
    auto_start: bool,
    runner: LoopRunner,
    state: Mutex<ControllerState<S>>,
}

impl<S: LoopService> StartStopLoop<S> {
    /// Construct with the service's default auto-start behaviour.
    pub fn new(config: ResourceConfig, dependencies: Dependencies) -> Result<Self> {
        Self::with_options(config, dependencies, S::AUTO_START, LoopRunner::new())
    }

    /// Construct with an explicit auto-start default and runner.
    ///
    /// Applies the initial configuration exactly as `reconfigure` would, so
    /// an invalid config yields an error and no loop is ever launched.
    pub fn with_options(
        config: ResourceConfig,
        dependencies: Dependencies,
        auto_start: bool,
        runner: LoopRunner,
    ) -> Result<Self> {
        let (service, start_now) = prepare::<S>(&config, &dependencies, auto_start)?;

        let controller = Self {
            name: config.name.clone(),
            auto_start,
            runner,
            state: Mutex::new(ControllerState {
                service,
                config,
                dependencies,
                signal: CancelSignal::new(),
                handle: None,
                last_report: None,
            }),
        };

        log::info!("Created {} '{}'", S::MODEL, controller.name);

        if start_now {
            let mut state = controller.state.lock();
            controller.start_locked(&mut state)?;
        }

        Ok(controller)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model(&self) -> &'static str {
        S::MODEL
    }

    /// Default auto-start behaviour fixed at construction.
    pub fn auto_start(&self) -> bool {
        self.auto_start
    }

    /// Start the loop unless one is already alive.
    pub fn start(&self) -> Result<()> {
        let mut state = self.state.lock();
        self.start_locked(&mut state)
    }

    /// Stop the loop and wait for it to exit. No-op when nothing runs.
    pub fn stop(&self) {
        let mut state = self.state.lock();
        Self::stop_locked(&self.name, &mut state);
    }

    /// Validate and apply a new configuration.
    ///
    /// Validation runs first; on failure the previous config, dependencies,
    /// and running state are left exactly as they were. On success the
    /// running loop is stopped before anything is replaced, and restarted if
    /// auto-start applies.
    pub fn reconfigure(&self, config: ResourceConfig, dependencies: Dependencies) -> Result<()> {
        log::info!("Reconfiguring '{}'", self.name);

        let (service, start_now) = prepare::<S>(&config, &dependencies, self.auto_start).inspect_err(|e| {
            log::warn!("Rejected reconfigure of '{}': {}", self.name, e);
        })?;

        let mut state = self.state.lock();
        Self::stop_locked(&self.name, &mut state);

        state.service = service;
        state.config = config;
        state.dependencies = dependencies;

        if start_now {
            self.start_locked(&mut state)?;
        }
        Ok(())
    }

    /// Running when the execution context is alive.
    pub fn status(&self) -> LoopStatus {
        let state = self.state.lock();
        match &state.handle {
            Some(handle) if handle.is_alive() => LoopStatus::Running,
            _ => LoopStatus::Stopped,
        }
    }

    pub fn is_running(&self) -> bool {
        self.status().is_running()
    }

    /// Outcome of the most recently finished run, if any run has finished and
    /// been collected.
    pub fn last_outcome(&self) -> Option<LoopOutcome> {
        self.state.lock().last_report.as_ref().map(|r| r.outcome.clone())
    }

    /// Report of the most recently finished run.
    pub fn last_report(&self) -> Option<RunReport> {
        self.state.lock().last_report.clone()
    }

    /// Completed iterations of the current run, zero when stopped. A run
    /// that ended on its own reports through `last_report` once collected.
    pub fn iterations(&self) -> u64 {
        match &self.state.lock().handle {
            Some(handle) if handle.is_alive() => handle.iterations(),
            _ => 0,
        }
    }

    /// Snapshot of the applied config.
    pub fn config(&self) -> ResourceConfig {
        self.state.lock().config.clone()
    }

    /// Snapshot of the applied service settings.
    pub fn service(&self) -> S {
        self.state.lock().service.clone()
    }

    pub fn dependency_names(&self) -> Vec<String> {
        self.state.lock().dependencies.names().map(str::to_string).collect()
    }

    fn start_locked(&self, state: &mut ControllerState<S>) -> Result<()> {
        if let Some(handle) = &state.handle {
            if handle.is_alive() {
                log::debug!("Loop '{}' already running, start ignored", self.name);
                return Ok(());
            }
        }

        // A dead context must not block a restart; collect it first.
        if let Some(handle) = state.handle.take() {
            let report = handle.join();
            if let LoopOutcome::Failed(reason) = &report.outcome {
                log::info!("Restarting '{}' after failed run: {}", self.name, reason);
            }
            state.last_report = Some(report);
        }

        state.signal.clear();
        let handle = self
            .runner
            .run(&self.name, state.service.clone(), state.signal.clone())?;
        state.handle = Some(handle);

        log::info!("Started loop '{}'", self.name);
        Ok(())
    }

    fn stop_locked(name: &str, state: &mut ControllerState<S>) {
        let Some(handle) = state.handle.take() else {
            return;
        };

        let report = handle.stop();
        match &report.outcome {
            LoopOutcome::Failed(reason) => {
                log::warn!(
                    "Stopped loop '{}' after {} iterations; it had failed: {}",
                    name,
                    report.iterations,
                    reason
                );
            }
            outcome => {
                log::info!(
                    "Stopped loop '{}' after {} iterations ({:?})",
                    name,
                    report.iterations,
                    outcome
                );
            }
        }
        state.last_report = Some(report);
    }
}

impl<S: LoopService> Drop for StartStopLoop<S> {
    fn drop(&mut self) {
        Self::stop_locked(&self.name, self.state.get_mut());
    }
}

/// Validate a config against service `S` and decide whether to start.
fn prepare<S: LoopService>(
    config: &ResourceConfig,
    dependencies: &Dependencies,
    default_auto_start: bool,
) -> Result<(S, bool)> {
    S::validate_config(config)?;
    let auto_start = config.optional_bool(AUTO_START_ATTRIBUTE, default_auto_start)?;
    let service = S::from_config(config, dependencies)?;
    Ok((service, auto_start))
}
