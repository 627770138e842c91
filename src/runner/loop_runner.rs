//! Loop runner implementation - repeats a loop body on a dedicated thread.
//!
//! Each run gets its own OS thread hosting a single-threaded tokio runtime,
//! so a loop body may suspend on timers without touching the caller's
//! runtime or any other controller's loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use async_trait::async_trait;

use crate::coordination::CancelSignal;
use crate::domain::LoopOutcome;
use crate::error::{Result, StartStopError};

/// One iteration of domain work.
///
/// The runner calls `iterate` until cancelled. An `Err` ends the run; the
/// error is logged and reported as `LoopOutcome::Failed`.
#[async_trait]
pub trait LoopBody: Send + 'static {
    async fn iterate(&mut self) -> Result<()>;
}

/// Configuration for the LoopRunner.
#[derive(Debug, Clone)]
pub struct LoopRunnerConfig {
    /// How long `stop` waits for a cooperative exit before aborting the
    /// in-flight iteration. `None` waits indefinitely.
    pub stop_timeout: Option<Duration>,
    /// Prefix for worker thread names
    pub thread_name_prefix: String,
}

impl Default for LoopRunnerConfig {
    fn default() -> Self {
        Self {
            stop_timeout: None,
            thread_name_prefix: "loop".to_string(),
        }
    }
}

impl LoopRunnerConfig {
    pub fn with_stop_timeout(mut self, timeout: Duration) -> Self {
        self.stop_timeout = Some(timeout);
        self
    }
}

/// Launches loop bodies on dedicated execution contexts.
#[derive(Debug, Clone, Default)]
pub struct LoopRunner {
    config: LoopRunnerConfig,
}

impl LoopRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LoopRunnerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LoopRunnerConfig {
        &self.config
    }

    /// Start repeating `body` until `signal` is cancelled.
    ///
    /// Returns as soon as the worker thread exists. The caller owns the
    /// returned handle and must stop it; dropping the handle detaches the
    /// thread.
    pub fn run<B: LoopBody>(&self, name: &str, body: B, signal: CancelSignal) -> Result<LoopHandle> {
        let (done_tx, done_rx) = mpsc::channel::<()>();
        let iterations = Arc::new(AtomicU64::new(0));

        let loop_name = name.to_string();
        let worker_signal = signal.clone();
        let worker_iterations = Arc::clone(&iterations);

        let thread = thread::Builder::new()
            .name(format!("{}-{}", self.config.thread_name_prefix, name))
            .spawn(move || {
                // Dropped on exit, including unwinding, which tells `stop` we are done.
                let _done = done_tx;
                let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
                    Ok(runtime) => runtime,
                    Err(e) => {
                        log::error!("Loop '{}' could not build its runtime: {}", loop_name, e);
                        return LoopOutcome::Failed(format!("runtime build failed: {}", e));
                    }
                };
                runtime.block_on(drive(&loop_name, body, worker_signal, worker_iterations))
            })
            .map_err(|e| StartStopError::Runtime(format!("failed to spawn loop thread for '{}': {}", name, e)))?;

        log::debug!("Loop '{}' launched", name);

        Ok(LoopHandle {
            name: name.to_string(),
            thread,
            signal,
            done: done_rx,
            iterations,
            stop_timeout: self.config.stop_timeout,
        })
    }
}

/// Iterate until cancelled, aborted, or the body fails.
async fn drive<B: LoopBody>(
    name: &str,
    mut body: B,
    signal: CancelSignal,
    iterations: Arc<AtomicU64>,
) -> LoopOutcome {
    loop {
        if signal.is_cancelled() {
            tracing::debug!(
                loop_name = %name,
                iterations = iterations.load(Ordering::SeqCst),
                "Loop observed stop"
            );
            return LoopOutcome::Stopped;
        }

        tokio::select! {
            biased;
            _ = signal.aborted() => {
                tracing::warn!(loop_name = %name, "In-flight iteration aborted");
                return LoopOutcome::Aborted;
            }
            result = body.iterate() => {
                if let Err(e) = result {
                    tracing::error!(loop_name = %name, error = %e, "Loop body failed, ending run");
                    return LoopOutcome::Failed(e.to_string());
                }
            }
        }

        iterations.fetch_add(1, Ordering::SeqCst);

        // Give the scheduler a turn before the next cancellation check.
        tokio::task::yield_now().await;
    }
}

/// How a finished run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub outcome: LoopOutcome,
    /// Iterations that completed before the run ended
    pub iterations: u64,
}

/// Ownership of a running execution context.
#[derive(Debug)]
pub struct LoopHandle {
    name: String,
    thread: JoinHandle<LoopOutcome>,
    signal: CancelSignal,
    done: mpsc::Receiver<()>,
    iterations: Arc<AtomicU64>,
    stop_timeout: Option<Duration>,
}

impl LoopHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identity of the worker thread running this context.
    pub fn thread_id(&self) -> thread::ThreadId {
        self.thread.thread().id()
    }

    /// True while the worker thread has not exited.
    pub fn is_alive(&self) -> bool {
        !self.thread.is_finished()
    }

    /// Completed iterations so far.
    pub fn iterations(&self) -> u64 {
        self.iterations.load(Ordering::SeqCst)
    }

    /// Cancel the loop and wait for the worker to exit.
    ///
    /// The in-flight iteration is allowed to finish. With a stop timeout
    /// configured, an iteration still running after the timeout is aborted at
    /// its next suspension point; a body blocked outside the runtime cannot
    /// be interrupted and is still waited for.
    pub fn stop(self) -> RunReport {
        self.signal.cancel();

        if let Some(timeout) = self.stop_timeout {
            if let Err(RecvTimeoutError::Timeout) = self.done.recv_timeout(timeout) {
                log::warn!(
                    "Loop '{}' still running {}ms after stop, aborting in-flight iteration",
                    self.name,
                    timeout.as_millis()
                );
                self.signal.abort();
            }
        }

        self.join()
    }

    /// Wait for the worker to exit without signalling it.
    pub fn join(self) -> RunReport {
        let outcome = match self.thread.join() {
            Ok(outcome) => outcome,
            Err(_) => {
                log::error!("Loop '{}' panicked", self.name);
                LoopOutcome::Failed("loop body panicked".to_string())
            }
        };
        RunReport {
            outcome,
            iterations: self.iterations.load(Ordering::SeqCst),
        }
    }
}
