//! Loop runner module - repeats a loop body on a dedicated execution context.
//!
//! This module provides:
//! - LoopBody, the single-method capability a service implements
//! - LoopRunner for launching a body on its own worker thread
//! - LoopHandle for observing and stopping that worker

mod loop_runner;

pub use loop_runner::{LoopBody, LoopHandle, LoopRunner, LoopRunnerConfig, RunReport};
