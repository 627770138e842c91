//! Domain types for startstop
//!
//! - LoopStatus: whether a controller has a live loop
//! - LoopOutcome: how one execution context ended

pub mod outcome;
pub mod status;

pub use outcome::LoopOutcome;
pub use status::LoopStatus;
