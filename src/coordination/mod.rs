//! Loop coordination module
//!
//! Implements the per-controller cancellation signal used to stop or abort
//! a running loop.

pub mod signals;

pub use signals::*;
