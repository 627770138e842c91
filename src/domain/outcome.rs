//! Loop execution outcome types.
//!
//! This module defines how a single run of a loop ended.

use serde::{Deserialize, Serialize};

/// Outcome of one execution context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "outcome", content = "reason")]
pub enum LoopOutcome {
    /// Cancellation observed at an iteration boundary
    Stopped,
    /// In-flight iteration dropped by a hard abort
    Aborted,
    /// Loop body returned an error or panicked; the context ended
    Failed(String),
}

impl LoopOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, LoopOutcome::Failed(_))
    }
}
