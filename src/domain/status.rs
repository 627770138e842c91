//! Controller status as seen from outside.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Whether a controller currently has a live execution context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopStatus {
    Stopped,
    Running,
}

impl LoopStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, LoopStatus::Running)
    }
}

impl fmt::Display for LoopStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopStatus::Stopped => write!(f, "stopped"),
            LoopStatus::Running => write!(f, "running"),
        }
    }
}
