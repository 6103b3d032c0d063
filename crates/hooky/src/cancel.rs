//! Chain cancellation.
//!
//! A hook returns [`CancellationSignal`] (via [`HookOutcome::Cancel`]) to stop
//! every remaining hook of the chain it is running in. The dispatcher absorbs
//! the signal; it never reaches the caller as an error and does not stop the
//! intercepted operation itself.
//!
//! [`HookOutcome::Cancel`]: crate::hooks::definitions::HookOutcome::Cancel

use std::fmt;

use serde::{Deserialize, Serialize};

/// Signal that stops the current hook chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancellationSignal {
    /// Optional human-readable reason, recorded in logs.
    pub reason: Option<String>,
}

impl CancellationSignal {
    /// Creates a signal without a reason.
    pub fn new() -> Self {
        Self { reason: None }
    }

    /// Creates a signal carrying a reason.
    pub fn with_reason(reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
        }
    }
}

impl fmt::Display for CancellationSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            Some(reason) => write!(f, "chain cancelled: {reason}"),
            None => write!(f, "chain cancelled"),
        }
    }
}
