//! Core data types for action primitives

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Element condition awaited by [`crate::wait_for_element`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementState {
    /// Attached to the document
    Present,

    /// Attached and rendered
    Visible,

    /// Rendered and enabled
    Clickable,
}

/// Result of waiting for a server-side fill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AutofillOutcome {
    /// The target received this value
    Observed(String),

    /// Nothing arrived before the timeout; callers warn and fill themselves
    TimedOut,
}

impl AutofillOutcome {
    pub fn observed(&self) -> Option<&str> {
        match self {
            AutofillOutcome::Observed(value) => Some(value),
            AutofillOutcome::TimedOut => None,
        }
    }
}

/// Timeouts and poll interval shared by the waits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitSettings {
    /// Upper bound for element waits
    pub element_timeout: Duration,

    /// Upper bound for auto-fill waits
    pub autofill_timeout: Duration,

    /// Interval between polls
    pub poll_interval: Duration,
}

impl Default for WaitSettings {
    fn default() -> Self {
        Self {
            element_timeout: Duration::from_secs(15),
            autofill_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(250),
        }
    }
}

/// Outcome of populating one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulateReport {
    /// Whether any interaction was needed
    pub changed: bool,

    /// Wall time spent, in milliseconds
    pub latency_ms: u64,
}
