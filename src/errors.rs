//! Error handling module
//!
//! `FormFillError` is what a fill pass fails with. Per-field problems never
//! surface here; they are counted in the run statistics instead.

use action_locator::LocatorError;
use action_primitives::ActionError;
use cdp_adapter::AdapterError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormFillError {
    /// A block or key the current page cannot do without is absent
    #[error("missing payload data: {0}")]
    MissingPayload(String),

    /// The page's anchor field never appeared
    #[error("page not ready: {0}")]
    PageNotReady(String),

    /// A "next" control could not be pressed
    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("invalid payload: {0}")]
    Payload(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("browser error: {0}")]
    Adapter(#[from] AdapterError),

    #[error("action failed: {0}")]
    Action(#[from] ActionError),

    #[error("locator failed: {0}")]
    Locator(#[from] LocatorError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl FormFillError {
    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            FormFillError::Adapter(err) => err.is_retryable(),
            FormFillError::Action(err) => err.is_retryable(),
            FormFillError::Locator(err) => err.is_retryable(),
            FormFillError::PageNotReady(_) | FormFillError::Navigation(_) => true,
            _ => false,
        }
    }
}

impl From<serde_json::Error> for FormFillError {
    fn from(err: serde_json::Error) -> Self {
        FormFillError::Payload(err.to_string())
    }
}

/// Result type using FormFillError
pub type FormFillResult<T> = Result<T, FormFillError>;
