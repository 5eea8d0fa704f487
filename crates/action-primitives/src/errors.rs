//! Error types for action primitives

use cdp_adapter::{AdapterError, AdapterErrorKind};
use formfill_core_types::EncodingError;
use thiserror::Error;

/// Error types for field operations
#[derive(Debug, Error, Clone)]
pub enum ActionError {
    /// Wait operation timed out
    #[error("Wait timeout: {0}")]
    WaitTimeout(String),

    /// Dropdown or radio option was not found
    #[error("Option not found: {0}")]
    OptionNotFound(String),

    /// Element left the document between resolution and interaction
    #[error("Stale element: {0}")]
    StaleElement(String),

    /// Payload value cannot be applied to the control
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Radio encoding rejected the value
    #[error("Encoding error: {0}")]
    Encoding(#[from] EncodingError),

    /// CDP communication or protocol error
    #[error("CDP I/O error: {0}")]
    CdpIo(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ActionError {
    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ActionError::WaitTimeout(_) | ActionError::StaleElement(_) | ActionError::CdpIo(_)
        )
    }

    /// Get error severity level (0=low, 1=medium, 2=high, 3=critical)
    pub fn severity(&self) -> u8 {
        match self {
            ActionError::Internal(_) => 3,
            ActionError::CdpIo(_) => 2,
            ActionError::WaitTimeout(_) | ActionError::StaleElement(_) => 1,
            _ => 0,
        }
    }
}

impl From<AdapterError> for ActionError {
    fn from(err: AdapterError) -> Self {
        match err.kind {
            AdapterErrorKind::TargetNotFound => ActionError::StaleElement(err.to_string()),
            AdapterErrorKind::OptionNotFound => ActionError::OptionNotFound(err.to_string()),
            AdapterErrorKind::Internal => ActionError::Internal(err.to_string()),
            _ => ActionError::CdpIo(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vanished_target_maps_to_stale_element() {
        let err: ActionError = AdapterError::new(AdapterErrorKind::TargetNotFound).into();
        assert!(matches!(err, ActionError::StaleElement(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn encoding_errors_are_not_retryable() {
        let err: ActionError = EncodingError::UnknownValue {
            encoding: "gender",
            value: "x".into(),
        }
        .into();
        assert!(!err.is_retryable());
        assert_eq!(err.severity(), 0);
    }
}
