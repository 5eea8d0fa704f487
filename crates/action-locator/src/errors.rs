//! Error types for field resolution

use cdp_adapter::{AdapterError, AdapterErrorKind};
use thiserror::Error;

/// Locator error enumeration
#[derive(Debug, Error, Clone)]
pub enum LocatorError {
    /// The matched element is not a kind of field that can be populated
    #[error("Field '{key}' resolved to unsupported element <{element}>")]
    UnsupportedElement { key: String, element: String },

    /// No strategies configured
    #[error("Lookup order is empty")]
    EmptyLookupOrder,

    /// Strategy execution failed
    #[error("Strategy '{strategy}' failed: {reason}")]
    StrategyFailed { strategy: String, reason: String },

    /// CDP communication error
    #[error("CDP error: {0}")]
    CdpError(String),

    /// Timeout during resolution
    #[error("Resolution timeout: {0}")]
    Timeout(String),
}

impl LocatorError {
    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, LocatorError::Timeout(_) | LocatorError::CdpError(_))
    }

    /// Get error severity (0=low, 1=medium, 2=high, 3=critical)
    pub fn severity(&self) -> u8 {
        match self {
            LocatorError::EmptyLookupOrder => 3,
            LocatorError::CdpError(_) | LocatorError::Timeout(_) => 2,
            LocatorError::UnsupportedElement { .. } | LocatorError::StrategyFailed { .. } => 1,
        }
    }
}

impl From<AdapterError> for LocatorError {
    fn from(err: AdapterError) -> Self {
        match err.kind {
            AdapterErrorKind::Timeout => LocatorError::Timeout(err.to_string()),
            AdapterErrorKind::Internal => LocatorError::StrategyFailed {
                strategy: "adapter".to_string(),
                reason: err.to_string(),
            },
            _ => LocatorError::CdpError(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapter_timeouts_stay_retryable() {
        let err: LocatorError = AdapterError::new(AdapterErrorKind::Timeout).into();
        assert!(err.is_retryable());
        assert_eq!(err.severity(), 2);
    }

    #[test]
    fn unsupported_element_names_the_tag() {
        let err = LocatorError::UnsupportedElement {
            key: "upload".into(),
            element: "input type=file".into(),
        };
        assert_eq!(
            err.to_string(),
            "Field 'upload' resolved to unsupported element <input type=file>"
        );
        assert!(!err.is_retryable());
    }
}
