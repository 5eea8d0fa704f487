//! Core types for field resolution

use cdp_adapter::ElementInfo;
use formfill_core_types::{FieldKind, Locator, LocatorStrategy};
use serde::{Deserialize, Serialize};

/// A field located on the current page, ready to be populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedField {
    /// Payload key or descriptor key the field was resolved for
    pub key: String,

    /// Element state at resolution time
    pub element: ElementInfo,

    /// Kind decided once, at descriptor load or from the located element
    pub kind: FieldKind,

    /// Locator matching every option of a radio group; the element's own
    /// locator for other kinds
    pub group: Locator,

    /// Strategy that produced the match
    pub strategy: LocatorStrategy,
}

/// Outcome of a lookup. Absence is an ordinary result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Resolution {
    Found(ResolvedField),
    NotFound,
}

impl Resolution {
    pub fn found(self) -> Option<ResolvedField> {
        match self {
            Resolution::Found(field) => Some(field),
            Resolution::NotFound => None,
        }
    }
}
