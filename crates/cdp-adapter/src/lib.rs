//! Chromium DevTools Protocol port for formfill.
//!
//! The crate exposes the [`Cdp`] trait, the narrow element-level surface the
//! locator and action layers drive, and two implementations of it:
//!
//! - [`CdpAdapter`] attaches to an already-running Chromium through its remote
//!   debugging endpoint and performs every operation with `Runtime.evaluate`
//!   scripts (plus `Input.insertText` for typing).
//! - `memory::MemoryPage` (feature `test-util`) keeps a small document in
//!   memory. It understands the selector subset the field map uses and can
//!   simulate server-side auto-fill, which is what the workflow tests run
//!   against.

mod adapter;
#[cfg(any(test, feature = "test-util"))]
pub mod memory;
mod scripts;
mod util;

use async_trait::async_trait;
use formfill_core_types::Locator;
use serde::{Deserialize, Serialize};

pub use adapter::CdpAdapter;
pub use config::CdpConfig;
pub use error::{AdapterError, AdapterErrorKind};
pub use util::endpoint_url;

pub mod error {
    use serde::{Deserialize, Serialize};
    use std::fmt;
    use thiserror::Error;

    /// High-level error categories surfaced by the adapter.
    #[derive(Clone, Debug, Error, PartialEq, Eq, Serialize, Deserialize)]
    pub enum AdapterErrorKind {
        #[error("browser connection failed")]
        Connect,
        #[error("command timed out")]
        Timeout,
        #[error("cdp i/o failure")]
        CdpIo,
        #[error("target element not found")]
        TargetNotFound,
        #[error("option not found")]
        OptionNotFound,
        #[error("internal error")]
        Internal,
    }

    /// Enriched error metadata passed back to higher layers.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct AdapterError {
        pub kind: AdapterErrorKind,
        pub hint: Option<String>,
        pub data: Option<serde_json::Value>,
    }

    impl fmt::Display for AdapterError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.kind)?;
            if let Some(hint) = &self.hint {
                write!(f, ": {}", hint)?;
            }
            Ok(())
        }
    }

    impl std::error::Error for AdapterError {}

    impl AdapterError {
        pub fn new(kind: AdapterErrorKind) -> Self {
            Self {
                kind,
                hint: None,
                data: None,
            }
        }

        pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
            self.hint = Some(hint.into());
            self
        }

        pub fn with_data(mut self, data: serde_json::Value) -> Self {
            self.data = Some(data);
            self
        }

        pub fn is_retryable(&self) -> bool {
            matches!(self.kind, AdapterErrorKind::Timeout | AdapterErrorKind::CdpIo)
        }
    }
}

pub mod config {
    use serde::{Deserialize, Serialize};

    /// Where and how to reach the browser.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(default)]
    pub struct CdpConfig {
        /// `host:port` of the remote debugging endpoint.
        pub debugger_addr: String,
        /// Full `ws://` URL; takes precedence over `debugger_addr` when set.
        pub websocket_url: Option<String>,
        /// Upper bound for a single protocol command.
        pub default_deadline_ms: u64,
    }

    impl Default for CdpConfig {
        fn default() -> Self {
            Self {
                debugger_addr: "127.0.0.1:9222".to_string(),
                websocket_url: None,
                default_deadline_ms: 30_000,
            }
        }
    }
}

/// Reference to a located element that later commands can address.
///
/// For the real adapter this is a CSS selector on a per-lookup marker
/// attribute; for the in-memory page it is the node key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle(pub String);

impl ElementHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Snapshot of an element's state at lookup time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementInfo {
    pub handle: ElementHandle,
    pub tag: String,
    pub input_type: Option<String>,
    pub visible: bool,
    pub enabled: bool,
    pub value: String,
    pub checked: bool,
}

impl ElementInfo {
    pub fn is_clickable(&self) -> bool {
        self.visible && self.enabled
    }
}

/// Element-level capability surface required by the upper layers.
///
/// Operations on a handle whose element has left the document fail with
/// [`AdapterErrorKind::TargetNotFound`].
#[async_trait]
pub trait Cdp: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<(), AdapterError>;

    async fn title(&self) -> Result<Option<String>, AdapterError>;

    /// First element matching `locator`, visible or not.
    async fn locate(&self, locator: &Locator) -> Result<Option<ElementInfo>, AdapterError>;

    /// Every element matching `locator`, in document order.
    async fn locate_all(&self, locator: &Locator) -> Result<Vec<ElementInfo>, AdapterError>;

    /// Fresh state of a previously located element; `None` once it is gone.
    async fn inspect(&self, handle: &ElementHandle) -> Result<Option<ElementInfo>, AdapterError>;

    async fn clear(&self, handle: &ElementHandle) -> Result<(), AdapterError>;

    async fn type_text(&self, handle: &ElementHandle, text: &str) -> Result<(), AdapterError>;

    async fn click(&self, handle: &ElementHandle) -> Result<(), AdapterError>;

    /// Choose the option whose visible text equals `text`.
    async fn select_by_text(&self, handle: &ElementHandle, text: &str)
        -> Result<(), AdapterError>;

    /// True once jQuery reports no outstanding AJAX requests. Pages without
    /// jQuery never report idle.
    async fn ajax_idle(&self) -> Result<bool, AdapterError>;
}
