//! Native-messaging bridge for the formfill browser extension.
//!
//! The extension launches the host process and talks to it over stdin/stdout.
//! Every message in either direction is a 4-byte length in native byte order
//! followed by that many bytes of UTF-8 JSON. The host answers each request with
//! exactly one [`BridgeMessage`] and keeps serving until the extension closes the
//! stream.

pub mod codec;
pub mod host;
pub mod message;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use codec::{read_frame, write_message, MAX_INCOMING_LEN, MAX_OUTGOING_LEN};
pub use host::{HandlerError, NativeHost, RequestHandler, ServeSummary};
pub use message::{decode_request, BridgeMessage, BridgeRequest, RequestError, Status};

/// Per-request identifier used to correlate log lines.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// Errors surfaced by the bridge transport.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BridgeError {
    #[error("i/o error: {0}")]
    Io(String),
    #[error("stream ended inside a frame")]
    Truncated,
    #[error("frame of {len} bytes exceeds the {limit} byte limit")]
    FrameTooLarge { len: usize, limit: usize },
    #[error("failed to encode message: {0}")]
    Encode(String),
}

impl From<std::io::Error> for BridgeError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::UnexpectedEof => BridgeError::Truncated,
            _ => BridgeError::Io(err.to_string()),
        }
    }
}
