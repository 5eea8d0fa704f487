//! Request and response shapes.

use std::collections::BTreeMap;

use formfill_core_types::{FieldValue, RunStats};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Reply sent for every request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeMessage {
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<RunStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl BridgeMessage {
    pub fn success(stats: RunStats) -> Self {
        Self {
            status: Status::Success,
            stats: Some(stats),
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            stats: None,
            message: Some(message.into()),
        }
    }
}

/// What the extension asks for.
#[derive(Clone, Debug, PartialEq)]
pub enum BridgeRequest {
    /// Navigate to `url` and fill each key of `data` wherever it resolves.
    Fill {
        url: String,
        data: BTreeMap<String, FieldValue>,
    },
    /// Run the multi-page workflow on the page already open in the browser.
    Workflow { payload: Value, page: Option<u8> },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("Error decoding JSON: {0}")]
    Decode(String),
    #[error("Invalid message format: {0}")]
    InvalidFormat(String),
}

/// Decode a frame body into a request.
pub fn decode_request(body: &[u8]) -> Result<BridgeRequest, RequestError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|err| RequestError::Decode(err.to_string()))?;
    let Value::Object(mut object) = value else {
        return Err(RequestError::InvalidFormat(
            "expected a JSON object".to_string(),
        ));
    };

    if let Some(payload) = object.remove("payload") {
        if !payload.is_object() {
            return Err(RequestError::InvalidFormat(
                "'payload' must be an object".to_string(),
            ));
        }
        let page = match object.remove("page") {
            None | Some(Value::Null) => None,
            Some(Value::Number(n)) if matches!(n.as_u64(), Some(1 | 2)) => {
                n.as_u64().map(|p| p as u8)
            }
            Some(other) => {
                return Err(RequestError::InvalidFormat(format!(
                    "'page' must be 1 or 2, got {other}"
                )))
            }
        };
        return Ok(BridgeRequest::Workflow { payload, page });
    }

    let url = match object.remove("url") {
        Some(Value::String(url)) if !url.trim().is_empty() => url,
        Some(_) => {
            return Err(RequestError::InvalidFormat(
                "'url' must be a non-empty string".to_string(),
            ))
        }
        None => return Err(RequestError::InvalidFormat("missing 'url'".to_string())),
    };
    let data = match object.remove("data") {
        Some(Value::Object(map)) if map.is_empty() => {
            return Err(RequestError::InvalidFormat(
                "'data' must not be empty".to_string(),
            ))
        }
        Some(data @ Value::Object(_)) => serde_json::from_value(data)
            .map_err(|err| RequestError::InvalidFormat(format!("'data': {err}")))?,
        Some(_) => {
            return Err(RequestError::InvalidFormat(
                "'data' must be an object".to_string(),
            ))
        }
        None => return Err(RequestError::InvalidFormat("missing 'data'".to_string())),
    };
    Ok(BridgeRequest::Fill { url, data })
}
