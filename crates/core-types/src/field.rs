use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{FieldValue, Locator};

/// Raised when a payload value has no option in a radio group's encoding.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EncodingError {
    #[error("value of type {found} cannot be encoded with {encoding}")]
    Unsupported {
        encoding: &'static str,
        found: &'static str,
    },
    #[error("'{value}' is not a valid {encoding} value")]
    UnknownValue {
        encoding: &'static str,
        value: String,
    },
    #[error("option '{option}' is not produced by {encoding}")]
    UnknownOption {
        encoding: &'static str,
        option: String,
    },
}

/// Mapping between payload values and the `value` attributes of a radio group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueEncoding {
    /// The option value is the text form of the payload value.
    Identity,
    /// Boolean answer to "is this correct?" posted as "is this different?".
    InvertedBool,
    /// `man` → `M`, `vrouw` → `V`.
    Gender,
    /// Yes/no (or a boolean) → `J` / `N`.
    YesNo,
}

impl ValueEncoding {
    pub fn name(&self) -> &'static str {
        match self {
            ValueEncoding::Identity => "identity",
            ValueEncoding::InvertedBool => "inverted_bool",
            ValueEncoding::Gender => "gender",
            ValueEncoding::YesNo => "yes_no",
        }
    }

    /// Option value to select for `value`.
    pub fn encode(&self, value: &FieldValue) -> Result<String, EncodingError> {
        match self {
            ValueEncoding::Identity => value
                .as_text()
                .map(|text| text.into_owned())
                .ok_or_else(|| self.unsupported(value)),
            ValueEncoding::InvertedBool => {
                let flag = self.flag(value)?;
                Ok((!flag).to_string())
            }
            ValueEncoding::Gender => {
                let text = value.as_text().ok_or_else(|| self.unsupported(value))?;
                match text.trim().to_ascii_lowercase().as_str() {
                    "man" | "m" => Ok("M".to_string()),
                    "vrouw" | "v" => Ok("V".to_string()),
                    _ => Err(EncodingError::UnknownValue {
                        encoding: self.name(),
                        value: text.into_owned(),
                    }),
                }
            }
            ValueEncoding::YesNo => {
                if let FieldValue::Text(text) = value {
                    match text.trim() {
                        "J" => return Ok("J".to_string()),
                        "N" => return Ok("N".to_string()),
                        _ => {}
                    }
                }
                let flag = self.flag(value)?;
                Ok(if flag { "J" } else { "N" }.to_string())
            }
        }
    }

    /// Canonical payload value for an option produced by [`encode`](Self::encode).
    pub fn decode(&self, option: &str) -> Result<FieldValue, EncodingError> {
        let decoded = match (self, option) {
            (ValueEncoding::Identity, other) => Some(FieldValue::text(other)),
            (ValueEncoding::InvertedBool, "false") => Some(FieldValue::Flag(true)),
            (ValueEncoding::InvertedBool, "true") => Some(FieldValue::Flag(false)),
            (ValueEncoding::Gender, "M") => Some(FieldValue::text("man")),
            (ValueEncoding::Gender, "V") => Some(FieldValue::text("vrouw")),
            (ValueEncoding::YesNo, "J") => Some(FieldValue::Flag(true)),
            (ValueEncoding::YesNo, "N") => Some(FieldValue::Flag(false)),
            _ => None,
        };
        decoded.ok_or_else(|| EncodingError::UnknownOption {
            encoding: self.name(),
            option: option.to_string(),
        })
    }

    fn flag(&self, value: &FieldValue) -> Result<bool, EncodingError> {
        match value {
            FieldValue::Flag(_) | FieldValue::Text(_) => {
                value.as_flag().ok_or_else(|| EncodingError::UnknownValue {
                    encoding: self.name(),
                    value: value.as_text().unwrap_or_default().into_owned(),
                })
            }
            other => Err(self.unsupported(other)),
        }
    }

    fn unsupported(&self, value: &FieldValue) -> EncodingError {
        EncodingError::Unsupported {
            encoding: self.name(),
            found: value.kind_name(),
        }
    }
}

/// The interaction a control needs. Fixed when the descriptor is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "encoding")]
pub enum FieldKind {
    Text,
    TextArea,
    Checkbox,
    Radio(ValueEncoding),
    Select,
}

impl FieldKind {
    /// Kind for a live element, from its tag name and `type` attribute.
    /// Radio groups found this way use [`ValueEncoding::Identity`].
    pub fn detect(tag: &str, input_type: Option<&str>) -> Option<FieldKind> {
        match tag.to_ascii_lowercase().as_str() {
            "textarea" => Some(FieldKind::TextArea),
            "select" => Some(FieldKind::Select),
            "input" => {
                let input_type = input_type.unwrap_or("text").to_ascii_lowercase();
                match input_type.as_str() {
                    "text" | "email" | "password" | "tel" | "number" | "search" | "url"
                    | "date" => Some(FieldKind::Text),
                    "checkbox" => Some(FieldKind::Checkbox),
                    "radio" => Some(FieldKind::Radio(ValueEncoding::Identity)),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::TextArea => "textarea",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Radio(_) => "radio",
            FieldKind::Select => "select",
        }
    }
}

/// Static description of one logical form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub key: String,
    pub locator: Locator,
    pub kind: FieldKind,
}

impl FieldDescriptor {
    pub fn new(key: impl Into<String>, locator: Locator, kind: FieldKind) -> Self {
        Self {
            key: key.into(),
            locator,
            kind,
        }
    }

    pub fn text(key: impl Into<String>, locator: Locator) -> Self {
        Self::new(key, locator, FieldKind::Text)
    }

    pub fn radio(key: impl Into<String>, locator: Locator, encoding: ValueEncoding) -> Self {
        Self::new(key, locator, FieldKind::Radio(encoding))
    }
}
