use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single payload value as it arrives from JSON.
///
/// `null` deserializes to [`FieldValue::Empty`] and is treated like an absent key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Empty,
    Flag(bool),
    Number(serde_json::Number),
    Text(String),
    Group(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    /// String form used when typing into a text control.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            FieldValue::Text(text) => Some(Cow::Borrowed(text.as_str())),
            FieldValue::Number(number) => Some(Cow::Owned(number.to_string())),
            FieldValue::Flag(flag) => Some(Cow::Borrowed(if *flag { "true" } else { "false" })),
            FieldValue::Empty | FieldValue::Group(_) => None,
        }
    }

    /// Boolean reading of the value. Accepts JSON booleans and the common
    /// textual spellings (`true`/`false`, `ja`/`nee`, `yes`/`no`).
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            FieldValue::Flag(flag) => Some(*flag),
            FieldValue::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
                "true" | "ja" | "yes" => Some(true),
                "false" | "nee" | "no" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&BTreeMap<String, FieldValue>> {
        match self {
            FieldValue::Group(group) => Some(group),
            _ => None,
        }
    }

    /// True for `null`, empty strings and empty groups.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Empty => true,
            FieldValue::Text(text) => text.trim().is_empty(),
            FieldValue::Group(group) => group.is_empty(),
            FieldValue::Flag(_) | FieldValue::Number(_) => false,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldValue::Empty => "null",
            FieldValue::Flag(_) => "boolean",
            FieldValue::Number(_) => "number",
            FieldValue::Text(_) => "string",
            FieldValue::Group(_) => "object",
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Flag(value)
    }
}
