//! Submission payload as produced by the extension or a JSON file.

use std::collections::BTreeMap;
use std::path::Path;

use formfill_core_types::FieldValue;
use serde::{Deserialize, Serialize};

use crate::errors::{FormFillError, FormFillResult};

/// Field key → value for one form section.
pub type Section = BTreeMap<String, FieldValue>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personal_details: Option<Section>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installation_address: Option<Section>,
}

impl SubmissionPayload {
    pub fn from_json(raw: &str) -> FormFillResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_value(value: serde_json::Value) -> FormFillResult<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn from_path(path: &Path) -> FormFillResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn personal_details(&self) -> FormFillResult<&Section> {
        self.personal_details
            .as_ref()
            .ok_or_else(|| FormFillError::MissingPayload("personalDetails".to_string()))
    }

    pub fn installation_address(&self) -> FormFillResult<&Section> {
        self.installation_address
            .as_ref()
            .ok_or_else(|| FormFillError::MissingPayload("installationAddress".to_string()))
    }
}

/// Value of `key`, with `null` treated as absent.
pub fn present<'a>(section: &'a Section, key: &str) -> Option<&'a FieldValue> {
    section.get(key).filter(|value| !matches!(value, FieldValue::Empty))
}

/// Value of `key`, or `MissingPayload` naming `section_name.key`.
pub fn require<'a>(
    section: &'a Section,
    section_name: &str,
    key: &str,
) -> FormFillResult<&'a FieldValue> {
    present(section, key)
        .ok_or_else(|| FormFillError::MissingPayload(format!("{section_name}.{key}")))
}

/// A validated address group.
#[derive(Debug, Clone, PartialEq)]
pub struct AddressBlock {
    pub postal_code: FieldValue,
    pub house_number: FieldValue,
    /// Only set when present and non-blank.
    pub house_number_suffix: Option<FieldValue>,
    pub street: FieldValue,
    pub city: FieldValue,
}

impl AddressBlock {
    /// Read the `address` group of `section`.
    ///
    /// `Ok(None)` when the section has no address at all; a group that exists
    /// but lacks a required key is an error, so no address control is touched
    /// for an incomplete block.
    pub fn from_section(section: &Section, section_name: &str) -> FormFillResult<Option<Self>> {
        let Some(value) = present(section, "address") else {
            return Ok(None);
        };
        let path = format!("{section_name}.address");
        let group = value
            .as_group()
            .ok_or_else(|| FormFillError::Payload(format!("{path} must be an object")))?;
        if group.is_empty() {
            return Ok(None);
        }

        let required = |key: &str| -> FormFillResult<FieldValue> {
            present(group, key)
                .filter(|value| !value.is_blank())
                .cloned()
                .ok_or_else(|| FormFillError::MissingPayload(format!("{path}.{key}")))
        };

        Ok(Some(Self {
            postal_code: required("postalCode")?,
            house_number: required("houseNumber")?,
            house_number_suffix: present(group, "houseNumberSuffix")
                .filter(|value| !value.is_blank())
                .cloned(),
            street: required("street")?,
            city: required("city")?,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "personalDetails": {
            "bsn": "123456782",
            "initials": "J.",
            "prefix": null,
            "address": {"postalCode": "1234AB", "houseNumber": 10, "houseNumberSuffix": "",
                        "street": "Dorpsstraat", "city": "Utrecht"}
        }
    }"#;

    #[test]
    fn parses_sections() {
        let payload = SubmissionPayload::from_json(SAMPLE).unwrap();
        let personal = payload.personal_details().unwrap();
        assert_eq!(present(personal, "bsn"), Some(&FieldValue::text("123456782")));
        assert_eq!(present(personal, "prefix"), None);
        assert!(matches!(
            payload.installation_address(),
            Err(FormFillError::MissingPayload(_))
        ));
    }

    #[test]
    fn blank_suffix_is_dropped() {
        let payload = SubmissionPayload::from_json(SAMPLE).unwrap();
        let address = AddressBlock::from_section(payload.personal_details().unwrap(), "personalDetails")
            .unwrap()
            .unwrap();
        assert_eq!(address.house_number.as_text().unwrap(), "10");
        assert_eq!(address.house_number_suffix, None);
    }

    #[test]
    fn incomplete_address_names_the_missing_key() {
        let section: Section =
            serde_json::from_str(r#"{"address":{"postalCode":"1234AB","street":"X","city":"Y"}}"#)
                .unwrap();
        let err = AddressBlock::from_section(&section, "installationAddress").unwrap_err();
        assert_eq!(
            err.to_string(),
            "missing payload data: installationAddress.address.houseNumber"
        );
    }

    #[test]
    fn empty_address_is_absent() {
        let section: Section = serde_json::from_str(r#"{"address":{}}"#).unwrap();
        assert_eq!(AddressBlock::from_section(&section, "x").unwrap(), None);
        let section: Section = serde_json::from_str(r#"{"address":null}"#).unwrap();
        assert_eq!(AddressBlock::from_section(&section, "x").unwrap(), None);
    }

    #[test]
    fn require_reports_path() {
        let section: Section = serde_json::from_str(r#"{"bsn":null}"#).unwrap();
        let err = require(&section, "personalDetails", "bsn").unwrap_err();
        assert!(matches!(err, FormFillError::MissingPayload(p) if p == "personalDetails.bsn"));
    }
}
