//! Static field descriptors for the RVO eLoket subsidy form.
//!
//! The form is an ASP.NET WebForms page, so element ids and names carry
//! generated prefixes; every selector matches on the stable suffix.

use formfill_core_types::{FieldDescriptor, FieldKind, Locator, ValueEncoding};

fn suffix_id(suffix: &str) -> Locator {
    Locator::css(format!("input[id$='{suffix}']"))
}

fn suffix_name(suffix: &str) -> Locator {
    Locator::css(format!("input[name$='{suffix}']"))
}

/// The five controls of an address block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressFields {
    pub postal_code: FieldDescriptor,
    pub house_number: FieldDescriptor,
    pub house_number_suffix: FieldDescriptor,
    pub street: FieldDescriptor,
    pub city: FieldDescriptor,
}

impl AddressFields {
    fn with_suffixes(postal: &str, number: &str, suffix: &str, street: &str, city: &str) -> Self {
        Self {
            postal_code: FieldDescriptor::text("postalCode", suffix_id(postal)),
            house_number: FieldDescriptor::text("houseNumber", suffix_id(number)),
            house_number_suffix: FieldDescriptor::text("houseNumberSuffix", suffix_id(suffix)),
            street: FieldDescriptor::text("street", suffix_id(street)),
            city: FieldDescriptor::text("city", suffix_id(city)),
        }
    }
}

/// Page 1: applicant details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonalDetailsLayout {
    /// Anchor field; typing into it starts the population-register lookup.
    pub bsn: FieldDescriptor,
    /// Filled from the register after a BSN is entered.
    pub last_name_autofill: Locator,
    /// Filled in payload order when present.
    pub stable_fields: Vec<FieldDescriptor>,
    pub address: AddressFields,
    pub correspondence_same: FieldDescriptor,
    pub next: Locator,
}

/// Page 2: installation address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallationAddressLayout {
    /// Anchor radio group; "is the installation address correct?"
    pub address_correct: FieldDescriptor,
    pub address: AddressFields,
    pub next: Locator,
}

/// Complete descriptor set for both pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormLayout {
    pub personal: PersonalDetailsLayout,
    pub installation: InstallationAddressLayout,
}

impl FormLayout {
    pub fn rvo() -> Self {
        let last_name = FieldDescriptor::text("lastName", suffix_id("edAchternaam2"));
        let personal = PersonalDetailsLayout {
            bsn: FieldDescriptor::text("bsn", suffix_id("edBSNnummer")),
            last_name_autofill: last_name.locator.clone(),
            stable_fields: vec![
                FieldDescriptor::text("initials", suffix_id("edVoorletters2")),
                FieldDescriptor::text("prefix", suffix_id("edTussenvoegsel2")),
                last_name,
                FieldDescriptor::radio(
                    "gender",
                    suffix_name("AanvragerPersoonGeslacht"),
                    ValueEncoding::Gender,
                ),
                FieldDescriptor::text("phone", suffix_id("edTelefoonField3")),
                FieldDescriptor::text("mobile", suffix_id("edMobielField2")),
                FieldDescriptor::text("email", suffix_id("edEmailField3")),
                FieldDescriptor::text("iban", suffix_id("edIBAN")),
            ],
            address: AddressFields::with_suffixes(
                "edPostcode",
                "edHuisnummer2",
                "edToevoeging2",
                "edStraat",
                "edPlaats",
            ),
            correspondence_same: FieldDescriptor::radio(
                "correspondenceAddressSame",
                suffix_name("bezoekAdresGelijk"),
                ValueEncoding::YesNo,
            ),
            next: Locator::id("btnVolgendeTab"),
        };

        let installation = InstallationAddressLayout {
            address_correct: FieldDescriptor::radio(
                "isAddressCorrect",
                suffix_name("Adresafwijkend_JN"),
                ValueEncoding::InvertedBool,
            ),
            address: AddressFields::with_suffixes(
                "eddPostcode2",
                "eddHuisnummer2",
                "eddToevoeging2",
                "eddStraat2",
                "eddPlaats2",
            ),
            next: Locator::css("input[id$='next'][value='Volgende']"),
        };

        Self {
            personal,
            installation,
        }
    }
}

impl Default for FormLayout {
    fn default() -> Self {
        Self::rvo()
    }
}

/// State a field must reach before it is filled. Radio groups only need to
/// be visible; every other control must also be enabled.
pub(crate) fn interaction_state(descriptor: &FieldDescriptor) -> action_primitives::ElementState {
    match descriptor.kind {
        FieldKind::Radio(_) => action_primitives::ElementState::Visible,
        _ => action_primitives::ElementState::Clickable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_fields_keep_form_order() {
        let layout = FormLayout::rvo();
        let keys: Vec<_> = layout
            .personal
            .stable_fields
            .iter()
            .map(|d| d.key.as_str())
            .collect();
        assert_eq!(
            keys,
            [
                "initials", "prefix", "lastName", "gender", "phone", "mobile", "email", "iban"
            ]
        );
    }

    #[test]
    fn radios_carry_their_encoding() {
        let layout = FormLayout::rvo();
        assert_eq!(
            layout.installation.address_correct.kind,
            FieldKind::Radio(ValueEncoding::InvertedBool)
        );
        assert_eq!(
            layout.personal.correspondence_same.kind,
            FieldKind::Radio(ValueEncoding::YesNo)
        );
        assert_eq!(
            layout.personal.stable_fields[3].locator,
            Locator::css("input[name$='AanvragerPersoonGeslacht']")
        );
    }

    #[test]
    fn autofill_target_is_the_last_name_control() {
        let layout = FormLayout::rvo();
        assert_eq!(
            layout.personal.last_name_autofill,
            Locator::css("input[id$='edAchternaam2']")
        );
    }
}
