//! Field population
//!
//! One primitive per control family:
//! 1. type_text - clear and type into text inputs and textareas
//! 2. click - toggle checkboxes, pick radio options, press buttons
//! 3. select - choose a dropdown option by its visible text
//!
//! Every primitive is idempotent: applying the same value twice leaves the
//! control as the first application did.

mod click;
mod select;
mod type_text;

pub use click::*;
pub use select::*;
pub use type_text::*;

use std::sync::Arc;
use std::time::Instant;

use action_locator::ResolvedField;
use async_trait::async_trait;
use cdp_adapter::Cdp;
use formfill_core_types::{FieldKind, FieldValue};
use tracing::debug;

use crate::{errors::ActionError, types::PopulateReport};

/// Populate a resolved field with a payload value.
#[async_trait]
pub trait Populate: Send + Sync {
    async fn populate(
        &self,
        field: &ResolvedField,
        value: &FieldValue,
    ) -> Result<PopulateReport, ActionError>;
}

/// Default populator dispatching on the field kind.
pub struct FieldPopulator {
    port: Arc<dyn Cdp>,
}

impl FieldPopulator {
    pub fn new(port: Arc<dyn Cdp>) -> Self {
        Self { port }
    }

    pub fn port(&self) -> &dyn Cdp {
        self.port.as_ref()
    }
}

#[async_trait]
impl Populate for FieldPopulator {
    async fn populate(
        &self,
        field: &ResolvedField,
        value: &FieldValue,
    ) -> Result<PopulateReport, ActionError> {
        let started = Instant::now();
        let port = self.port();

        let changed = match field.kind {
            FieldKind::Text | FieldKind::TextArea => execute_type_text(port, field, value).await?,
            FieldKind::Checkbox => execute_toggle(port, field, value).await?,
            FieldKind::Radio(encoding) => {
                execute_choose_option(port, field, &encoding, value).await?
            }
            FieldKind::Select => execute_select(port, field, value).await?,
        };

        let latency_ms = started.elapsed().as_millis() as u64;
        debug!(
            key = %field.key,
            kind = field.kind.name(),
            changed,
            latency_ms,
            "Populated field"
        );
        Ok(PopulateReport {
            changed,
            latency_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use action_locator::{ElementResolver, FieldResolver};
    use cdp_adapter::memory::{Interaction, MemoryNode, MemoryPage};
    use formfill_core_types::{FieldDescriptor, Locator, LookupOrder, ValueEncoding};

    struct Fixture {
        page: Arc<MemoryPage>,
        resolver: FieldResolver,
        populator: FieldPopulator,
    }

    fn fixture(nodes: Vec<MemoryNode>) -> Fixture {
        let page = Arc::new(MemoryPage::with_nodes(nodes));
        Fixture {
            resolver: FieldResolver::new(page.clone(), LookupOrder::default()),
            populator: FieldPopulator::new(page.clone()),
            page,
        }
    }

    impl Fixture {
        async fn fill(&self, key: &str, value: FieldValue) -> Result<PopulateReport, ActionError> {
            let field = self.resolver.resolve(key).await.unwrap().found().unwrap();
            self.populator.populate(&field, &value).await
        }

        async fn fill_descriptor(
            &self,
            descriptor: &FieldDescriptor,
            value: FieldValue,
        ) -> Result<PopulateReport, ActionError> {
            let field = self
                .resolver
                .resolve_descriptor(descriptor)
                .await
                .unwrap()
                .found()
                .unwrap();
            self.populator.populate(&field, &value).await
        }
    }

    #[tokio::test]
    async fn text_replaces_previous_value() {
        let fx = fixture(vec![MemoryNode::input("initials", "text")
            .with_id("initials")
            .with_value("X.")]);
        fx.fill("initials", "J.A.".into()).await.unwrap();
        fx.fill("initials", "J.A.".into()).await.unwrap();
        assert_eq!(fx.page.value_of("initials").as_deref(), Some("J.A."));
    }

    #[tokio::test]
    async fn numbers_are_typed_as_json_text() {
        let fx = fixture(vec![MemoryNode::textarea("houseNumber").with_name("houseNumber")]);
        fx.fill("houseNumber", FieldValue::Number(10u64.into()))
            .await
            .unwrap();
        assert_eq!(fx.page.value_of("houseNumber").as_deref(), Some("10"));
    }

    #[tokio::test]
    async fn checkbox_clicks_only_on_difference() {
        let fx = fixture(vec![MemoryNode::checkbox("agree").with_id("agree")]);
        let first = fx.fill("agree", true.into()).await.unwrap();
        let second = fx.fill("agree", true.into()).await.unwrap();
        assert!(first.changed);
        assert!(!second.changed);
        assert!(fx.page.is_checked("agree"));
        let clicks = fx
            .page
            .interactions()
            .into_iter()
            .filter(|i| matches!(i, Interaction::Click(_)))
            .count();
        assert_eq!(clicks, 1);
    }

    #[tokio::test]
    async fn radio_is_idempotent_and_encoded() {
        let fx = fixture(vec![
            MemoryNode::radio("man", "ctl00$AanvragerPersoonGeslacht", "M"),
            MemoryNode::radio("vrouw", "ctl00$AanvragerPersoonGeslacht", "V"),
        ]);
        let gender = FieldDescriptor::radio(
            "gender",
            Locator::css("input[name$='AanvragerPersoonGeslacht']"),
            ValueEncoding::Gender,
        );
        assert!(fx.fill_descriptor(&gender, "vrouw".into()).await.unwrap().changed);
        assert!(!fx.fill_descriptor(&gender, "vrouw".into()).await.unwrap().changed);
        assert!(fx.page.is_checked("vrouw"));
        assert!(!fx.page.is_checked("man"));
    }

    #[tokio::test]
    async fn inverted_radio_picks_opposite_option() {
        let fx = fixture(vec![
            MemoryNode::radio("differs", "ctl00$Adresafwijkend_JN", "true"),
            MemoryNode::radio("same", "ctl00$Adresafwijkend_JN", "false"),
        ]);
        let correct = FieldDescriptor::radio(
            "isAddressCorrect",
            Locator::css("input[name$='Adresafwijkend_JN']"),
            ValueEncoding::InvertedBool,
        );
        fx.fill_descriptor(&correct, true.into()).await.unwrap();
        assert!(fx.page.is_checked("same"));
    }

    #[tokio::test]
    async fn missing_radio_option_is_reported() {
        let fx = fixture(vec![MemoryNode::radio("ja", "subscribe", "J")]);
        let err = fx.fill("subscribe", "N".into()).await.unwrap_err();
        assert!(matches!(err, ActionError::OptionNotFound(_)));
    }

    #[tokio::test]
    async fn select_by_visible_text() {
        let fx = fixture(vec![
            MemoryNode::select("country", ["Nederland", "België"]).with_id("country")
        ]);
        fx.fill("country", "België".into()).await.unwrap();
        assert_eq!(fx.page.value_of("country").as_deref(), Some("België"));

        let err = fx.fill("country", "Duitsland".into()).await.unwrap_err();
        assert!(matches!(err, ActionError::OptionNotFound(_)));
    }

    #[tokio::test]
    async fn select_twice_keeps_choice() {
        let fx = fixture(vec![
            MemoryNode::select("country", ["Nederland", "België"]).with_id("country")
        ]);
        let first = fx.fill("country", "Nederland".into()).await.unwrap();
        let second = fx.fill("country", "Nederland".into()).await.unwrap();
        assert!(first.changed);
        assert!(!second.changed);
        assert_eq!(fx.page.value_of("country").as_deref(), Some("Nederland"));
    }

    #[tokio::test]
    async fn textarea_twice_keeps_single_copy() {
        let fx = fixture(vec![MemoryNode::textarea("remarks").with_name("remarks")]);
        let first = fx.fill("remarks", "Meter in de kelder".into()).await.unwrap();
        let second = fx.fill("remarks", "Meter in de kelder".into()).await.unwrap();
        assert!(first.changed);
        assert!(!second.changed);
        assert_eq!(
            fx.page.value_of("remarks").as_deref(),
            Some("Meter in de kelder")
        );
    }

    #[tokio::test]
    async fn vanished_element_is_stale() {
        let fx = fixture(vec![MemoryNode::input("email", "email").with_id("email")]);
        let field = fx.resolver.resolve("email").await.unwrap().found().unwrap();
        fx.page.remove("email");
        let err = fx
            .populator
            .populate(&field, &"a@b.nl".into())
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::StaleElement(_)));
    }
}
