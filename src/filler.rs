//! Key-driven fill of an arbitrary page.
//!
//! Unlike the page handlers there is no layout here: every payload key is
//! looked up through the configured strategy order and populated wherever it
//! resolves. Nothing in this path is fatal.

use std::collections::BTreeMap;
use std::sync::Arc;

use action_locator::{ElementResolver, FieldResolver, Resolution};
use action_primitives::{wait_for_ajax_idle, FieldPopulator, Populate};
use cdp_adapter::Cdp;
use formfill_core_types::{FieldValue, RunStats};
use tracing::{debug, error, info, warn};

use crate::config::AppConfig;

pub async fn fill_form(
    port: Arc<dyn Cdp>,
    config: &AppConfig,
    url: &str,
    data: &BTreeMap<String, FieldValue>,
) -> RunStats {
    let mut stats = RunStats::default();

    if let Err(err) = port.navigate(url).await {
        error!(%url, %err, "Navigation failed");
        stats.record_error();
        return stats;
    }
    if !wait_for_ajax_idle(
        port.as_ref(),
        config.waits.ajax_timeout,
        config.waits.poll_interval,
    )
    .await
    {
        debug!(%url, "Continuing without AJAX idle");
    }

    let resolver = FieldResolver::new(port.clone(), config.lookup_order.clone());
    let populator = FieldPopulator::new(port);

    for (key, value) in data {
        if matches!(value, FieldValue::Empty) {
            debug!(%key, "Null value, skipping");
            continue;
        }

        let field = match resolver.resolve(key).await {
            Ok(Resolution::Found(field)) => field,
            Ok(Resolution::NotFound) => {
                warn!(%key, "Field not found");
                stats.record_error();
                continue;
            }
            Err(err) => {
                warn!(%key, %err, "Field lookup failed");
                stats.record_error();
                continue;
            }
        };

        match populator.populate(&field, value).await {
            Ok(_) => stats.record_populated(),
            Err(err) => {
                warn!(%key, %err, "Failed to fill field");
                stats.record_error();
            }
        }
    }

    info!(%url, %stats, "Form fill complete");
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdp_adapter::memory::{Interaction, MemoryNode, MemoryPage};

    fn data(json: &str) -> BTreeMap<String, FieldValue> {
        serde_json::from_str(json).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn counts_found_and_missing_fields() {
        let page = Arc::new(MemoryPage::with_nodes([
            MemoryNode::input("email", "email").with_id("email"),
            MemoryNode::select("country", ["Nederland", "België"]).with_name("country"),
            MemoryNode::checkbox("agree").with_label("agree to terms"),
        ]));

        let stats = fill_form(
            page.clone(),
            &AppConfig::default(),
            "https://example.org/form",
            &data(r#"{"email":"a@b.nl","country":"België","agree":true,"fax":"1","note":null}"#),
        )
        .await;

        assert_eq!(stats, RunStats { fields_populated: 3, errors: 1 });
        assert_eq!(page.value_of("email").as_deref(), Some("a@b.nl"));
        assert!(page.is_checked("agree"));
        assert_eq!(
            page.interactions()[0],
            Interaction::Navigate("https://example.org/form".to_string())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn unsettled_ajax_is_not_fatal() {
        let page = Arc::new(MemoryPage::with_nodes([
            MemoryNode::input("city", "text").with_name("city")
        ]));
        page.set_ajax_idle(false);

        let stats = fill_form(
            page.clone(),
            &AppConfig::default(),
            "https://example.org",
            &data(r#"{"city":"Utrecht"}"#),
        )
        .await;
        assert_eq!(stats.fields_populated, 1);
        assert_eq!(page.value_of("city").as_deref(), Some("Utrecht"));
    }

    #[tokio::test(start_paused = true)]
    async fn option_missing_counts_as_error() {
        let page = Arc::new(MemoryPage::with_nodes([
            MemoryNode::select("country", ["Nederland"]).with_id("country")
        ]));
        let stats = fill_form(
            page,
            &AppConfig::default(),
            "https://example.org",
            &data(r#"{"country":"Duitsland"}"#),
        )
        .await;
        assert_eq!(stats, RunStats { fields_populated: 0, errors: 1 });
    }
}
