use tracing::info;

use super::PageContext;
use crate::errors::FormFillResult;
use crate::field_map::PersonalDetailsLayout;
use crate::payload::{require, AddressBlock, Section};

const SECTION: &str = "personalDetails";

/// Page 1. Entering the BSN triggers a register lookup that fills the
/// name fields; the payload values are written over whatever it produced.
pub async fn fill_personal_details(
    ctx: &mut PageContext,
    layout: &PersonalDetailsLayout,
    section: &Section,
) -> FormFillResult<()> {
    info!("Filling personal details");
    ctx.wait_ready(&layout.bsn).await?;

    let bsn = require(section, SECTION, "bsn")?;
    let address = AddressBlock::from_section(section, SECTION)?;

    ctx.fill(&layout.bsn, bsn).await;
    ctx.await_autofill(&layout.last_name_autofill).await?;

    for descriptor in &layout.stable_fields {
        ctx.fill_present(descriptor, section).await;
    }

    if let Some(address) = &address {
        ctx.fill_address(&layout.address, address).await?;
    }

    ctx.fill_present(&layout.correspondence_same, section).await;

    info!(stats = %ctx.stats(), "Personal details done");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::errors::FormFillError;
    use crate::field_map::FormLayout;
    use cdp_adapter::memory::{MemoryNode, MemoryPage};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn missing_bsn_is_fatal() {
        let page = Arc::new(MemoryPage::with_nodes([
            MemoryNode::input("bsn", "text").with_id("ctl00_edBSNnummer")
        ]));
        let mut ctx = PageContext::new(page.clone(), &AppConfig::default());
        let section: Section = serde_json::from_str(r#"{"initials":"J."}"#).unwrap();

        let err = fill_personal_details(&mut ctx, &FormLayout::rvo().personal, &section)
            .await
            .unwrap_err();
        assert!(matches!(err, FormFillError::MissingPayload(key) if key == "personalDetails.bsn"));
        assert!(page.interactions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn absent_anchor_means_page_not_ready() {
        let page = Arc::new(MemoryPage::new());
        let mut ctx = PageContext::new(page, &AppConfig::default());
        let section: Section = serde_json::from_str(r#"{"bsn":"123456782"}"#).unwrap();

        let err = fill_personal_details(&mut ctx, &FormLayout::rvo().personal, &section)
            .await
            .unwrap_err();
        assert!(matches!(err, FormFillError::PageNotReady(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn visible_anchor_is_ready_while_still_disabled() {
        let page = Arc::new(MemoryPage::with_nodes([MemoryNode::input("bsn", "text")
            .with_id("ctl00_edBSNnummer")
            .disabled()]));
        let ctx = PageContext::new(page, &AppConfig::default());

        ctx.wait_ready(&FormLayout::rvo().personal.bsn).await.unwrap();
    }
}
