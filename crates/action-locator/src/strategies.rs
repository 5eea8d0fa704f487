//! Single-strategy probes used by the resolver.

use cdp_adapter::{Cdp, ElementInfo};
use formfill_core_types::{FieldKind, Locator};
use tracing::debug;

use crate::errors::LocatorError;

/// Run one locator and keep its first match only if it is visible.
///
/// Later matches of the same locator are never considered; ambiguity is
/// settled by strategy priority, not by scanning further.
pub async fn first_visible(
    port: &dyn Cdp,
    locator: &Locator,
) -> Result<Option<ElementInfo>, LocatorError> {
    match port.locate(locator).await? {
        Some(element) if element.visible => Ok(Some(element)),
        Some(element) => {
            debug!(%locator, handle = %element.handle, "first match is not visible");
            Ok(None)
        }
        None => Ok(None),
    }
}

/// Decide the field kind from the element's tag and type.
pub fn detect_kind(key: &str, element: &ElementInfo) -> Result<FieldKind, LocatorError> {
    FieldKind::detect(&element.tag, element.input_type.as_deref()).ok_or_else(|| {
        LocatorError::UnsupportedElement {
            key: key.to_string(),
            element: describe(element),
        }
    })
}

fn describe(element: &ElementInfo) -> String {
    match element.input_type.as_deref() {
        Some(kind) => format!("{} type={kind}", element.tag),
        None => element.tag.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdp_adapter::memory::{MemoryNode, MemoryPage};

    #[tokio::test]
    async fn hidden_first_match_is_rejected() {
        let page = MemoryPage::with_nodes([
            MemoryNode::input("a", "text").with_name("city").hidden(),
            MemoryNode::input("b", "text").with_name("city"),
        ]);
        let found = first_visible(&page, &Locator::name("city")).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn file_inputs_are_unsupported() {
        let page = MemoryPage::with_nodes([MemoryNode::input("upload", "file").with_id("upload")]);
        let element = first_visible(&page, &Locator::id("upload"))
            .await
            .unwrap()
            .unwrap();
        let err = detect_kind("upload", &element).unwrap_err();
        assert!(matches!(err, LocatorError::UnsupportedElement { .. }));
    }
}
