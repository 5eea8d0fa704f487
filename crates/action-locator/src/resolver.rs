//! Field resolver with fallback chain orchestration

use std::sync::Arc;

use async_trait::async_trait;
use cdp_adapter::Cdp;
use formfill_core_types::{FieldDescriptor, FieldKind, Locator, LookupOrder};
use tracing::{debug, info};

use crate::{errors::LocatorError, strategies::*, types::*};

/// Field resolver trait
#[async_trait]
pub trait ElementResolver: Send + Sync {
    /// Resolve a field by key, trying each configured strategy in order
    async fn resolve(&self, key: &str) -> Result<Resolution, LocatorError>;

    /// Resolve a static descriptor by its own locator, without fallback
    async fn resolve_descriptor(
        &self,
        descriptor: &FieldDescriptor,
    ) -> Result<Resolution, LocatorError>;
}

/// Default resolver driving a [`Cdp`] port
pub struct FieldResolver {
    port: Arc<dyn Cdp>,
    order: LookupOrder,
}

impl FieldResolver {
    pub fn new(port: Arc<dyn Cdp>, order: LookupOrder) -> Self {
        Self { port, order }
    }
}

#[async_trait]
impl ElementResolver for FieldResolver {
    async fn resolve(&self, key: &str) -> Result<Resolution, LocatorError> {
        if self.order.is_empty() {
            return Err(LocatorError::EmptyLookupOrder);
        }

        for locator in self.order.locators_for(key) {
            debug!("Trying strategy: {}", locator.strategy.name());

            let Some(element) = first_visible(self.port.as_ref(), &locator).await? else {
                continue;
            };

            let kind = detect_kind(key, &element)?;
            let group = match kind {
                FieldKind::Radio(_) => Locator::name(key),
                _ => locator.clone(),
            };
            info!(
                key,
                strategy = locator.strategy.name(),
                kind = kind.name(),
                "Resolved field"
            );
            return Ok(Resolution::Found(ResolvedField {
                key: key.to_string(),
                element,
                kind,
                group,
                strategy: locator.strategy,
            }));
        }

        debug!(key, "All strategies exhausted");
        Ok(Resolution::NotFound)
    }

    async fn resolve_descriptor(
        &self,
        descriptor: &FieldDescriptor,
    ) -> Result<Resolution, LocatorError> {
        let Some(element) = first_visible(self.port.as_ref(), &descriptor.locator).await? else {
            debug!(key = %descriptor.key, locator = %descriptor.locator, "Descriptor not found");
            return Ok(Resolution::NotFound);
        };

        Ok(Resolution::Found(ResolvedField {
            key: descriptor.key.clone(),
            element,
            kind: descriptor.kind,
            group: descriptor.locator.clone(),
            strategy: descriptor.locator.strategy,
        }))
    }
}
