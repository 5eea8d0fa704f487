//! Page handlers and the shared context they run in.
//!
//! A page handler is a fixed sequence of steps. Steps that concern a single
//! field never abort the page: their failures are counted in [`RunStats`].
//! Only a missing anchor, missing payload data or an unreachable "next"
//! control stops the run.

mod installation_address;
mod personal_details;

pub use installation_address::fill_installation_address;
pub use personal_details::fill_personal_details;

use std::sync::Arc;

use action_locator::{ElementResolver, FieldResolver, Resolution};
use action_primitives::{
    execute_click, wait_for_ajax_idle, wait_for_element, ActionError, AutofillOutcome,
    AutofillWaiter, ElementState, FieldPopulator, Populate,
};
use cdp_adapter::Cdp;
use formfill_core_types::{FieldDescriptor, FieldValue, Locator, RunStats};
use tracing::{debug, info, warn};

use crate::config::{AppConfig, WaitConfig};
use crate::errors::{FormFillError, FormFillResult};
use crate::field_map::{interaction_state, AddressFields};
use crate::payload::{present, AddressBlock, Section};

/// Browser handles and counters for one fill pass.
pub struct PageContext {
    port: Arc<dyn Cdp>,
    resolver: FieldResolver,
    populator: FieldPopulator,
    waiter: AutofillWaiter,
    waits: WaitConfig,
    stats: RunStats,
}

impl PageContext {
    pub fn new(port: Arc<dyn Cdp>, config: &AppConfig) -> Self {
        Self {
            resolver: FieldResolver::new(port.clone(), config.lookup_order.clone()),
            populator: FieldPopulator::new(port.clone()),
            waiter: AutofillWaiter::with_settings(port.clone(), config.waits.settings()),
            waits: config.waits.clone(),
            port,
            stats: RunStats::default(),
        }
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    /// Wait for the field that marks a page as loaded.
    pub async fn wait_ready(&self, anchor: &FieldDescriptor) -> FormFillResult<()> {
        match self.wait_element(&anchor.locator, ElementState::Visible).await {
            Ok(_) => {
                debug!(anchor = %anchor.key, "Page ready");
                Ok(())
            }
            Err(ActionError::WaitTimeout(detail)) => Err(FormFillError::PageNotReady(format!(
                "{} did not appear: {detail}",
                anchor.key
            ))),
            Err(err) => Err(err.into()),
        }
    }

    /// Fill one field; failures are counted, never raised.
    ///
    /// The field gets up to `waits.element_timeout` to become usable, since
    /// parts of the form are revealed only after an earlier answer.
    pub async fn fill(&mut self, descriptor: &FieldDescriptor, value: &FieldValue) {
        let state = interaction_state(descriptor);
        if let Err(err) = self.wait_element(&descriptor.locator, state).await {
            warn!(key = %descriptor.key, %err, "Field never became usable");
            self.stats.record_error();
            return;
        }

        let field = match self.resolver.resolve_descriptor(descriptor).await {
            Ok(Resolution::Found(field)) => field,
            Ok(Resolution::NotFound) => {
                warn!(key = %descriptor.key, locator = %descriptor.locator, "Field not found");
                self.stats.record_error();
                return;
            }
            Err(err) => {
                warn!(key = %descriptor.key, %err, "Field lookup failed");
                self.stats.record_error();
                return;
            }
        };

        match self.populator.populate(&field, value).await {
            Ok(report) => {
                debug!(key = %descriptor.key, changed = report.changed, "Field filled");
                self.stats.record_populated();
            }
            Err(err) => {
                warn!(key = %descriptor.key, %err, "Failed to fill field");
                self.stats.record_error();
            }
        }
    }

    /// Fill `descriptor` from `section` when the payload carries its key.
    pub async fn fill_present(&mut self, descriptor: &FieldDescriptor, section: &Section) {
        match present(section, &descriptor.key) {
            Some(value) => self.fill(descriptor, value).await,
            None => debug!(key = %descriptor.key, "Not in payload, skipping"),
        }
    }

    /// Wait for a server-side fill of `target`. A timeout is only logged.
    pub async fn await_autofill(&self, target: &Locator) -> FormFillResult<()> {
        match self.waiter.wait_for_change(target, None).await? {
            AutofillOutcome::Observed(value) => {
                debug!(%target, %value, "Auto-fill arrived");
            }
            AutofillOutcome::TimedOut => {
                warn!(%target, "Auto-fill timed out, filling from payload");
            }
        }
        Ok(())
    }

    /// Postal code and house number, then the street/city the lookup
    /// produces, overwritten with the payload values.
    pub async fn fill_address(
        &mut self,
        fields: &AddressFields,
        address: &AddressBlock,
    ) -> FormFillResult<()> {
        self.fill(&fields.postal_code, &address.postal_code).await;
        self.fill(&fields.house_number, &address.house_number).await;
        if let Some(suffix) = &address.house_number_suffix {
            self.fill(&fields.house_number_suffix, suffix).await;
        }

        self.await_autofill(&fields.street.locator).await?;
        self.fill(&fields.street, &address.street).await;
        self.fill(&fields.city, &address.city).await;
        Ok(())
    }

    /// Press a "next" control and let the following page settle.
    pub async fn click_next(&self, next: &Locator) -> FormFillResult<()> {
        let element = self
            .wait_element(next, ElementState::Clickable)
            .await
            .map_err(|err| FormFillError::Navigation(format!("{next}: {err}")))?;
        execute_click(self.port.as_ref(), &element)
            .await
            .map_err(|err| FormFillError::Navigation(format!("{next}: {err}")))?;
        info!(%next, "Moved to next page");

        wait_for_ajax_idle(
            self.port.as_ref(),
            self.waits.ajax_timeout,
            self.waits.poll_interval,
        )
        .await;
        Ok(())
    }

    async fn wait_element(
        &self,
        locator: &Locator,
        state: ElementState,
    ) -> Result<cdp_adapter::ElementInfo, ActionError> {
        wait_for_element(
            self.port.as_ref(),
            locator,
            state,
            self.waits.element_timeout,
            self.waits.poll_interval,
        )
        .await
    }
}
