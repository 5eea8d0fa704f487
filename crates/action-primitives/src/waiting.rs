//! Polling waits: element conditions, server-side auto-fill and AJAX idle

use std::sync::Arc;
use std::time::Duration;

use cdp_adapter::{Cdp, ElementInfo};
use formfill_core_types::Locator;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::{
    errors::ActionError,
    types::{AutofillOutcome, ElementState, WaitSettings},
};

fn satisfies(element: &ElementInfo, state: ElementState) -> bool {
    match state {
        ElementState::Present => true,
        ElementState::Visible => element.visible,
        ElementState::Clickable => element.is_clickable(),
    }
}

/// Poll until the first match of `locator` reaches `state`.
pub async fn wait_for_element(
    port: &dyn Cdp,
    locator: &Locator,
    state: ElementState,
    limit: Duration,
    poll: Duration,
) -> Result<ElementInfo, ActionError> {
    let polling = async {
        loop {
            if let Some(element) = port.locate(locator).await? {
                if satisfies(&element, state) {
                    return Ok::<_, ActionError>(element);
                }
            }
            sleep(poll).await;
        }
    };

    match timeout(limit, polling).await {
        Ok(result) => result,
        Err(_) => {
            warn!(%locator, ?state, "Element wait timed out after {}ms", limit.as_millis());
            Err(ActionError::WaitTimeout(format!(
                "{locator} not {state:?} after {}ms",
                limit.as_millis()
            )))
        }
    }
}

/// Wait for jQuery to report no outstanding requests.
///
/// Never fails: returns `false` when the page did not settle in time (or has
/// no jQuery at all) and the caller carries on.
pub async fn wait_for_ajax_idle(port: &dyn Cdp, limit: Duration, poll: Duration) -> bool {
    let polling = async {
        loop {
            match port.ajax_idle().await {
                Ok(true) => return,
                Ok(false) => {}
                Err(err) => debug!(%err, "AJAX idle probe failed"),
            }
            sleep(poll).await;
        }
    };

    match timeout(limit, polling).await {
        Ok(()) => true,
        Err(_) => {
            warn!("AJAX did not settle within {}ms", limit.as_millis());
            false
        }
    }
}

/// Watches a field that the server fills in after a lookup.
pub struct AutofillWaiter {
    port: Arc<dyn Cdp>,
    settings: WaitSettings,
}

impl AutofillWaiter {
    pub fn new(port: Arc<dyn Cdp>) -> Self {
        Self::with_settings(port, WaitSettings::default())
    }

    pub fn with_settings(port: Arc<dyn Cdp>, settings: WaitSettings) -> Self {
        Self { port, settings }
    }

    /// Poll `target` until it holds a non-empty value.
    ///
    /// A target that is not on the page yet counts as empty. `limit` defaults
    /// to the configured auto-fill timeout.
    pub async fn wait_for_change(
        &self,
        target: &Locator,
        limit: Option<Duration>,
    ) -> Result<AutofillOutcome, ActionError> {
        let limit = limit.unwrap_or(self.settings.autofill_timeout);
        let poll = self.settings.poll_interval;

        let polling = async {
            loop {
                if let Some(element) = self.port.locate(target).await? {
                    if !element.value.trim().is_empty() {
                        return Ok::<_, ActionError>(element.value);
                    }
                }
                sleep(poll).await;
            }
        };

        match timeout(limit, polling).await {
            Ok(Ok(value)) => {
                info!(%target, "Auto-fill observed");
                Ok(AutofillOutcome::Observed(value))
            }
            Ok(Err(err)) => Err(err),
            Err(_) => {
                warn!(%target, "Auto-fill did not occur within {}ms", limit.as_millis());
                Ok(AutofillOutcome::TimedOut)
            }
        }
    }
}
