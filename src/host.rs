//! Request handling for the native-messaging host.

use std::sync::Arc;

use async_trait::async_trait;
use cdp_adapter::{Cdp, CdpAdapter};
use extensions_bridge::{BridgeRequest, HandlerError, RequestHandler};
use formfill_core_types::RunStats;
use tracing::info;

use crate::config::AppConfig;
use crate::filler::fill_form;
use crate::payload::SubmissionPayload;
use crate::workflow::{PageSelection, Workflow};

/// Attaches to the debugging browser for every request.
pub struct BrowserRequestHandler {
    config: AppConfig,
}

impl BrowserRequestHandler {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Run `request` against an already attached page.
    pub async fn handle_on(
        &self,
        port: Arc<dyn Cdp>,
        request: BridgeRequest,
    ) -> Result<RunStats, HandlerError> {
        match request {
            BridgeRequest::Fill { url, data } => {
                info!(%url, fields = data.len(), "Generic fill requested");
                Ok(fill_form(port, &self.config, &url, &data).await)
            }
            BridgeRequest::Workflow { payload, page } => {
                let selection = PageSelection::from_page_number(page)?;
                let payload = SubmissionPayload::from_value(payload)?;
                info!(?selection, "Workflow requested");
                let report = Workflow::new(port, self.config.clone())
                    .run(&payload, selection)
                    .await?;
                Ok(report.stats)
            }
        }
    }
}

#[async_trait]
impl RequestHandler for BrowserRequestHandler {
    async fn handle(&self, request: BridgeRequest) -> Result<RunStats, HandlerError> {
        let adapter = CdpAdapter::attach(self.config.browser.clone()).await?;
        self.handle_on(Arc::new(adapter), request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdp_adapter::memory::{MemoryNode, MemoryPage};
    use serde_json::json;

    #[tokio::test(start_paused = true)]
    async fn workflow_failure_becomes_handler_error() {
        let page = Arc::new(MemoryPage::with_nodes([
            MemoryNode::radio("differs", "ctl00$Adresafwijkend_JN", "true"),
            MemoryNode::radio("same", "ctl00$Adresafwijkend_JN", "false"),
        ]));
        let handler = BrowserRequestHandler::new(AppConfig::default());
        let err = handler
            .handle_on(
                page,
                BridgeRequest::Workflow {
                    payload: json!({"installationAddress": {"isAddressCorrect": false}}),
                    page: Some(2),
                },
            )
            .await
            .unwrap_err();
        assert!(err
            .to_string()
            .starts_with("missing payload data: installationAddress.address"));
    }

    #[tokio::test(start_paused = true)]
    async fn fill_request_returns_stats() {
        let page = Arc::new(MemoryPage::with_nodes([
            MemoryNode::input("iban", "text").with_name("iban")
        ]));
        let handler = BrowserRequestHandler::new(AppConfig::default());
        let stats = handler
            .handle_on(
                page,
                BridgeRequest::Fill {
                    url: "https://example.org".into(),
                    data: [("iban".to_string(), "NL91ABNA0417164300".into())].into(),
                },
            )
            .await
            .unwrap();
        assert_eq!(stats, RunStats { fields_populated: 1, errors: 0 });
    }
}
