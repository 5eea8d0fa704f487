use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::input::InsertTextParams;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::Page;
use formfill_core_types::Locator;
use futures::StreamExt;
use serde::Deserialize;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::CdpConfig;
use crate::error::{AdapterError, AdapterErrorKind};
use crate::util::endpoint_url;
use crate::{scripts, Cdp, ElementHandle, ElementInfo};

/// Adapter bound to one page of an already-running browser.
pub struct CdpAdapter {
    cfg: CdpConfig,
    _browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
}

impl CdpAdapter {
    /// Attach to the browser behind `cfg` and take over its first web page.
    ///
    /// The session is expected to be authenticated and positioned on the
    /// target form already; nothing is launched or navigated here.
    pub async fn attach(cfg: CdpConfig) -> Result<Self, AdapterError> {
        let url = endpoint_url(&cfg);
        info!(target: "cdp-adapter", url = %url, "attaching to existing browser");

        let (mut browser, mut handler) = Browser::connect(url.clone()).await.map_err(|err| {
            AdapterError::new(AdapterErrorKind::Connect)
                .with_hint(format!("failed to connect to {url}: {err}"))
        })?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    debug!(target: "cdp-adapter", ?err, "handler event error");
                }
            }
            debug!(target: "cdp-adapter", "handler stream finished");
        });

        if let Err(err) = browser.fetch_targets().await {
            warn!(target: "cdp-adapter", ?err, "fetching existing targets failed");
        }
        // targets attach asynchronously after discovery
        tokio::time::sleep(Duration::from_millis(100)).await;

        let pages = browser.pages().await.map_err(io_error)?;
        let page = pick_page(pages).await.ok_or_else(|| {
            AdapterError::new(AdapterErrorKind::Connect).with_hint("browser has no open pages")
        })?;

        let adapter = Self {
            cfg,
            _browser: browser,
            page,
            handler_task,
        };
        match adapter.title().await {
            Ok(title) => info!(
                target: "cdp-adapter",
                title = title.as_deref().unwrap_or(""),
                "connected to browser"
            ),
            Err(err) => warn!(target: "cdp-adapter", %err, "connected but title unavailable"),
        }
        Ok(adapter)
    }

    fn deadline(&self) -> Duration {
        Duration::from_millis(self.cfg.default_deadline_ms)
    }

    async fn with_deadline<T, F>(&self, what: &str, fut: F) -> Result<T, AdapterError>
    where
        F: Future<Output = Result<T, CdpError>>,
    {
        match tokio::time::timeout(self.deadline(), fut).await {
            Ok(result) => result.map_err(io_error),
            Err(_) => Err(AdapterError::new(AdapterErrorKind::Timeout)
                .with_hint(format!("{what} exceeded {}ms", self.cfg.default_deadline_ms))),
        }
    }

    async fn evaluate(&self, expression: String) -> Result<Value, AdapterError> {
        let result = self
            .with_deadline("Runtime.evaluate", self.page.evaluate(expression))
            .await?;
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }

    async fn evaluate_reply(&self, expression: String) -> Result<ScriptReply, AdapterError> {
        let value = self.evaluate(expression).await?;
        let reply: ScriptReply = serde_json::from_value(value.clone()).map_err(|err| {
            AdapterError::new(AdapterErrorKind::Internal)
                .with_hint(format!("unexpected script reply: {err}"))
                .with_data(value)
        })?;
        match reply.status.as_str() {
            "ok" => Ok(reply),
            "not-found" => Err(AdapterError::new(AdapterErrorKind::TargetNotFound)),
            "option-missing" => Err(AdapterError::new(AdapterErrorKind::OptionNotFound)),
            _ => Err(AdapterError::new(AdapterErrorKind::Internal).with_hint(
                reply
                    .message
                    .unwrap_or_else(|| format!("script status {}", reply.status)),
            )),
        }
    }

    async fn run_on(&self, handle: &ElementHandle, expression: String) -> Result<(), AdapterError> {
        self.evaluate_reply(expression)
            .await
            .map(|_| ())
            .map_err(|err| with_target(err, handle))
    }

    async fn lookup(&self, locator: &Locator, all: bool) -> Result<Vec<ElementInfo>, AdapterError> {
        let token = Uuid::new_v4().simple().to_string();
        let expression = scripts::locate(locator, &token, all)?;
        let reply = self.evaluate_reply(expression).await?;
        Ok(reply.elements.into_iter().map(RawElement::into_info).collect())
    }
}

impl Drop for CdpAdapter {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}

#[async_trait]
impl Cdp for CdpAdapter {
    async fn navigate(&self, url: &str) -> Result<(), AdapterError> {
        info!(target: "cdp-adapter", url, "navigating");
        self.with_deadline("Page.navigate", self.page.goto(url))
            .await
            .map(|_| ())
    }

    async fn title(&self) -> Result<Option<String>, AdapterError> {
        self.with_deadline("title", self.page.get_title()).await
    }

    async fn locate(&self, locator: &Locator) -> Result<Option<ElementInfo>, AdapterError> {
        Ok(self.lookup(locator, false).await?.into_iter().next())
    }

    async fn locate_all(&self, locator: &Locator) -> Result<Vec<ElementInfo>, AdapterError> {
        self.lookup(locator, true).await
    }

    async fn inspect(&self, handle: &ElementHandle) -> Result<Option<ElementInfo>, AdapterError> {
        match self.evaluate_reply(scripts::inspect(handle.as_str())?).await {
            Ok(reply) => Ok(reply
                .elements
                .into_iter()
                .next()
                .map(RawElement::into_info)),
            Err(err) if err.kind == AdapterErrorKind::TargetNotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn clear(&self, handle: &ElementHandle) -> Result<(), AdapterError> {
        self.run_on(handle, scripts::clear(handle.as_str())?).await
    }

    async fn type_text(&self, handle: &ElementHandle, text: &str) -> Result<(), AdapterError> {
        self.run_on(handle, scripts::focus(handle.as_str())?).await?;
        self.with_deadline(
            "Input.insertText",
            self.page.execute(InsertTextParams::new(text)),
        )
        .await?;
        self.run_on(handle, scripts::commit(handle.as_str())?).await
    }

    async fn click(&self, handle: &ElementHandle) -> Result<(), AdapterError> {
        self.run_on(handle, scripts::click(handle.as_str())?).await
    }

    async fn select_by_text(
        &self,
        handle: &ElementHandle,
        text: &str,
    ) -> Result<(), AdapterError> {
        self.run_on(handle, scripts::select_by_text(handle.as_str(), text)?)
            .await
    }

    async fn ajax_idle(&self) -> Result<bool, AdapterError> {
        let value = self.evaluate(scripts::AJAX_IDLE.to_string()).await?;
        Ok(value.as_bool().unwrap_or(false))
    }
}

/// Prefer the first ordinary web page over internal targets.
async fn pick_page(pages: Vec<Page>) -> Option<Page> {
    let mut fallback = None;
    for page in pages {
        let url = page.url().await.ok().flatten().unwrap_or_default();
        if url.starts_with("http") {
            return Some(page);
        }
        if fallback.is_none() && !url.starts_with("devtools://") {
            fallback = Some(page);
        }
    }
    fallback
}

fn io_error(err: CdpError) -> AdapterError {
    AdapterError::new(AdapterErrorKind::CdpIo).with_hint(err.to_string())
}

fn with_target(err: AdapterError, handle: &ElementHandle) -> AdapterError {
    match err.kind {
        AdapterErrorKind::TargetNotFound if err.hint.is_none() => {
            err.with_hint(format!("element {handle} is no longer attached"))
        }
        _ => err,
    }
}

#[derive(Debug, Deserialize)]
struct ScriptReply {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    elements: Vec<RawElement>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawElement {
    selector: String,
    tag: String,
    input_type: Option<String>,
    visible: bool,
    enabled: bool,
    value: String,
    checked: bool,
}

impl RawElement {
    fn into_info(self) -> ElementInfo {
        ElementInfo {
            handle: ElementHandle(self.selector),
            tag: self.tag,
            input_type: self.input_type,
            visible: self.visible,
            enabled: self.enabled,
            value: self.value,
            checked: self.checked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_element_maps_camel_case_reply() {
        let reply: ScriptReply = serde_json::from_value(serde_json::json!({
            "status": "ok",
            "elements": [{
                "selector": "[data-formfill-anchor=\"abc-0\"]",
                "tag": "input",
                "inputType": "radio",
                "visible": true,
                "enabled": true,
                "value": "M",
                "checked": false
            }]
        }))
        .unwrap();
        let info = reply.elements.into_iter().next().unwrap().into_info();
        assert_eq!(info.handle.as_str(), "[data-formfill-anchor=\"abc-0\"]");
        assert_eq!(info.input_type.as_deref(), Some("radio"));
        assert!(info.is_clickable());
    }

    #[test]
    fn not_found_hint_names_handle() {
        let err = with_target(
            AdapterError::new(AdapterErrorKind::TargetNotFound),
            &ElementHandle("#gone".into()),
        );
        assert!(err.to_string().contains("#gone"));
    }
}
