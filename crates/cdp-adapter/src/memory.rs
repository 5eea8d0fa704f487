//! In-memory document implementing [`Cdp`].
//!
//! Nodes are kept in insertion order, which doubles as document order. CSS
//! lookups understand the subset the field map is written in: an optional tag,
//! an optional `#id` and any number of `[attr op 'value']` tests with `=`,
//! `$=`, `^=` or `*=`.
//!
//! Server-side auto-fill is simulated with [`AutofillRule`]s: typing into the
//! trigger schedules a write to the target that lands once the delay has
//! elapsed on the tokio clock, so paused-time tests can drive it.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use formfill_core_types::{Locator, LocatorStrategy};
use parking_lot::Mutex;
use tokio::time::Instant;

use crate::error::{AdapterError, AdapterErrorKind};
use crate::{Cdp, ElementHandle, ElementInfo};

/// One element of the simulated document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryNode {
    pub key: String,
    pub tag: String,
    pub attrs: BTreeMap<String, String>,
    /// Text of the `<label>` directly preceding this element.
    pub label: Option<String>,
    pub value: String,
    pub checked: bool,
    pub visible: bool,
    pub enabled: bool,
    /// Visible option texts of a `<select>`.
    pub options: Vec<String>,
    /// Keys made visible when this node is clicked.
    pub reveals: Vec<String>,
    /// Keys hidden when this node is clicked.
    pub hides: Vec<String>,
}

impl MemoryNode {
    fn new(key: impl Into<String>, tag: &str) -> Self {
        Self {
            key: key.into(),
            tag: tag.to_string(),
            attrs: BTreeMap::new(),
            label: None,
            value: String::new(),
            checked: false,
            visible: true,
            enabled: true,
            options: Vec::new(),
            reveals: Vec::new(),
            hides: Vec::new(),
        }
    }

    pub fn input(key: impl Into<String>, input_type: &str) -> Self {
        Self::new(key, "input").with_attr("type", input_type)
    }

    pub fn textarea(key: impl Into<String>) -> Self {
        Self::new(key, "textarea")
    }

    pub fn select<I, S>(key: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut node = Self::new(key, "select");
        node.options = options.into_iter().map(Into::into).collect();
        node
    }

    /// A radio option; `name` groups options, `value` is what gets submitted.
    pub fn radio(key: impl Into<String>, name: &str, value: &str) -> Self {
        Self::input(key, "radio")
            .with_name(name)
            .with_value(value)
    }

    pub fn checkbox(key: impl Into<String>) -> Self {
        Self::input(key, "checkbox")
    }

    /// A submit button carrying `value` as its caption.
    pub fn button(key: impl Into<String>, value: &str) -> Self {
        Self::input(key, "submit").with_value(value)
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_id(self, id: &str) -> Self {
        self.with_attr("id", id)
    }

    pub fn with_name(self, name: &str) -> Self {
        self.with_attr("name", name)
    }

    pub fn with_placeholder(self, placeholder: &str) -> Self {
        self.with_attr("placeholder", placeholder)
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn checked(mut self) -> Self {
        self.checked = true;
        self
    }

    pub fn reveals<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reveals.extend(keys.into_iter().map(Into::into));
        self
    }

    pub fn hides<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hides.extend(keys.into_iter().map(Into::into));
        self
    }

    fn attr(&self, name: &str) -> Option<&str> {
        match name {
            "value" => Some(self.value.as_str()),
            _ => self.attrs.get(name).map(String::as_str),
        }
    }

    fn info(&self) -> ElementInfo {
        ElementInfo {
            handle: ElementHandle(self.key.clone()),
            tag: self.tag.clone(),
            input_type: self.attrs.get("type").cloned(),
            visible: self.visible,
            enabled: self.enabled,
            value: self.value.clone(),
            checked: self.checked,
        }
    }
}

/// Simulated server-side fill: once text is typed into `trigger`, `target`
/// receives `value` after `delay`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutofillRule {
    pub trigger: String,
    pub target: String,
    pub value: String,
    pub delay: Duration,
}

impl AutofillRule {
    pub fn new(
        trigger: impl Into<String>,
        target: impl Into<String>,
        value: impl Into<String>,
        delay: Duration,
    ) -> Self {
        Self {
            trigger: trigger.into(),
            target: target.into(),
            value: value.into(),
            delay,
        }
    }
}

/// Recorded mutation, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    Navigate(String),
    Clear(String),
    Type { key: String, text: String },
    Click(String),
    Select { key: String, text: String },
}

impl Interaction {
    /// Node the interaction touched; `None` for navigation.
    pub fn key(&self) -> Option<&str> {
        match self {
            Interaction::Navigate(_) => None,
            Interaction::Clear(key) | Interaction::Click(key) => Some(key),
            Interaction::Type { key, .. } | Interaction::Select { key, .. } => Some(key),
        }
    }
}

#[derive(Debug)]
struct PendingFill {
    due: Instant,
    target: String,
    value: String,
}

#[derive(Debug)]
struct DocumentState {
    nodes: Vec<MemoryNode>,
    rules: Vec<AutofillRule>,
    pending: Vec<PendingFill>,
    interactions: Vec<Interaction>,
    title: Option<String>,
    ajax_idle: bool,
}

impl DocumentState {
    /// Apply scheduled fills whose time has come.
    fn settle(&mut self) {
        let now = Instant::now();
        let (due, later): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|fill| fill.due <= now);
        self.pending = later;
        for fill in due {
            if let Some(node) = self.nodes.iter_mut().find(|n| n.key == fill.target) {
                node.value = fill.value;
            }
        }
    }

    fn node(&self, handle: &ElementHandle) -> Result<&MemoryNode, AdapterError> {
        self.nodes
            .iter()
            .find(|n| n.key == handle.0)
            .ok_or_else(|| gone(handle))
    }

    fn node_mut(&mut self, handle: &ElementHandle) -> Result<&mut MemoryNode, AdapterError> {
        self.nodes
            .iter_mut()
            .find(|n| n.key == handle.0)
            .ok_or_else(|| gone(handle))
    }

    fn matching(&self, locator: &Locator) -> Result<Vec<ElementInfo>, AdapterError> {
        let selector = match locator.strategy {
            LocatorStrategy::Css => Some(Selector::parse(&locator.value)?),
            _ => None,
        };
        Ok(self
            .nodes
            .iter()
            .filter(|node| match locator.strategy {
                LocatorStrategy::Css => selector.as_ref().is_some_and(|s| s.matches(node)),
                LocatorStrategy::Id => node.attr("id") == Some(locator.value.as_str()),
                LocatorStrategy::Name => node.attr("name") == Some(locator.value.as_str()),
                LocatorStrategy::Label => node
                    .label
                    .as_deref()
                    .is_some_and(|label| label.contains(locator.value.as_str())),
                LocatorStrategy::Placeholder => {
                    node.attr("placeholder") == Some(locator.value.as_str())
                }
            })
            .map(MemoryNode::info)
            .collect())
    }

    fn apply_visibility(&mut self, reveals: &[String], hides: &[String]) {
        for node in &mut self.nodes {
            if reveals.contains(&node.key) {
                node.visible = true;
            }
            if hides.contains(&node.key) {
                node.visible = false;
            }
        }
    }
}

fn gone(handle: &ElementHandle) -> AdapterError {
    AdapterError::new(AdapterErrorKind::TargetNotFound)
        .with_hint(format!("element {handle} is no longer attached"))
}

/// In-memory stand-in for a browser page.
#[derive(Debug)]
pub struct MemoryPage {
    state: Mutex<DocumentState>,
}

impl Default for MemoryPage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPage {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(DocumentState {
                nodes: Vec::new(),
                rules: Vec::new(),
                pending: Vec::new(),
                interactions: Vec::new(),
                title: Some("Mijn RVO eLoket".to_string()),
                ajax_idle: true,
            }),
        }
    }

    pub fn with_nodes<I>(nodes: I) -> Self
    where
        I: IntoIterator<Item = MemoryNode>,
    {
        let page = Self::new();
        for node in nodes {
            page.push(node);
        }
        page
    }

    pub fn push(&self, node: MemoryNode) {
        self.state.lock().nodes.push(node);
    }

    pub fn remove(&self, key: &str) {
        self.state.lock().nodes.retain(|n| n.key != key);
    }

    pub fn add_autofill(&self, rule: AutofillRule) {
        self.state.lock().rules.push(rule);
    }

    pub fn set_visible(&self, key: &str, visible: bool) {
        let mut state = self.state.lock();
        if let Some(node) = state.nodes.iter_mut().find(|n| n.key == key) {
            node.visible = visible;
        }
    }

    pub fn set_ajax_idle(&self, idle: bool) {
        self.state.lock().ajax_idle = idle;
    }

    pub fn interactions(&self) -> Vec<Interaction> {
        self.state.lock().interactions.clone()
    }

    /// Whether any recorded interaction addressed `key`.
    pub fn touched(&self, key: &str) -> bool {
        self.state
            .lock()
            .interactions
            .iter()
            .any(|i| i.key() == Some(key))
    }

    pub fn value_of(&self, key: &str) -> Option<String> {
        let mut state = self.state.lock();
        state.settle();
        state
            .nodes
            .iter()
            .find(|n| n.key == key)
            .map(|n| n.value.clone())
    }

    pub fn is_checked(&self, key: &str) -> bool {
        self.state
            .lock()
            .nodes
            .iter()
            .any(|n| n.key == key && n.checked)
    }

    pub fn is_visible(&self, key: &str) -> bool {
        self.state
            .lock()
            .nodes
            .iter()
            .any(|n| n.key == key && n.visible)
    }
}

#[async_trait]
impl Cdp for MemoryPage {
    async fn navigate(&self, url: &str) -> Result<(), AdapterError> {
        self.state
            .lock()
            .interactions
            .push(Interaction::Navigate(url.to_string()));
        Ok(())
    }

    async fn title(&self) -> Result<Option<String>, AdapterError> {
        Ok(self.state.lock().title.clone())
    }

    async fn locate(&self, locator: &Locator) -> Result<Option<ElementInfo>, AdapterError> {
        let mut state = self.state.lock();
        state.settle();
        Ok(state.matching(locator)?.into_iter().next())
    }

    async fn locate_all(&self, locator: &Locator) -> Result<Vec<ElementInfo>, AdapterError> {
        let mut state = self.state.lock();
        state.settle();
        state.matching(locator)
    }

    async fn inspect(&self, handle: &ElementHandle) -> Result<Option<ElementInfo>, AdapterError> {
        let mut state = self.state.lock();
        state.settle();
        Ok(state.node(handle).ok().map(MemoryNode::info))
    }

    async fn clear(&self, handle: &ElementHandle) -> Result<(), AdapterError> {
        let mut state = self.state.lock();
        state.settle();
        state.node_mut(handle)?.value.clear();
        state.interactions.push(Interaction::Clear(handle.0.clone()));
        Ok(())
    }

    async fn type_text(&self, handle: &ElementHandle, text: &str) -> Result<(), AdapterError> {
        let mut state = self.state.lock();
        state.settle();
        state.node_mut(handle)?.value.push_str(text);
        state.interactions.push(Interaction::Type {
            key: handle.0.clone(),
            text: text.to_string(),
        });

        let now = Instant::now();
        let scheduled: Vec<PendingFill> = state
            .rules
            .iter()
            .filter(|rule| rule.trigger == handle.0)
            .map(|rule| PendingFill {
                due: now + rule.delay,
                target: rule.target.clone(),
                value: rule.value.clone(),
            })
            .collect();
        state.pending.extend(scheduled);
        Ok(())
    }

    async fn click(&self, handle: &ElementHandle) -> Result<(), AdapterError> {
        let mut state = self.state.lock();
        state.settle();
        let node = state.node(handle)?.clone();
        match node.attr("type") {
            Some("radio") => {
                let group = node.attr("name").map(str::to_string);
                for other in &mut state.nodes {
                    if other.attr("type") == Some("radio")
                        && other.attr("name").map(str::to_string) == group
                    {
                        other.checked = other.key == node.key;
                    }
                }
            }
            Some("checkbox") => {
                let target = state.node_mut(handle)?;
                target.checked = !target.checked;
            }
            _ => {}
        }
        state.apply_visibility(&node.reveals, &node.hides);
        state.interactions.push(Interaction::Click(handle.0.clone()));
        Ok(())
    }

    async fn select_by_text(
        &self,
        handle: &ElementHandle,
        text: &str,
    ) -> Result<(), AdapterError> {
        let mut state = self.state.lock();
        state.settle();
        let node = state.node_mut(handle)?;
        if !node.options.iter().any(|option| option == text) {
            return Err(AdapterError::new(AdapterErrorKind::OptionNotFound)
                .with_hint(format!("no option '{text}' in {}", node.key)));
        }
        node.value = text.to_string();
        state.interactions.push(Interaction::Select {
            key: handle.0.clone(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn ajax_idle(&self) -> Result<bool, AdapterError> {
        Ok(self.state.lock().ajax_idle)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrOp {
    Equals,
    EndsWith,
    StartsWith,
    Contains,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrTest {
    name: String,
    op: AttrOp,
    value: String,
}

impl AttrTest {
    fn matches(&self, node: &MemoryNode) -> bool {
        let Some(actual) = node.attr(&self.name) else {
            return false;
        };
        match self.op {
            AttrOp::Equals => actual == self.value,
            AttrOp::EndsWith => !self.value.is_empty() && actual.ends_with(&self.value),
            AttrOp::StartsWith => !self.value.is_empty() && actual.starts_with(&self.value),
            AttrOp::Contains => !self.value.is_empty() && actual.contains(&self.value),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Selector {
    tag: Option<String>,
    tests: Vec<AttrTest>,
}

impl Selector {
    fn parse(source: &str) -> Result<Self, AdapterError> {
        let unsupported = || {
            AdapterError::new(AdapterErrorKind::Internal)
                .with_hint(format!("unsupported selector: {source}"))
        };
        let ident = |s: &str| -> usize {
            s.find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
                .unwrap_or(s.len())
        };

        let mut rest = source.trim();
        let mut selector = Selector::default();

        let tag_len = ident(rest);
        if tag_len > 0 {
            selector.tag = Some(rest[..tag_len].to_ascii_lowercase());
            rest = &rest[tag_len..];
        }

        while !rest.is_empty() {
            if let Some(after) = rest.strip_prefix('#') {
                let len = ident(after);
                if len == 0 {
                    return Err(unsupported());
                }
                selector.tests.push(AttrTest {
                    name: "id".into(),
                    op: AttrOp::Equals,
                    value: after[..len].to_string(),
                });
                rest = &after[len..];
            } else if let Some(after) = rest.strip_prefix('[') {
                let close = after.find(']').ok_or_else(unsupported)?;
                selector.tests.push(parse_attr(&after[..close]).ok_or_else(unsupported)?);
                rest = &after[close + 1..];
            } else {
                return Err(unsupported());
            }
        }

        if selector.tag.is_none() && selector.tests.is_empty() {
            return Err(unsupported());
        }
        Ok(selector)
    }

    fn matches(&self, node: &MemoryNode) -> bool {
        self.tag.as_deref().map_or(true, |tag| tag == node.tag)
            && self.tests.iter().all(|test| test.matches(node))
    }
}

fn parse_attr(body: &str) -> Option<AttrTest> {
    let (name, op, value) = if let Some(pos) = body.find(&['$', '^', '*'][..]) {
        let op = match &body[pos..pos + 1] {
            "$" => AttrOp::EndsWith,
            "^" => AttrOp::StartsWith,
            _ => AttrOp::Contains,
        };
        let value = body[pos + 1..].strip_prefix('=')?;
        (&body[..pos], op, value)
    } else {
        let (name, value) = body.split_once('=')?;
        (name, AttrOp::Equals, value)
    };

    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    let value = value.trim();
    let value = value
        .strip_prefix('\'')
        .and_then(|v| v.strip_suffix('\''))
        .or_else(|| value.strip_prefix('"').and_then(|v| v.strip_suffix('"')))
        .unwrap_or(value);
    Some(AttrTest {
        name: name.to_string(),
        op,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> MemoryPage {
        MemoryPage::with_nodes([
            MemoryNode::input("bsn", "text").with_id("ctl00_cph_edBSNnummer"),
            MemoryNode::radio("man", "ctl00$AanvragerPersoonGeslacht", "M"),
            MemoryNode::radio("vrouw", "ctl00$AanvragerPersoonGeslacht", "V").checked(),
            MemoryNode::button("next", "Volgende")
                .with_id("ctl00_next")
                .reveals(["later"]),
            MemoryNode::input("later", "text").hidden(),
        ])
    }

    #[test]
    fn parses_field_map_selectors() {
        let sel = Selector::parse("input[id$='next'][value='Volgende']").unwrap();
        assert_eq!(sel.tag.as_deref(), Some("input"));
        assert_eq!(sel.tests.len(), 2);
        assert_eq!(sel.tests[0].op, AttrOp::EndsWith);
        assert_eq!(sel.tests[1].value, "Volgende");

        let sel = Selector::parse("#btnVolgendeTab").unwrap();
        assert_eq!(sel.tests[0].name, "id");

        assert!(Selector::parse("div > input").is_err());
    }

    #[tokio::test]
    async fn css_suffix_lookup() {
        let page = page();
        let found = page
            .locate(&Locator::css("input[id$='edBSNnummer']"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.handle.as_str(), "bsn");

        let group = page
            .locate_all(&Locator::css("input[name$='AanvragerPersoonGeslacht']"))
            .await
            .unwrap();
        assert_eq!(group.len(), 2);
    }

    #[tokio::test]
    async fn radio_click_unchecks_siblings() {
        let page = page();
        page.click(&ElementHandle("man".into())).await.unwrap();
        assert!(page.is_checked("man"));
        assert!(!page.is_checked("vrouw"));
    }

    #[tokio::test]
    async fn click_reveals_nodes() {
        let page = page();
        assert!(!page.is_visible("later"));
        page.click(&ElementHandle("next".into())).await.unwrap();
        assert!(page.is_visible("later"));
    }

    #[tokio::test]
    async fn removed_node_is_stale() {
        let page = page();
        page.remove("bsn");
        let err = page
            .type_text(&ElementHandle("bsn".into()), "1")
            .await
            .unwrap_err();
        assert_eq!(err.kind, AdapterErrorKind::TargetNotFound);
        assert!(page
            .inspect(&ElementHandle("bsn".into()))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn autofill_lands_after_delay() {
        let page = MemoryPage::with_nodes([
            MemoryNode::input("bsn", "text"),
            MemoryNode::input("lastName", "text"),
        ]);
        page.add_autofill(AutofillRule::new(
            "bsn",
            "lastName",
            "Jansen",
            Duration::from_secs(2),
        ));
        page.type_text(&ElementHandle("bsn".into()), "123456782")
            .await
            .unwrap();
        assert_eq!(page.value_of("lastName").as_deref(), Some(""));
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(page.value_of("lastName").as_deref(), Some("Jansen"));
    }

    #[tokio::test]
    async fn select_requires_known_option() {
        let page = MemoryPage::with_nodes([MemoryNode::select("land", ["Nederland", "België"])]);
        let handle = ElementHandle("land".into());
        page.select_by_text(&handle, "België").await.unwrap();
        assert_eq!(page.value_of("land").as_deref(), Some("België"));
        let err = page.select_by_text(&handle, "Duitsland").await.unwrap_err();
        assert_eq!(err.kind, AdapterErrorKind::OptionNotFound);
    }
}
