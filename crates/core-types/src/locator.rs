use std::fmt;

use serde::{Deserialize, Serialize};

/// How a locator value is interpreted when searching the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocatorStrategy {
    /// CSS selector, first match in document order.
    Css,
    /// Exact `id` attribute.
    Id,
    /// Exact `name` attribute.
    Name,
    /// The element directly following a `<label>` whose text contains the value.
    Label,
    /// Exact `placeholder` attribute.
    Placeholder,
}

impl LocatorStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            LocatorStrategy::Css => "css",
            LocatorStrategy::Id => "id",
            LocatorStrategy::Name => "name",
            LocatorStrategy::Label => "label",
            LocatorStrategy::Placeholder => "placeholder",
        }
    }
}

impl fmt::Display for LocatorStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A strategy paired with the value it searches for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    pub strategy: LocatorStrategy,
    pub value: String,
}

impl Locator {
    pub fn new(strategy: LocatorStrategy, value: impl Into<String>) -> Self {
        Self {
            strategy,
            value: value.into(),
        }
    }

    pub fn css(selector: impl Into<String>) -> Self {
        Self::new(LocatorStrategy::Css, selector)
    }

    pub fn id(id: impl Into<String>) -> Self {
        Self::new(LocatorStrategy::Id, id)
    }

    pub fn name(name: impl Into<String>) -> Self {
        Self::new(LocatorStrategy::Name, name)
    }

    pub fn label(text: impl Into<String>) -> Self {
        Self::new(LocatorStrategy::Label, text)
    }

    pub fn placeholder(text: impl Into<String>) -> Self {
        Self::new(LocatorStrategy::Placeholder, text)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.strategy, self.value)
    }
}

/// Ordered list of strategies tried when a field is looked up by key alone.
///
/// Priority is positional: the first strategy that yields a visible element
/// wins, later strategies are never consulted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LookupOrder(Vec<LocatorStrategy>);

impl LookupOrder {
    pub fn new(strategies: Vec<LocatorStrategy>) -> Self {
        Self(strategies)
    }

    pub fn strategies(&self) -> &[LocatorStrategy] {
        &self.0
    }

    /// Locators for `key`, one per strategy, in priority order.
    pub fn locators_for<'a>(&'a self, key: &'a str) -> impl Iterator<Item = Locator> + 'a {
        self.0.iter().map(move |strategy| Locator::new(*strategy, key))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for LookupOrder {
    fn default() -> Self {
        Self(vec![
            LocatorStrategy::Id,
            LocatorStrategy::Name,
            LocatorStrategy::Label,
            LocatorStrategy::Placeholder,
        ])
    }
}
