//! Locator abstraction for element selection.
//!
//! A [`Locator`] is declared once, in a screen's static declaration table, and
//! is never mutated afterwards. Every value is `Copy` and const-constructible so
//! declaration tables can live in `static` items.
//!
//! # Design Philosophy
//!
//! - **Opaque**: callers pass locators to the driver without inspecting them
//! - **Immutable**: no builder methods that change a declared locator
//! - **Portable**: each selector renders to a DOM query expression, so any
//!   driver that can evaluate JavaScript can honour every strategy

use serde::Serialize;
use std::fmt;

/// Selector strategy for locating elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "strategy", content = "value", rename_all = "snake_case")]
pub enum Selector {
    /// Element id attribute
    Id(&'static str),
    /// Single class name
    ClassName(&'static str),
    /// CSS selector (e.g., "button.primary")
    Css(&'static str),
    /// XPath selector
    XPath(&'static str),
    /// Test ID selector (data-testid attribute)
    TestId(&'static str),
    /// Text content selector
    Text(&'static str),
}

impl Selector {
    /// The raw selector value
    #[must_use]
    pub const fn value(&self) -> &'static str {
        match *self {
            Self::Id(v)
            | Self::ClassName(v)
            | Self::Css(v)
            | Self::XPath(v)
            | Self::TestId(v)
            | Self::Text(v) => v,
        }
    }

    /// Strategy name used in diagnostics
    #[must_use]
    pub const fn strategy(&self) -> &'static str {
        match self {
            Self::Id(_) => "id",
            Self::ClassName(_) => "class",
            Self::Css(_) => "css",
            Self::XPath(_) => "xpath",
            Self::TestId(_) => "test-id",
            Self::Text(_) => "text",
        }
    }

    /// Convert to a JavaScript expression yielding the first match or null
    #[must_use]
    pub fn to_query(&self) -> String {
        match self {
            Self::Id(id) => format!("document.getElementById({})", js_str(id)),
            Self::ClassName(class) => {
                format!("(document.getElementsByClassName({})[0] || null)", js_str(class))
            }
            Self::Css(css) => format!("document.querySelector({})", js_str(css)),
            Self::XPath(xpath) => format!(
                "document.evaluate({}, document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue",
                js_str(xpath)
            ),
            Self::TestId(id) => format!(
                "document.querySelector({})",
                js_str(&format!("[data-testid=\"{id}\"]"))
            ),
            Self::Text(text) => format!(
                "(Array.from(document.querySelectorAll('body *')).find(el => el.children.length === 0 && el.textContent.includes({})) || null)",
                js_str(text)
            ),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.strategy(), self.value())
    }
}

/// Quote a string as a JavaScript string literal
fn js_str(value: &str) -> String {
    serde_json::Value::from(value).to_string()
}

/// An immutable descriptor of how to find one UI element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Locator {
    selector: Selector,
}

impl Locator {
    /// Locate by id attribute
    #[must_use]
    pub const fn id(value: &'static str) -> Self {
        Self::from_selector(Selector::Id(value))
    }

    /// Locate by a single class name
    #[must_use]
    pub const fn class_name(value: &'static str) -> Self {
        Self::from_selector(Selector::ClassName(value))
    }

    /// Locate by CSS selector
    #[must_use]
    pub const fn css(value: &'static str) -> Self {
        Self::from_selector(Selector::Css(value))
    }

    /// Locate by XPath expression
    #[must_use]
    pub const fn xpath(value: &'static str) -> Self {
        Self::from_selector(Selector::XPath(value))
    }

    /// Locate by `data-testid` attribute
    #[must_use]
    pub const fn test_id(value: &'static str) -> Self {
        Self::from_selector(Selector::TestId(value))
    }

    /// Locate the first leaf element containing the text
    #[must_use]
    pub const fn text(value: &'static str) -> Self {
        Self::from_selector(Selector::Text(value))
    }

    /// Create a locator from a selector
    #[must_use]
    pub const fn from_selector(selector: Selector) -> Self {
        Self { selector }
    }

    /// Get the selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.selector.fmt(f)
    }
}
