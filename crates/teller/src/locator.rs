//! Locator abstraction for element selection.
//!
//! A [`Locator`] is an element reference: a selector plus the scope it is
//! evaluated in. Nothing is resolved when a locator is built; every
//! operation performed through a driver re-resolves it against the live
//! document.
//!
//! # Design Philosophy
//!
//! - **Lazy**: locators are plain data, cheap to clone and store in page objects
//! - **Composable scopes**: `nth()` and `descendant()` turn a row selector into
//!   cell references without materializing any handle
//! - **Engine-neutral**: the same selector renders to a JavaScript element query
//!   for CDP and is interpreted directly by the simulator

use serde::{Deserialize, Serialize};
use std::fmt;

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// CSS selector (e.g., `button[ng-click="home()"]`)
    Css(String),
    /// CSS selector filtered to elements whose text contains `text`
    CssWithText {
        /// Base CSS selector
        css: String,
        /// Text content to match
        text: String,
    },
    /// The `index`-th match (zero based) of another selector
    Nth {
        /// Selector being indexed
        base: Box<Selector>,
        /// Zero-based index
        index: usize,
    },
    /// CSS matches scoped under every match of another selector
    Descendant {
        /// Scope selector
        base: Box<Selector>,
        /// CSS selector evaluated inside each scope element
        css: String,
    },
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create a CSS selector with a text filter
    #[must_use]
    pub fn css_with_text(css: impl Into<String>, text: impl Into<String>) -> Self {
        Self::CssWithText {
            css: css.into(),
            text: text.into(),
        }
    }

    /// JavaScript expression evaluating to the array of matched elements,
    /// in document order.
    #[must_use]
    pub fn to_elements_query(&self) -> String {
        match self {
            Self::Css(css) => format!("Array.from(document.querySelectorAll({}))", js_string(css)),
            Self::CssWithText { css, text } => format!(
                "Array.from(document.querySelectorAll({})).filter(el => (el.textContent || '').includes({}))",
                js_string(css),
                js_string(text)
            ),
            Self::Nth { base, index } => {
                format!("[({})[{index}]].filter(Boolean)", base.to_elements_query())
            }
            Self::Descendant { base, css } => format!(
                "({}).flatMap(el => Array.from(el.querySelectorAll({})))",
                base.to_elements_query(),
                js_string(css)
            ),
        }
    }

    /// JavaScript expression counting matches
    #[must_use]
    pub fn to_count_query(&self) -> String {
        format!("({}).length", self.to_elements_query())
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(css) => write!(f, "{css}"),
            Self::CssWithText { css, text } => write!(f, "{css}:has-text({text:?})"),
            Self::Nth { base, index } => write!(f, "{base} >> nth={index}"),
            Self::Descendant { base, css } => write!(f, "{base} >> {css}"),
        }
    }
}

/// Render a Rust string as a JavaScript string literal
fn js_string(s: &str) -> String {
    serde_json::Value::from(s).to_string()
}

/// A deferred reference to zero or more elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    selector: Selector,
}

impl Locator {
    /// Create a new locator with a CSS selector
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self::from_selector(Selector::Css(selector.into()))
    }

    /// Create a locator from a selector
    #[must_use]
    pub const fn from_selector(selector: Selector) -> Self {
        Self { selector }
    }

    /// Reference the `index`-th match (zero based)
    #[must_use]
    pub fn nth(&self, index: usize) -> Self {
        Self {
            selector: Selector::Nth {
                base: Box::new(self.selector.clone()),
                index,
            },
        }
    }

    /// Reference CSS matches inside this locator's matches
    #[must_use]
    pub fn descendant(&self, css: impl Into<String>) -> Self {
        Self {
            selector: Selector::Descendant {
                base: Box::new(self.selector.clone()),
                css: css.into(),
            },
        }
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

/// Bounding box for an element
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// X position
    pub x: f64,
    /// Y position
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl BoundingBox {
    /// Create a new bounding box
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Check whether this box lies entirely above another one
    #[must_use]
    pub fn is_above(&self, other: &Self) -> bool {
        self.y < other.y
    }
}
