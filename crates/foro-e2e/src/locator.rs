//! Locator abstraction for element selection.
//!
//! A [`Locator`] is an opaque descriptor (selector strategy + selector
//! string) identifying zero or more elements in the current page. Locators
//! are immutable and defined once per page-flow object; they carry a short
//! diagnostic name so failures read as "register button" rather than a
//! 200-character CSS path.

/// Selector strategy for locating elements
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// CSS selector (e.g. `button.primary`)
    Css(String),
    /// XPath selector
    XPath(String),
}

impl Selector {
    /// The raw selector string
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Css(s) | Self::XPath(s) => s,
        }
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Css(s) => write!(f, "css={s}"),
            Self::XPath(s) => write!(f, "xpath={s}"),
        }
    }
}

/// A locator for finding elements in the rendered page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    selector: Selector,
    name: Option<String>,
}

impl Locator {
    /// Create a CSS locator
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self {
            selector: Selector::Css(selector.into()),
            name: None,
        }
    }

    /// Create an XPath locator
    #[must_use]
    pub fn xpath(selector: impl Into<String>) -> Self {
        Self {
            selector: Selector::XPath(selector.into()),
            name: None,
        }
    }

    /// Attach a diagnostic name used in error messages
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Get the selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Diagnostic description: the name if set, the selector otherwise
    #[must_use]
    pub fn describe(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.selector.to_string())
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.describe())
    }
}
