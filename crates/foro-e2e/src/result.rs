//! Result and error types for the harness.

use thiserror::Error;

/// Result type for harness operations
pub type ForoResult<T> = Result<T, ForoError>;

/// Errors that can occur while driving the forum UI
#[derive(Debug, Error)]
pub enum ForoError {
    /// Browser executable not found
    #[error("Browser not found. Install Chromium or set CHROMIUM_PATH")]
    BrowserNotFound,

    /// Browser session launch error
    #[error("Failed to launch browser session: {message}")]
    SessionLaunch {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// A bounded wait for element presence expired
    #[error("Element not found: {locator}")]
    ElementNotFound {
        /// Locator description
        locator: String,
    },

    /// A bounded wait for element interactability expired
    #[error("Element not interactable: {locator}")]
    ElementNotInteractable {
        /// Locator description
        locator: String,
    },

    /// A driver-level bounded wait expired
    #[error("Wait expired after {ms}ms: {what}")]
    WaitTimeout {
        /// What was waited for
        what: String,
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Element vanished between locate and interaction
    #[error("Stale element: {what}")]
    StaleElement {
        /// Element description
        what: String,
    },

    /// All bounded retry attempts reported a negative match
    #[error("Retry exhausted after {attempts} attempt(s); last toast: {}", .last_text.as_deref().unwrap_or("<none>"))]
    RetryExhausted {
        /// Total check invocations performed
        attempts: u32,
        /// Text observed on the final attempt, if any
        last_text: Option<String>,
    },

    /// Screenshot capture error
    #[error("Screenshot failed: {message}")]
    Screenshot {
        /// Error message
        message: String,
    },

    /// Driver command error (click, input, read)
    #[error("Driver command failed: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// Fixture error (setup/teardown failed)
    #[error("Fixture error: {message}")]
    Fixture {
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Config error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Store error
    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ForoError {
    /// Whether this error is a transient miss inside a poll loop.
    ///
    /// Slice-level wait expiry and staleness are absorbed by pollers and
    /// retried; everything else propagates.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::WaitTimeout { .. } | Self::StaleElement { .. } | Self::ElementNotFound { .. }
        )
    }
}
