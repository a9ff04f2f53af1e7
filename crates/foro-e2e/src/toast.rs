//! Transient toast-notification polling.
//!
//! The forum surfaces success/error feedback in a short-lived toast that
//! is not synchronized with the triggering action and can render and
//! disappear faster than a single fixed wait samples. A single long wait
//! therefore risks missing it entirely: the driver's visibility check
//! samples at its own polling granularity, not continuously.
//!
//! [`ToastPoller::observe`] breaks the total timeout into short slices
//! with a bounded visibility wait per slice, then performs one final
//! unconditional presence sweep, maximizing the chance of catching the
//! element at some instant of its visible lifetime at the cost of up to
//! [`MAX_ATTEMPTS`] driver round-trips. Absence is an expected,
//! assertable outcome and is returned as a negative observation, never an
//! error.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::diag::DiagnosticSink;
use crate::driver::UiDriver;
use crate::locator::Locator;
use crate::result::ForoResult;

/// Selector of the toast message span in the forum UI
pub const TOAST_SELECTOR: &str = "#dzq-toast-root > div > span";

/// Maximum poll slices per observation
pub const MAX_ATTEMPTS: u32 = 10;

/// Upper bound on a single poll slice
pub const MAX_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Default total observation timeout
pub const DEFAULT_TOAST_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of one toast observation.
///
/// `matched` is true only if text was observed and (when an expectation
/// was given) contains the expected substring. Produced fresh on every
/// call, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastObservation {
    /// Whether the observed text satisfied the expectation
    pub matched: bool,
    /// The text that was observed, if any
    pub text: Option<String>,
}

impl ToastObservation {
    /// The terminal negative: nothing was ever observed
    #[must_use]
    pub const fn not_found() -> Self {
        Self {
            matched: false,
            text: None,
        }
    }

    /// Evaluate observed text against an optional expected substring
    #[must_use]
    pub fn evaluate(expected: Option<&str>, text: String) -> Self {
        let matched = expected.map_or(true, |needle| text.contains(needle));
        Self {
            matched,
            text: Some(text),
        }
    }
}

/// Polls the driver for the short-lived toast element
#[derive(Clone)]
pub struct ToastPoller {
    driver: Arc<dyn UiDriver>,
    locator: Locator,
    sink: Arc<dyn DiagnosticSink>,
}

impl std::fmt::Debug for ToastPoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToastPoller")
            .field("locator", &self.locator)
            .finish_non_exhaustive()
    }
}

impl ToastPoller {
    /// Create a poller for the standard toast locator
    #[must_use]
    pub fn new(driver: Arc<dyn UiDriver>, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            driver,
            locator: Locator::css(TOAST_SELECTOR).named("toast"),
            sink,
        }
    }

    /// Use a non-standard toast locator
    #[must_use]
    pub fn with_locator(mut self, locator: Locator) -> Self {
        self.locator = locator;
        self
    }

    /// Observe the toast, evaluating its text against `expected`.
    ///
    /// Runs up to [`MAX_ATTEMPTS`] visibility waits of
    /// `min(total_timeout / MAX_ATTEMPTS, 500ms)` each while elapsed time
    /// stays under `total_timeout`, then one direct presence sweep over
    /// all candidates with per-candidate read errors ignored. Slice-level
    /// wait expiry and staleness are swallowed as transient misses; any
    /// other driver failure propagates.
    ///
    /// # Errors
    ///
    /// Only non-transient driver failures (session loss, protocol errors)
    /// are returned; a toast that never appears yields
    /// `Ok(ToastObservation::not_found())`.
    pub async fn observe(
        &self,
        expected: Option<&str>,
        total_timeout: Duration,
    ) -> ForoResult<ToastObservation> {
        let poll_interval = (total_timeout / MAX_ATTEMPTS).min(MAX_POLL_INTERVAL);
        let start = Instant::now();

        for attempt in 0..MAX_ATTEMPTS {
            if start.elapsed() >= total_timeout {
                break;
            }

            match self.sample(poll_interval).await {
                Ok(text) if !text.is_empty() => {
                    tracing::debug!(attempt, text = %text, "toast sampled");
                    self.capture(&format!("toast_found_{attempt}")).await;
                    return Ok(ToastObservation::evaluate(expected, text));
                }
                // rendered with no text yet: burn the attempt, re-sample at once
                Ok(_) => {}
                Err(e) if e.is_transient() => {
                    if start.elapsed() > total_timeout {
                        break;
                    }
                    tokio::time::sleep(poll_interval).await;
                }
                Err(e) => return Err(e),
            }
        }

        // The toast may exist in the document without having passed a
        // visibility wait; scan everything once, tolerating candidates
        // that vanish between indexing and read.
        if let Ok(candidates) = self
            .driver
            .locate_all_present(&self.locator, Duration::ZERO)
            .await
        {
            for candidate in candidates {
                if let Ok(text) = self.driver.get_text(&candidate).await {
                    if !text.is_empty() {
                        tracing::debug!(text = %text, "toast recovered by final sweep");
                        return Ok(ToastObservation::evaluate(expected, text));
                    }
                }
            }
        }

        tracing::debug!(timeout_ms = total_timeout.as_millis() as u64, "toast not observed");
        self.capture("toast_not_found").await;
        Ok(ToastObservation::not_found())
    }

    /// One poll slice: bounded visibility wait, then a fresh text read
    async fn sample(&self, slice: Duration) -> ForoResult<String> {
        let handle = self.driver.locate_visible(&self.locator, slice).await?;
        self.driver.get_text(&handle).await
    }

    async fn capture(&self, tag: &str) {
        match self.driver.screenshot().await {
            Ok(png) => self.sink.capture(tag, &png),
            Err(e) => tracing::warn!(tag, error = %e, "diagnostic screenshot failed"),
        }
    }
}
