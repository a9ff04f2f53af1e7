//! Element accessor: bounded-wait resolution of locators to live elements.
//!
//! UI rendering is asynchronous relative to driver commands, so every
//! lookup is a bounded wait. The accessor maps driver-level wait expiry to
//! the caller-facing taxonomy: presence waits fail with
//! [`ForoError::ElementNotFound`], interactability waits with
//! [`ForoError::ElementNotInteractable`], and `find_all` treats absence as
//! a valid empty result.

use std::sync::Arc;
use std::time::Duration;

use crate::driver::{ElementHandle, UiDriver};
use crate::locator::Locator;
use crate::result::{ForoError, ForoResult};

/// Default element wait, matching the forum suite's base timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Resolves locators against a driver with bounded waits
#[derive(Clone)]
pub struct ElementAccessor {
    driver: Arc<dyn UiDriver>,
    timeout: Duration,
}

impl std::fmt::Debug for ElementAccessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementAccessor")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl ElementAccessor {
    /// Create an accessor with the default timeout
    #[must_use]
    pub fn new(driver: Arc<dyn UiDriver>) -> Self {
        Self {
            driver,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the default timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The default timeout applied when a call passes `None`
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The underlying driver
    #[must_use]
    pub fn driver(&self) -> &Arc<dyn UiDriver> {
        &self.driver
    }

    fn effective(&self, timeout: Option<Duration>) -> Duration {
        timeout.unwrap_or(self.timeout)
    }

    /// Wait for an element to be present.
    ///
    /// # Errors
    ///
    /// [`ForoError::ElementNotFound`] if the timeout expires first.
    pub async fn find(
        &self,
        locator: &Locator,
        timeout: Option<Duration>,
    ) -> ForoResult<ElementHandle> {
        self.driver
            .locate_present(locator, self.effective(timeout))
            .await
            .map_err(|e| match e {
                ForoError::WaitTimeout { .. } => ForoError::ElementNotFound {
                    locator: locator.describe(),
                },
                other => other,
            })
    }

    /// Wait for elements to be present; empty on timeout, never an error
    pub async fn find_all(
        &self,
        locator: &Locator,
        timeout: Option<Duration>,
    ) -> ForoResult<Vec<ElementHandle>> {
        self.driver
            .locate_all_present(locator, self.effective(timeout))
            .await
    }

    /// Wait for an element to be interactable.
    ///
    /// # Errors
    ///
    /// [`ForoError::ElementNotInteractable`] if the timeout expires first.
    pub async fn find_clickable(
        &self,
        locator: &Locator,
        timeout: Option<Duration>,
    ) -> ForoResult<ElementHandle> {
        self.driver
            .locate_clickable(locator, self.effective(timeout))
            .await
            .map_err(|e| match e {
                ForoError::WaitTimeout { .. } => ForoError::ElementNotInteractable {
                    locator: locator.describe(),
                },
                other => other,
            })
    }

    /// Wait for the element and click it
    pub async fn click(&self, locator: &Locator, timeout: Option<Duration>) -> ForoResult<()> {
        let element = self.find_clickable(locator, timeout).await?;
        self.driver.click(&element).await
    }

    /// Wait for the element, clear it, and type the text
    pub async fn input_text(
        &self,
        locator: &Locator,
        text: &str,
        timeout: Option<Duration>,
    ) -> ForoResult<()> {
        let element = self.find(locator, timeout).await?;
        self.driver.set_value(&element, text).await
    }

    /// Wait for the element and move the pointer over it
    pub async fn hover(&self, locator: &Locator, timeout: Option<Duration>) -> ForoResult<()> {
        let element = self.find(locator, timeout).await?;
        self.driver.hover(&element).await
    }

    /// Whether an element is present within the timeout
    pub async fn is_present(&self, locator: &Locator, timeout: Option<Duration>) -> bool {
        self.find(locator, timeout).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{ScriptedDriver, ScriptedElement};

    fn accessor_over(driver: &ScriptedDriver) -> ElementAccessor {
        ElementAccessor::new(Arc::new(driver.clone())).with_timeout(Duration::from_millis(200))
    }

    #[tokio::test(start_paused = true)]
    async fn test_find_maps_timeout_to_not_found() {
        let driver = ScriptedDriver::new();
        let accessor = accessor_over(&driver);
        let err = accessor
            .find(&Locator::css("#missing").named("missing element"), None)
            .await
            .unwrap_err();
        match err {
            ForoError::ElementNotFound { locator } => assert_eq!(locator, "missing element"),
            other => panic!("expected ElementNotFound, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_find_clickable_maps_timeout_to_not_interactable() {
        let driver = ScriptedDriver::new();
        driver.add_element(ScriptedElement::new("button", "提交").not_clickable());
        let accessor = accessor_over(&driver);
        let err = accessor
            .find_clickable(&Locator::css("button"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ForoError::ElementNotInteractable { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_find_all_zero_matches_returns_empty() {
        let driver = ScriptedDriver::new();
        let accessor = accessor_over(&driver);
        let handles = accessor.find_all(&Locator::css(".thread"), None).await.unwrap();
        assert!(handles.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_click_drives_driver() {
        let driver = ScriptedDriver::new();
        driver.add_element(ScriptedElement::new("button", "发布"));
        let accessor = accessor_over(&driver);
        accessor.click(&Locator::css("button"), None).await.unwrap();
        assert_eq!(driver.clicks(), vec!["button".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_input_text_clears_then_types() {
        let driver = ScriptedDriver::new();
        driver.add_element(ScriptedElement::new("input", "old value"));
        let accessor = accessor_over(&driver);
        accessor
            .input_text(&Locator::css("input"), "new value", None)
            .await
            .unwrap();
        assert_eq!(driver.input_value("input").as_deref(), Some("new value"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_explicit_timeout_overrides_default() {
        let driver = ScriptedDriver::new();
        driver.add_element(
            ScriptedElement::new("#late", "eventually").present_between(
                Duration::from_millis(400),
                Duration::from_secs(60),
            ),
        );
        let accessor = accessor_over(&driver);
        // default 200ms misses it; explicit 1s catches it
        assert!(accessor.find(&Locator::css("#late"), None).await.is_err());
        assert!(accessor
            .find(&Locator::css("#late"), Some(Duration::from_secs(1)))
            .await
            .is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_is_present() {
        let driver = ScriptedDriver::new();
        driver.add_element(ScriptedElement::new(".dzq-dropdown", ""));
        let accessor = accessor_over(&driver);
        assert!(accessor.is_present(&Locator::css(".dzq-dropdown"), None).await);
        assert!(!accessor.is_present(&Locator::css(".gone"), None).await);
    }
}
