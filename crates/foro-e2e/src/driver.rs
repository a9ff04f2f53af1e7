//! Abstract automation-driver capability.
//!
//! The harness never talks to a browser directly: every interaction goes
//! through [`UiDriver`], a capability trait offering element lookup and
//! interaction primitives against a live session. The default
//! implementation is [`crate::session::CdpSession`] (behind the `browser`
//! feature); unit tests run against [`ScriptedDriver`], an in-memory
//! double whose elements appear and disappear on a configured timeline.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::locator::Locator;
use crate::result::{ForoError, ForoResult};

/// Handle to a located element.
///
/// The `id` is driver-scoped and opaque; a handle may go stale if the
/// element leaves the document between locate and interaction, in which
/// case driver commands report [`ForoError::StaleElement`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementHandle {
    /// Driver-scoped element identifier
    pub id: String,
    /// Text content snapshot at locate time, if the driver captured one
    pub text: Option<String>,
}

impl ElementHandle {
    /// Create a new handle
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: None,
        }
    }

    /// Attach a text snapshot
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// Browser session launch options
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Window width
    pub window_width: u32,
    /// Window height
    pub window_height: u32,
    /// Tolerate invalid TLS certificates (the forum runs on https://localhost)
    pub accept_invalid_certs: bool,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            headless: false,
            window_width: 1920,
            window_height: 1080,
            accept_invalid_certs: true,
            chromium_path: None,
            sandbox: true,
        }
    }
}

impl SessionConfig {
    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set window dimensions
    #[must_use]
    pub const fn with_window(mut self, width: u32, height: u32) -> Self {
        self.window_width = width;
        self.window_height = height;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

/// Abstract capability trait for browser automation.
///
/// All waits are bounded by the given timeout; no operation blocks
/// indefinitely. Locate methods distinguish presence (in the document),
/// visibility (rendered and shown) and clickability (visible, enabled,
/// not obscured).
#[async_trait]
pub trait UiDriver: Send + Sync {
    /// Navigate to a URL
    async fn navigate(&self, url: &str) -> ForoResult<()>;

    /// Wait until an element matching the locator is present in the document
    async fn locate_present(&self, locator: &Locator, timeout: Duration)
        -> ForoResult<ElementHandle>;

    /// Wait until an element matching the locator is visible
    async fn locate_visible(&self, locator: &Locator, timeout: Duration)
        -> ForoResult<ElementHandle>;

    /// Wait until an element matching the locator is clickable
    async fn locate_clickable(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> ForoResult<ElementHandle>;

    /// Wait until at least one match is present, then return all matches.
    ///
    /// Returns an empty vec if the timeout expires with no matches;
    /// absence is a valid, non-exceptional outcome for list views.
    async fn locate_all_present(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> ForoResult<Vec<ElementHandle>>;

    /// Click an element
    async fn click(&self, element: &ElementHandle) -> ForoResult<()>;

    /// Clear an input and type the given text into it
    async fn set_value(&self, element: &ElementHandle, text: &str) -> ForoResult<()>;

    /// Read an element's text content
    async fn get_text(&self, element: &ElementHandle) -> ForoResult<String>;

    /// Read an element attribute
    async fn get_attribute(&self, element: &ElementHandle, name: &str)
        -> ForoResult<Option<String>>;

    /// Move the pointer over an element (opens hover-driven menus)
    async fn hover(&self, element: &ElementHandle) -> ForoResult<()>;

    /// Current page URL
    async fn current_url(&self) -> ForoResult<String>;

    /// Wait until the URL contains the fragment; false if the timeout expires
    async fn wait_url_contains(&self, fragment: &str, timeout: Duration) -> ForoResult<bool>;

    /// Capture a PNG screenshot of the current page
    async fn screenshot(&self) -> ForoResult<Vec<u8>>;

    /// Release the session and its browser resources
    async fn close(&self) -> ForoResult<()>;
}

// ============================================================================
// Scripted driver for unit tests
// ============================================================================

/// Interval at which the scripted driver re-samples its timeline
const SCAN_INTERVAL: Duration = Duration::from_millis(25);

/// An element on the scripted driver's timeline.
///
/// Windows are offsets from driver construction; `None` bounds are open.
#[derive(Debug, Clone)]
pub struct ScriptedElement {
    /// Raw selector string this element answers to
    pub selector: String,
    /// Text content
    pub text: String,
    /// Attributes
    pub attributes: HashMap<String, String>,
    /// Whether the element accepts clicks
    pub clickable: bool,
    /// When the element exists in the document
    pub present_from: Duration,
    /// When the element leaves the document (None = never)
    pub present_until: Option<Duration>,
    /// When the element becomes visible
    pub visible_from: Duration,
    /// When the element is hidden again (None = never)
    pub visible_until: Option<Duration>,
    /// Report staleness on every text read (simulates vanish-between-locate-and-read)
    pub stale_reads: bool,
}

impl ScriptedElement {
    /// An always-present, always-visible, clickable element
    #[must_use]
    pub fn new(selector: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            text: text.into(),
            attributes: HashMap::new(),
            clickable: true,
            present_from: Duration::ZERO,
            present_until: None,
            visible_from: Duration::ZERO,
            visible_until: None,
            stale_reads: false,
        }
    }

    /// Restrict visibility to the window `[from, until)`
    #[must_use]
    pub const fn visible_between(mut self, from: Duration, until: Duration) -> Self {
        self.visible_from = from;
        self.visible_until = Some(until);
        self
    }

    /// Restrict presence to the window `[from, until)`
    #[must_use]
    pub const fn present_between(mut self, from: Duration, until: Duration) -> Self {
        self.present_from = from;
        self.present_until = Some(until);
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.attributes.insert(name.into(), value.into());
        self
    }

    /// Mark the element as not clickable
    #[must_use]
    pub const fn not_clickable(mut self) -> Self {
        self.clickable = false;
        self
    }

    /// Make every text read report staleness
    #[must_use]
    pub const fn with_stale_reads(mut self) -> Self {
        self.stale_reads = true;
        self
    }

    fn present_at(&self, now: Duration) -> bool {
        now >= self.present_from && self.present_until.map_or(true, |until| now < until)
    }

    fn visible_at(&self, now: Duration) -> bool {
        self.present_at(now)
            && now >= self.visible_from
            && self.visible_until.map_or(true, |until| now < until)
    }
}

#[derive(Debug, Default)]
struct ScriptedState {
    url: String,
    scheduled_url: Option<(Duration, String)>,
    elements: Vec<ScriptedElement>,
    inputs: HashMap<String, String>,
    clicks: Vec<String>,
    hovers: Vec<String>,
    screenshots: usize,
    closed: bool,
}

/// In-memory [`UiDriver`] whose elements follow a configured timeline.
///
/// Built for unit tests: element windows are offsets from construction,
/// interactions are recorded, and no real browser is involved. Combine
/// with `tokio::time::pause` for instant timing tests.
#[derive(Debug, Clone)]
pub struct ScriptedDriver {
    epoch: Instant,
    state: Arc<Mutex<ScriptedState>>,
}

impl Default for ScriptedDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedDriver {
    /// Create an empty scripted driver; the timeline starts now
    #[must_use]
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
            state: Arc::new(Mutex::new(ScriptedState::default())),
        }
    }

    /// Add an element to the timeline
    pub fn add_element(&self, element: ScriptedElement) {
        self.state.lock().elements.push(element);
    }

    /// Set the current URL immediately
    pub fn set_url(&self, url: impl Into<String>) {
        self.state.lock().url = url.into();
    }

    /// Change the URL once the given offset has elapsed
    pub fn schedule_url(&self, after: Duration, url: impl Into<String>) {
        self.state.lock().scheduled_url = Some((after, url.into()));
    }

    /// Selectors clicked so far, in order
    #[must_use]
    pub fn clicks(&self) -> Vec<String> {
        self.state.lock().clicks.clone()
    }

    /// Selectors hovered so far, in order
    #[must_use]
    pub fn hovers(&self) -> Vec<String> {
        self.state.lock().hovers.clone()
    }

    /// Last value typed into the element answering to `selector`
    #[must_use]
    pub fn input_value(&self, selector: &str) -> Option<String> {
        self.state.lock().inputs.get(selector).cloned()
    }

    /// Number of screenshots captured
    #[must_use]
    pub fn screenshot_count(&self) -> usize {
        self.state.lock().screenshots
    }

    /// Whether the session was released
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }

    fn tick(&self) {
        let now = self.now();
        let mut state = self.state.lock();
        if let Some((after, url)) = state.scheduled_url.clone() {
            if now >= after {
                state.url = url;
                state.scheduled_url = None;
            }
        }
    }

    /// Wait until the predicate yields a value, re-sampling the timeline
    /// every [`SCAN_INTERVAL`]. Always samples at least once, so a zero
    /// timeout still performs one direct scan.
    async fn wait_for<T>(
        &self,
        timeout: Duration,
        what: &str,
        pred: impl Fn(&ScriptedState, Duration) -> Option<T>,
    ) -> ForoResult<T> {
        let start = Instant::now();
        loop {
            self.tick();
            let now = self.now();
            {
                let state = self.state.lock();
                if let Some(value) = pred(&state, now) {
                    return Ok(value);
                }
            }
            if start.elapsed() >= timeout {
                return Err(ForoError::WaitTimeout {
                    what: what.to_string(),
                    ms: timeout.as_millis() as u64,
                });
            }
            tokio::time::sleep(SCAN_INTERVAL.min(timeout.saturating_sub(start.elapsed()))).await;
        }
    }

    fn handle_for(selector: &str, index: usize, element: &ScriptedElement) -> ElementHandle {
        ElementHandle::new(format!("{selector}#{index}")).with_text(element.text.clone())
    }

    /// Resolve a handle id back to its element, honoring the timeline
    fn resolve<'a>(
        state: &'a ScriptedState,
        now: Duration,
        id: &str,
    ) -> ForoResult<&'a ScriptedElement> {
        let (selector, index) = id.rsplit_once('#').ok_or_else(|| ForoError::Driver {
            message: format!("unknown element id: {id}"),
        })?;
        let index: usize = index.parse().map_err(|_| ForoError::Driver {
            message: format!("unknown element id: {id}"),
        })?;
        state
            .elements
            .iter()
            .filter(|e| e.selector == selector && e.present_at(now))
            .nth(index)
            .ok_or_else(|| ForoError::StaleElement {
                what: selector.to_string(),
            })
    }
}

#[async_trait]
impl UiDriver for ScriptedDriver {
    async fn navigate(&self, url: &str) -> ForoResult<()> {
        self.state.lock().url = url.to_string();
        Ok(())
    }

    async fn locate_present(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> ForoResult<ElementHandle> {
        let selector = locator.selector().as_str().to_string();
        self.wait_for(timeout, &locator.describe(), move |state, now| {
            state
                .elements
                .iter()
                .filter(|e| e.selector == selector && e.present_at(now))
                .enumerate()
                .next()
                .map(|(i, e)| Self::handle_for(&selector, i, e))
        })
        .await
    }

    async fn locate_visible(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> ForoResult<ElementHandle> {
        let selector = locator.selector().as_str().to_string();
        self.wait_for(timeout, &locator.describe(), move |state, now| {
            state
                .elements
                .iter()
                .filter(|e| e.selector == selector && e.present_at(now))
                .enumerate()
                .find(|(_, e)| e.visible_at(now))
                .map(|(i, e)| Self::handle_for(&selector, i, e))
        })
        .await
    }

    async fn locate_clickable(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> ForoResult<ElementHandle> {
        let selector = locator.selector().as_str().to_string();
        self.wait_for(timeout, &locator.describe(), move |state, now| {
            state
                .elements
                .iter()
                .filter(|e| e.selector == selector && e.present_at(now))
                .enumerate()
                .find(|(_, e)| e.visible_at(now) && e.clickable)
                .map(|(i, e)| Self::handle_for(&selector, i, e))
        })
        .await
    }

    async fn locate_all_present(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> ForoResult<Vec<ElementHandle>> {
        let selector = locator.selector().as_str().to_string();
        let found = self
            .wait_for(timeout, &locator.describe(), move |state, now| {
                let matches: Vec<ElementHandle> = state
                    .elements
                    .iter()
                    .filter(|e| e.selector == selector && e.present_at(now))
                    .enumerate()
                    .map(|(i, e)| Self::handle_for(&selector, i, e))
                    .collect();
                if matches.is_empty() {
                    None
                } else {
                    Some(matches)
                }
            })
            .await;
        match found {
            Ok(handles) => Ok(handles),
            Err(ForoError::WaitTimeout { .. }) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    async fn click(&self, element: &ElementHandle) -> ForoResult<()> {
        let now = self.now();
        let mut state = self.state.lock();
        let selector = Self::resolve(&state, now, &element.id)?.selector.clone();
        state.clicks.push(selector);
        Ok(())
    }

    async fn set_value(&self, element: &ElementHandle, text: &str) -> ForoResult<()> {
        let now = self.now();
        let mut state = self.state.lock();
        let selector = Self::resolve(&state, now, &element.id)?.selector.clone();
        // clear-then-type: the last write wins wholesale
        let _ = state.inputs.insert(selector, text.to_string());
        Ok(())
    }

    async fn get_text(&self, element: &ElementHandle) -> ForoResult<String> {
        self.tick();
        let now = self.now();
        let state = self.state.lock();
        let resolved = Self::resolve(&state, now, &element.id)?;
        if resolved.stale_reads {
            return Err(ForoError::StaleElement {
                what: resolved.selector.clone(),
            });
        }
        Ok(resolved.text.clone())
    }

    async fn get_attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> ForoResult<Option<String>> {
        let now = self.now();
        let state = self.state.lock();
        let resolved = Self::resolve(&state, now, &element.id)?;
        Ok(resolved.attributes.get(name).cloned())
    }

    async fn hover(&self, element: &ElementHandle) -> ForoResult<()> {
        let now = self.now();
        let mut state = self.state.lock();
        let selector = Self::resolve(&state, now, &element.id)?.selector.clone();
        state.hovers.push(selector);
        Ok(())
    }

    async fn current_url(&self) -> ForoResult<String> {
        self.tick();
        Ok(self.state.lock().url.clone())
    }

    async fn wait_url_contains(&self, fragment: &str, timeout: Duration) -> ForoResult<bool> {
        let fragment = fragment.to_string();
        let result = self
            .wait_for(timeout, &format!("url contains {fragment}"), move |state, _| {
                state.url.contains(&fragment).then_some(())
            })
            .await;
        match result {
            Ok(()) => Ok(true),
            Err(ForoError::WaitTimeout { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn screenshot(&self) -> ForoResult<Vec<u8>> {
        let mut state = self.state.lock();
        state.screenshots += 1;
        // minimal PNG header stand-in
        Ok(vec![0x89, 0x50, 0x4E, 0x47])
    }

    async fn close(&self) -> ForoResult<()> {
        self.state.lock().closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toast_locator() -> Locator {
        Locator::css("#dzq-toast-root > div > span").named("toast")
    }

    mod session_config_tests {
        use super::*;

        #[test]
        fn test_default() {
            let config = SessionConfig::default();
            assert!(!config.headless);
            assert_eq!(config.window_width, 1920);
            assert!(config.accept_invalid_certs);
            assert!(config.sandbox);
        }

        #[test]
        fn test_builder() {
            let config = SessionConfig::default()
                .with_headless(true)
                .with_window(800, 600)
                .with_no_sandbox()
                .with_chromium_path("/usr/bin/chromium");
            assert!(config.headless);
            assert_eq!((config.window_width, config.window_height), (800, 600));
            assert!(!config.sandbox);
            assert_eq!(config.chromium_path.as_deref(), Some("/usr/bin/chromium"));
        }
    }

    mod scripted_driver_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_locate_present_immediate() {
            let driver = ScriptedDriver::new();
            driver.add_element(ScriptedElement::new("#dzq-toast-root > div > span", "ok"));
            let handle = driver
                .locate_present(&toast_locator(), Duration::from_secs(1))
                .await
                .unwrap();
            assert_eq!(handle.text.as_deref(), Some("ok"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_locate_present_timeout() {
            let driver = ScriptedDriver::new();
            let err = driver
                .locate_present(&toast_locator(), Duration::from_millis(200))
                .await
                .unwrap_err();
            assert!(matches!(err, ForoError::WaitTimeout { .. }));
        }

        #[tokio::test(start_paused = true)]
        async fn test_locate_visible_waits_for_window() {
            let driver = ScriptedDriver::new();
            driver.add_element(
                ScriptedElement::new("#dzq-toast-root > div > span", "发布成功")
                    .visible_between(Duration::from_millis(300), Duration::from_secs(5)),
            );
            // present but not yet visible
            let err = driver
                .locate_visible(&toast_locator(), Duration::from_millis(100))
                .await
                .unwrap_err();
            assert!(matches!(err, ForoError::WaitTimeout { .. }));
            // becomes visible inside this wait
            let handle = driver
                .locate_visible(&toast_locator(), Duration::from_secs(1))
                .await
                .unwrap();
            assert_eq!(handle.text.as_deref(), Some("发布成功"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_locate_clickable_skips_disabled() {
            let driver = ScriptedDriver::new();
            driver.add_element(ScriptedElement::new("button", "提交").not_clickable());
            let err = driver
                .locate_clickable(&Locator::css("button"), Duration::from_millis(100))
                .await
                .unwrap_err();
            assert!(matches!(err, ForoError::WaitTimeout { .. }));
        }

        #[tokio::test(start_paused = true)]
        async fn test_locate_all_present_empty_on_timeout() {
            let driver = ScriptedDriver::new();
            let handles = driver
                .locate_all_present(&Locator::css(".comment"), Duration::from_millis(100))
                .await
                .unwrap();
            assert!(handles.is_empty());
        }

        #[tokio::test(start_paused = true)]
        async fn test_locate_all_present_returns_matches() {
            let driver = ScriptedDriver::new();
            driver.add_element(ScriptedElement::new(".comment", "first"));
            driver.add_element(ScriptedElement::new(".comment", "second"));
            let handles = driver
                .locate_all_present(&Locator::css(".comment"), Duration::ZERO)
                .await
                .unwrap();
            assert_eq!(handles.len(), 2);
        }

        #[tokio::test(start_paused = true)]
        async fn test_click_and_input_recorded() {
            let driver = ScriptedDriver::new();
            driver.add_element(ScriptedElement::new("input[name=q]", ""));
            let handle = driver
                .locate_present(&Locator::css("input[name=q]"), Duration::ZERO)
                .await
                .unwrap();
            driver.click(&handle).await.unwrap();
            driver.set_value(&handle, "hello").await.unwrap();
            assert_eq!(driver.clicks(), vec!["input[name=q]".to_string()]);
            assert_eq!(driver.input_value("input[name=q]").as_deref(), Some("hello"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_stale_read_after_presence_ends() {
            let driver = ScriptedDriver::new();
            driver.add_element(
                ScriptedElement::new("#dzq-toast-root > div > span", "gone soon")
                    .present_between(Duration::ZERO, Duration::from_millis(100)),
            );
            let handle = driver
                .locate_present(&toast_locator(), Duration::ZERO)
                .await
                .unwrap();
            tokio::time::sleep(Duration::from_millis(200)).await;
            let err = driver.get_text(&handle).await.unwrap_err();
            assert!(matches!(err, ForoError::StaleElement { .. }));
        }

        #[tokio::test(start_paused = true)]
        async fn test_scheduled_url_and_wait_contains() {
            let driver = ScriptedDriver::new();
            driver.set_url("about:blank");
            driver.schedule_url(Duration::from_millis(300), "https://localhost/thread/42");
            let start = Instant::now();
            assert!(driver
                .wait_url_contains("thread", Duration::from_secs(1))
                .await
                .unwrap());
            assert!(start.elapsed() >= Duration::from_millis(300));
        }

        #[tokio::test(start_paused = true)]
        async fn test_wait_url_contains_false_on_timeout() {
            let driver = ScriptedDriver::new();
            driver.set_url("https://localhost/user/register");
            assert!(!driver
                .wait_url_contains("thread", Duration::from_millis(100))
                .await
                .unwrap());
        }

        #[tokio::test(start_paused = true)]
        async fn test_close_marks_session_released() {
            let driver = ScriptedDriver::new();
            assert!(!driver.is_closed());
            driver.close().await.unwrap();
            assert!(driver.is_closed());
        }

        #[tokio::test(start_paused = true)]
        async fn test_attribute_lookup() {
            let driver = ScriptedDriver::new();
            driver.add_element(
                ScriptedElement::new("button", "注册").with_attribute("class", "btn is-disabled"),
            );
            let handle = driver
                .locate_present(&Locator::css("button"), Duration::ZERO)
                .await
                .unwrap();
            let class = driver.get_attribute(&handle, "class").await.unwrap();
            assert_eq!(class.as_deref(), Some("btn is-disabled"));
            assert!(driver.get_attribute(&handle, "id").await.unwrap().is_none());
        }
    }
}
