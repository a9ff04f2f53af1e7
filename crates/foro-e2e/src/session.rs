//! Chromium-backed driver session.
//!
//! Real browser control via the Chrome DevTools Protocol using
//! chromiumoxide. Compiled only with the `browser` feature; unit tests use
//! [`crate::driver::ScriptedDriver`] instead.
//!
//! A [`CdpSession`] owns the launched browser, the single page the suite
//! drives, and the CDP event-handler task. Sessions are scoped resources:
//! fixtures call [`CdpSession::close`] unconditionally, test outcome or
//! not, so the browser process is always released.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, CaptureScreenshotParams,
};
use chromiumoxide::element::Element as CdpElement;
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use parking_lot::Mutex;
use tokio::time::Instant;

use crate::driver::{ElementHandle, SessionConfig, UiDriver};
use crate::locator::{Locator, Selector};
use crate::result::{ForoError, ForoResult};

/// Interval between location attempts against the live page
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A live Chromium session implementing the driver capability
pub struct CdpSession {
    config: SessionConfig,
    browser: tokio::sync::Mutex<CdpBrowser>,
    page: CdpPage,
    #[allow(dead_code)]
    handler: tokio::task::JoinHandle<()>,
    elements: Mutex<ElementRegistry>,
}

#[derive(Default)]
struct ElementRegistry {
    by_id: HashMap<String, Arc<CdpElement>>,
    next_id: u64,
}

impl ElementRegistry {
    fn register(&mut self, element: CdpElement) -> String {
        self.next_id += 1;
        let id = format!("el-{}", self.next_id);
        let _ = self.by_id.insert(id.clone(), Arc::new(element));
        id
    }
}

impl std::fmt::Debug for CdpSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CdpSession")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl CdpSession {
    /// Launch a browser and open a blank page.
    ///
    /// # Errors
    ///
    /// Returns [`ForoError::SessionLaunch`] if the browser cannot be
    /// started or the initial page cannot be created.
    pub async fn launch(config: SessionConfig) -> ForoResult<Self> {
        let mut builder = CdpConfig::builder()
            .window_size(config.window_width, config.window_height)
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu");

        if !config.headless {
            builder = builder.with_head();
        }

        if !config.sandbox {
            builder = builder.no_sandbox();
        }

        if config.accept_invalid_certs {
            builder = builder
                .arg("--ignore-certificate-errors")
                .arg("--allow-insecure-localhost");
        }

        if let Some(ref path) = config.chromium_path {
            builder = builder.chrome_executable(path);
        }

        let cdp_config = builder.build().map_err(|e| ForoError::SessionLaunch {
            message: e.to_string(),
        })?;

        let (browser, mut handler) =
            CdpBrowser::launch(cdp_config)
                .await
                .map_err(|e| ForoError::SessionLaunch {
                    message: e.to_string(),
                })?;

        let handle = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ForoError::SessionLaunch {
                message: e.to_string(),
            })?;

        tracing::info!(headless = config.headless, "browser session launched");

        Ok(Self {
            config,
            browser: tokio::sync::Mutex::new(browser),
            page,
            handler: handle,
            elements: Mutex::new(ElementRegistry::default()),
        })
    }

    /// The launch options this session was created with
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    async fn find_one(&self, locator: &Locator) -> Option<CdpElement> {
        match locator.selector() {
            Selector::Css(css) => self.page.find_element(css.as_str()).await.ok(),
            Selector::XPath(xpath) => self.page.find_xpath(xpath.as_str()).await.ok(),
        }
    }

    async fn find_many(&self, locator: &Locator) -> Vec<CdpElement> {
        match locator.selector() {
            Selector::Css(css) => self
                .page
                .find_elements(css.as_str())
                .await
                .unwrap_or_default(),
            Selector::XPath(xpath) => self
                .page
                .find_xpaths(xpath.as_str())
                .await
                .unwrap_or_default(),
        }
    }

    /// Rendered and on screen: the element resolves to a clickable point
    async fn is_visible(element: &CdpElement) -> bool {
        element.clickable_point().await.is_ok()
    }

    async fn is_clickable(element: &CdpElement) -> bool {
        if !Self::is_visible(element).await {
            return false;
        }
        // forms mark unavailable controls with the disabled attribute
        !matches!(element.attribute("disabled").await, Ok(Some(_)))
    }

    fn register(&self, element: CdpElement) -> ElementHandle {
        ElementHandle::new(self.elements.lock().register(element))
    }

    fn lookup(&self, handle: &ElementHandle) -> ForoResult<Arc<CdpElement>> {
        self.elements
            .lock()
            .by_id
            .get(&handle.id)
            .cloned()
            .ok_or_else(|| ForoError::Driver {
                message: format!("unknown element handle: {}", handle.id),
            })
    }

    /// Poll the page for an element passing `accept` until the deadline.
    async fn locate_where<F, Fut>(
        &self,
        locator: &Locator,
        timeout: Duration,
        accept: F,
    ) -> ForoResult<ElementHandle>
    where
        F: Fn(CdpElement) -> Fut,
        Fut: std::future::Future<Output = Option<CdpElement>>,
    {
        let start = Instant::now();
        loop {
            if let Some(element) = self.find_one(locator).await {
                if let Some(element) = accept(element).await {
                    return Ok(self.register(element));
                }
            }
            if start.elapsed() >= timeout {
                return Err(ForoError::WaitTimeout {
                    what: locator.describe(),
                    ms: timeout.as_millis() as u64,
                });
            }
            tokio::time::sleep(POLL_INTERVAL.min(timeout.saturating_sub(start.elapsed()))).await;
        }
    }
}

#[async_trait]
impl UiDriver for CdpSession {
    async fn navigate(&self, url: &str) -> ForoResult<()> {
        self.page
            .goto(url)
            .await
            .map_err(|e| ForoError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn locate_present(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> ForoResult<ElementHandle> {
        self.locate_where(locator, timeout, |e| async move { Some(e) })
            .await
    }

    async fn locate_visible(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> ForoResult<ElementHandle> {
        self.locate_where(locator, timeout, |e| async move {
            if Self::is_visible(&e).await {
                Some(e)
            } else {
                None
            }
        })
        .await
    }

    async fn locate_clickable(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> ForoResult<ElementHandle> {
        self.locate_where(locator, timeout, |e| async move {
            if Self::is_clickable(&e).await {
                Some(e)
            } else {
                None
            }
        })
        .await
    }

    async fn locate_all_present(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> ForoResult<Vec<ElementHandle>> {
        let start = Instant::now();
        loop {
            let found = self.find_many(locator).await;
            if !found.is_empty() {
                return Ok(found.into_iter().map(|e| self.register(e)).collect());
            }
            if start.elapsed() >= timeout {
                return Ok(Vec::new());
            }
            tokio::time::sleep(POLL_INTERVAL.min(timeout.saturating_sub(start.elapsed()))).await;
        }
    }

    async fn click(&self, element: &ElementHandle) -> ForoResult<()> {
        let cdp = self.lookup(element)?;
        cdp.click().await.map_err(|e| ForoError::StaleElement {
            what: format!("{} ({e})", element.id),
        })?;
        Ok(())
    }

    async fn set_value(&self, element: &ElementHandle, text: &str) -> ForoResult<()> {
        let cdp = self.lookup(element)?;
        // click to focus, select-all + type replaces any existing value
        cdp.click().await.map_err(|e| ForoError::StaleElement {
            what: format!("{} ({e})", element.id),
        })?;
        cdp.call_js_fn("function() { if ('value' in this) { this.value = ''; } else { this.textContent = ''; } }", false)
            .await
            .map_err(|e| ForoError::Driver {
                message: format!("clear failed: {e}"),
            })?;
        cdp.type_str(text).await.map_err(|e| ForoError::Driver {
            message: format!("type failed: {e}"),
        })?;
        Ok(())
    }

    async fn get_text(&self, element: &ElementHandle) -> ForoResult<String> {
        let cdp = self.lookup(element)?;
        let text = cdp
            .inner_text()
            .await
            .map_err(|e| ForoError::StaleElement {
                what: format!("{} ({e})", element.id),
            })?;
        Ok(text.unwrap_or_default())
    }

    async fn get_attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> ForoResult<Option<String>> {
        let cdp = self.lookup(element)?;
        cdp.attribute(name)
            .await
            .map_err(|e| ForoError::StaleElement {
                what: format!("{} ({e})", element.id),
            })
    }

    async fn hover(&self, element: &ElementHandle) -> ForoResult<()> {
        let cdp = self.lookup(element)?;
        let point = cdp
            .clickable_point()
            .await
            .map_err(|e| ForoError::StaleElement {
                what: format!("{} ({e})", element.id),
            })?;
        self.page
            .move_mouse(point)
            .await
            .map_err(|e| ForoError::Driver {
                message: format!("hover failed: {e}"),
            })?;
        Ok(())
    }

    async fn current_url(&self) -> ForoResult<String> {
        let url = self.page.url().await.map_err(|e| ForoError::Driver {
            message: e.to_string(),
        })?;
        Ok(url.unwrap_or_default())
    }

    async fn wait_url_contains(&self, fragment: &str, timeout: Duration) -> ForoResult<bool> {
        let start = Instant::now();
        loop {
            if self.current_url().await?.contains(fragment) {
                return Ok(true);
            }
            if start.elapsed() >= timeout {
                return Ok(false);
            }
            tokio::time::sleep(POLL_INTERVAL.min(timeout.saturating_sub(start.elapsed()))).await;
        }
    }

    async fn screenshot(&self) -> ForoResult<Vec<u8>> {
        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();

        let shot = self
            .page
            .execute(params)
            .await
            .map_err(|e| ForoError::Screenshot {
                message: e.to_string(),
            })?;

        use base64::Engine;
        base64::engine::general_purpose::STANDARD
            .decode(&shot.data)
            .map_err(|e| ForoError::Screenshot {
                message: e.to_string(),
            })
    }

    async fn close(&self) -> ForoResult<()> {
        let mut browser = self.browser.lock().await;
        browser
            .close()
            .await
            .map_err(|e| ForoError::SessionLaunch {
                message: e.to_string(),
            })?;
        tracing::info!("browser session released");
        Ok(())
    }
}
