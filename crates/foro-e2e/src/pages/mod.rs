//! Page flow objects.
//!
//! Each page object composes accessor operations into named user actions
//! (login, register, post, comment, …) and exposes query predicates read
//! from element text and attributes. Locators are defined at construction
//! and live for the page object's lifetime; there is no other state.

mod home;
mod login;
mod message;
mod post;
mod register;
mod thread;
mod user;

pub use home::HomePage;
pub use login::LoginPage;
pub use message::MessagePage;
pub use post::{Category, PostPage};
pub use register::RegisterPage;
pub use thread::ThreadPage;
pub use user::UserPage;

use std::sync::Arc;
use std::time::Duration;

use crate::accessor::ElementAccessor;
use crate::config::SuiteConfig;
use crate::diag::DiagnosticSink;
use crate::driver::UiDriver;
use crate::result::ForoResult;
use crate::toast::{ToastObservation, ToastPoller};

/// Timeout for redirect checks after a submitting action
pub const REDIRECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Disabled submit buttons carry this class fragment
pub(crate) const DISABLED_CLASS: &str = "is-disabled";

/// Shared wiring for page objects: driver access, base URL, toast polling
#[derive(Debug, Clone)]
pub struct PageContext {
    accessor: ElementAccessor,
    toast: ToastPoller,
    base_url: String,
    toast_timeout: Duration,
}

impl PageContext {
    /// Create a context over a driver with the suite's config and sink
    #[must_use]
    pub fn new(
        driver: Arc<dyn UiDriver>,
        config: &SuiteConfig,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            accessor: ElementAccessor::new(driver.clone()).with_timeout(config.element_timeout()),
            toast: ToastPoller::new(driver, sink),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            toast_timeout: config.toast_timeout(),
        }
    }

    /// Navigate to a path under the forum root
    pub async fn open(&self, path: &str) -> ForoResult<()> {
        self.accessor
            .driver()
            .navigate(&format!("{}/{path}", self.base_url))
            .await
    }

    /// The accessor for element operations
    #[must_use]
    pub const fn accessor(&self) -> &ElementAccessor {
        &self.accessor
    }

    /// Root URL of the forum under test
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Observe the toast against an optional expected substring
    pub async fn check_toast(&self, expected: Option<&str>) -> ForoResult<ToastObservation> {
        self.toast.observe(expected, self.toast_timeout).await
    }

    /// Whether the URL comes to contain the fragment within the redirect window
    pub async fn wait_url_contains(&self, fragment: &str) -> ForoResult<bool> {
        self.accessor
            .driver()
            .wait_url_contains(fragment, REDIRECT_TIMEOUT)
            .await
    }

    /// Current page URL
    pub async fn current_url(&self) -> ForoResult<String> {
        self.accessor.driver().current_url().await
    }
}
