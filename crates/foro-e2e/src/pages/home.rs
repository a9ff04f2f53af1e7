//! Forum home page.

use std::time::Duration;

use super::PageContext;
use crate::locator::Locator;
use crate::result::ForoResult;

/// Presence check for the logged-in dropdown is deliberately short
const LOGIN_STATE_TIMEOUT: Duration = Duration::from_secs(3);

/// Home page: entry points, thread list, user menu
#[derive(Debug, Clone)]
pub struct HomePage {
    ctx: PageContext,
    login_button: Locator,
    register_button: Locator,
    user_trigger: Locator,
    user_center: Locator,
    logout_button: Locator,
    post_button: Locator,
    thread_list: Locator,
}

impl HomePage {
    /// Create the page object over a context
    #[must_use]
    pub fn new(ctx: PageContext) -> Self {
        Self {
            ctx,
            login_button: Locator::css(
                "#__next > div > div > div > div > div > div> div > button:nth-child(1)",
            )
            .named("login button"),
            register_button: Locator::css(
                "#__next > div > div > div > div > div > div> div > button:nth-child(2)",
            )
            .named("register button"),
            user_trigger: Locator::css(
                "#__next > div > div > div > div > div > div > div.dzq-dropdown",
            )
            .named("user dropdown trigger"),
            user_center: Locator::css(
                "#__next > div > div > div> div > div > div> div > ul > li:nth-child(1)",
            )
            .named("user center entry"),
            logout_button: Locator::css(
                "#__next > div > div > div> div > div > div> div > ul > li:nth-child(2)",
            )
            .named("logout entry"),
            post_button: Locator::css(
                "#__next > div > div > div > div > div > div > div > div > div > div > button",
            )
            .named("post button"),
            thread_list: Locator::css(
                "#__next > div > div > div > div > div.list > div > div > div > div > div > div > div > h1",
            )
            .named("thread titles"),
        }
    }

    /// Open the home page
    pub async fn open_home(&self) -> ForoResult<()> {
        self.ctx.open("").await
    }

    /// Click the login entry button
    pub async fn click_login(&self) -> ForoResult<()> {
        self.ctx.accessor().click(&self.login_button, None).await
    }

    /// Click the register entry button
    pub async fn click_register(&self) -> ForoResult<()> {
        self.ctx.accessor().click(&self.register_button, None).await
    }

    /// Open the user dropdown by hovering its trigger
    pub async fn hover_user_trigger(&self) -> ForoResult<()> {
        self.ctx.accessor().hover(&self.user_trigger, None).await
    }

    /// Open the user center through the hover menu
    pub async fn click_user_center(&self) -> ForoResult<()> {
        self.hover_user_trigger().await?;
        self.ctx.accessor().click(&self.user_center, None).await
    }

    /// Log out through the hover menu
    pub async fn click_logout(&self) -> ForoResult<()> {
        self.hover_user_trigger().await?;
        self.ctx.accessor().click(&self.logout_button, None).await
    }

    /// Click the create-post button
    pub async fn click_post_button(&self) -> ForoResult<()> {
        self.ctx.accessor().click(&self.post_button, None).await
    }

    /// Click the nth thread in the list (0-based); no-op if absent
    pub async fn click_thread(&self, index: usize) -> ForoResult<()> {
        let threads = self.ctx.accessor().find_all(&self.thread_list, None).await?;
        if let Some(thread) = threads.get(index) {
            self.ctx.accessor().driver().click(thread).await?;
        }
        Ok(())
    }

    /// Whether a user menu is present, i.e. somebody is logged in
    pub async fn is_logged_in(&self) -> bool {
        self.ctx
            .accessor()
            .is_present(&self.user_trigger, Some(LOGIN_STATE_TIMEOUT))
            .await
    }

    /// Whether the thread list rendered at least one entry
    pub async fn is_thread_list_loaded(&self) -> ForoResult<bool> {
        Ok(!self
            .ctx
            .accessor()
            .find_all(&self.thread_list, None)
            .await?
            .is_empty())
    }
}
