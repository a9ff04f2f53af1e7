//! Other-user profile page: follow, block, message entry.

use super::PageContext;
use crate::locator::Locator;
use crate::result::ForoResult;

/// Follow button label once following
const FOLLOWING_LABEL: &str = "已关注";

/// Block button label once blocking
const BLOCKING_LABEL: &str = "解除屏蔽";

/// User profile page flows
#[derive(Debug, Clone)]
pub struct UserPage {
    ctx: PageContext,
    follow_button: Locator,
    follow_label: Locator,
    block_button: Locator,
    block_label: Locator,
    send_message_button: Locator,
}

impl UserPage {
    /// Create the page object over a context
    #[must_use]
    pub fn new(ctx: PageContext) -> Self {
        let follow_css = "#__next > div > div > div > div > div > div > div:nth-child(1) > div > div > div > div > div > div> div > div> div> div> button:nth-child(1)";
        Self {
            ctx,
            follow_button: Locator::css(follow_css).named("follow button"),
            follow_label: Locator::css(format!("{follow_css} > span")).named("follow label"),
            block_button: Locator::xpath("//span[contains(text(),'屏蔽')]/..").named("block button"),
            block_label: Locator::xpath("//span[contains(text(),'屏蔽')]").named("block label"),
            send_message_button: Locator::css(
                "#__next > div > div > div > div > div > div > div:nth-child(1) > div > div > div > div > div > div> div > div> div> div> button:nth-child(2)",
            )
            .named("send message button"),
        }
    }

    /// Open a user's profile by id
    pub async fn open_user_page(&self, user_id: u64) -> ForoResult<()> {
        self.ctx.open(&format!("user/{user_id}")).await
    }

    /// Click the follow toggle
    pub async fn click_follow_button(&self) -> ForoResult<()> {
        self.ctx.accessor().click(&self.follow_button, None).await
    }

    /// Click the block toggle
    pub async fn click_block_button(&self) -> ForoResult<()> {
        self.ctx.accessor().click(&self.block_button, None).await
    }

    /// Click the send-message entry
    pub async fn click_send_message_button(&self) -> ForoResult<()> {
        self.ctx
            .accessor()
            .click(&self.send_message_button, None)
            .await
    }

    /// Current label of the follow toggle
    pub async fn get_follow_button_text(&self) -> ForoResult<String> {
        let label = self.ctx.accessor().find(&self.follow_label, None).await?;
        self.ctx.accessor().driver().get_text(&label).await
    }

    /// Current label of the block toggle
    pub async fn get_block_button_text(&self) -> ForoResult<String> {
        let label = self.ctx.accessor().find(&self.block_label, None).await?;
        self.ctx.accessor().driver().get_text(&label).await
    }

    /// Whether this user is currently followed
    pub async fn is_following(&self) -> ForoResult<bool> {
        Ok(self.get_follow_button_text().await? == FOLLOWING_LABEL)
    }

    /// Whether this user is currently blocked
    pub async fn is_blocking(&self) -> ForoResult<bool> {
        Ok(self.get_block_button_text().await? == BLOCKING_LABEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{ScriptedDriver, ScriptedElement};
    use crate::pages::tests::context_over;

    const FOLLOW_LABEL_SEL: &str = "#__next > div > div > div > div > div > div > div:nth-child(1) > div > div > div > div > div > div> div > div> div> div> button:nth-child(1) > span";
    const BLOCK_LABEL_SEL: &str = "//span[contains(text(),'屏蔽')]";

    #[tokio::test(start_paused = true)]
    async fn test_is_following_maps_label() {
        let driver = ScriptedDriver::new();
        driver.add_element(ScriptedElement::new(FOLLOW_LABEL_SEL, "已关注"));
        let page = UserPage::new(context_over(&driver));
        assert!(page.is_following().await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_following_with_plain_label() {
        let driver = ScriptedDriver::new();
        driver.add_element(ScriptedElement::new(FOLLOW_LABEL_SEL, "关注"));
        let page = UserPage::new(context_over(&driver));
        assert!(!page.is_following().await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_is_blocking_maps_label() {
        let driver = ScriptedDriver::new();
        driver.add_element(ScriptedElement::new(BLOCK_LABEL_SEL, "解除屏蔽"));
        let page = UserPage::new(context_over(&driver));
        assert!(page.is_blocking().await.unwrap());

        let driver2 = ScriptedDriver::new();
        driver2.add_element(ScriptedElement::new(BLOCK_LABEL_SEL, "屏蔽"));
        let page2 = UserPage::new(context_over(&driver2));
        assert!(!page2.is_blocking().await.unwrap());
    }
}
