//! Thread creation page.

use super::{PageContext, DISABLED_CLASS};
use crate::locator::Locator;
use crate::result::ForoResult;
use crate::toast::ToastObservation;

/// Thread categories offered by the post form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// 默认分类
    Default,
    /// 其他分类
    Other,
}

/// Post (new thread) page flows
#[derive(Debug, Clone)]
pub struct PostPage {
    ctx: PageContext,
    title_input: Locator,
    content_textarea: Locator,
    default_category: Locator,
    other_category: Locator,
    post_button: Locator,
}

impl PostPage {
    /// Create the page object over a context
    #[must_use]
    pub fn new(ctx: PageContext) -> Self {
        Self {
            ctx,
            title_input: Locator::css("input[placeholder=\"标题（可选）\"]").named("title input"),
            content_textarea: Locator::css("pre[placeholder=\"请填写您的发布内容…\"]")
                .named("content area"),
            default_category: Locator::css(
                "#__next > div > div > div> div> div> div> button:nth-child(1)",
            )
            .named("default category"),
            other_category: Locator::css(
                "#__next > div > div > div> div> div> div> button:nth-child(2)",
            )
            .named("other category"),
            post_button: Locator::css("#__next > div > div > div> div> div> button:nth-child(2)")
                .named("publish button"),
        }
    }

    /// Open the post page
    pub async fn open_post_page(&self) -> ForoResult<()> {
        self.ctx.open("thread/post").await
    }

    /// Type the title
    pub async fn input_title(&self, title: &str) -> ForoResult<()> {
        self.ctx
            .accessor()
            .input_text(&self.title_input, title, None)
            .await
    }

    /// Type the body content
    pub async fn input_content(&self, content: &str) -> ForoResult<()> {
        self.ctx
            .accessor()
            .input_text(&self.content_textarea, content, None)
            .await
    }

    /// Select a thread category
    pub async fn select_category(&self, category: Category) -> ForoResult<()> {
        let locator = match category {
            Category::Default => &self.default_category,
            Category::Other => &self.other_category,
        };
        self.ctx.accessor().click(locator, None).await
    }

    /// Click the publish button
    pub async fn click_post_button(&self) -> ForoResult<()> {
        self.ctx.accessor().click(&self.post_button, None).await
    }

    /// Full posting flow
    pub async fn create_post(
        &self,
        title: &str,
        content: &str,
        category: Category,
    ) -> ForoResult<()> {
        self.input_title(title).await?;
        self.input_content(content).await?;
        self.select_category(category).await?;
        self.click_post_button().await
    }

    /// Whether the publish button is enabled
    pub async fn is_post_button_enabled(&self) -> ForoResult<bool> {
        let button = self.ctx.accessor().find(&self.post_button, None).await?;
        let class = self
            .ctx
            .accessor()
            .driver()
            .get_attribute(&button, "class")
            .await?;
        Ok(!class.unwrap_or_default().contains(DISABLED_CLASS))
    }

    /// Observe the toast against an expected substring
    pub async fn check_toast_message(&self, expected: &str) -> ForoResult<ToastObservation> {
        self.ctx.check_toast(Some(expected)).await
    }

    /// Whether the browser was redirected to the created thread
    pub async fn is_redirect_to_thread(&self) -> ForoResult<bool> {
        self.ctx.wait_url_contains("thread").await
    }
}
