//! Thread detail page: likes and comments.

use std::time::Duration;

use super::PageContext;
use crate::locator::Locator;
use crate::result::ForoResult;
use crate::toast::ToastObservation;

/// Class fragment the like button carries once the thread is liked
const LIKED_BUTTON_CLASS: &str = "_32k6KpwFJXU4ufhoOTLCa_";

/// The like state is applied by page script after the click round-trips
const LIKE_SETTLE_DELAY: Duration = Duration::from_secs(3);

/// Comment links truncate their title attribute at this many characters
const COMMENT_TITLE_CHARS: usize = 20;

/// Thread page flows
#[derive(Debug, Clone)]
pub struct ThreadPage {
    ctx: PageContext,
    like_button: Locator,
    comment_textarea: Locator,
    comment_submit: Locator,
    comment_list: Locator,
    author_avatar: Locator,
}

impl ThreadPage {
    /// Create the page object over a context
    #[must_use]
    pub fn new(ctx: PageContext) -> Self {
        Self {
            ctx,
            like_button: Locator::xpath("//span[contains(text(),'赞')]/..").named("like button"),
            comment_textarea: Locator::css(
                "#__next > div > div > div > div > div > div > div > div:nth-child(1) > div> div > div:nth-child(2) > div > div> div > textarea",
            )
            .named("comment textarea"),
            comment_submit: Locator::css(
                "#__next > div > div > div > div > div > div > div > div:nth-child(1) > div > div > div:nth-child(2) > div > div > button",
            )
            .named("comment submit"),
            comment_list: Locator::css(
                "#__next > div > div > div> div> div> div > div> div:nth-child(1) > div > div > div> div > div > div > div> div > a",
            )
            .named("comment links"),
            author_avatar: Locator::css(
                "#__next > div > div > div> div > div > div > div> div:nth-child(1) > div> div> div> div > div> div > div.dzq-avatar",
            )
            .named("author avatar"),
        }
    }

    /// Open a thread by id
    pub async fn open_thread_page(&self, thread_id: u64) -> ForoResult<()> {
        self.ctx.open(&format!("thread/{thread_id}")).await
    }

    /// Click the like toggle
    pub async fn click_like_button(&self) -> ForoResult<()> {
        self.ctx.accessor().click(&self.like_button, None).await
    }

    /// Whether the thread is currently liked
    pub async fn is_thread_liked(&self) -> ForoResult<bool> {
        tokio::time::sleep(LIKE_SETTLE_DELAY).await;
        let button = self.ctx.accessor().find(&self.like_button, None).await?;
        let class = self
            .ctx
            .accessor()
            .driver()
            .get_attribute(&button, "class")
            .await?;
        Ok(class.unwrap_or_default().contains(LIKED_BUTTON_CLASS))
    }

    /// Type a comment
    pub async fn input_comment(&self, comment: &str) -> ForoResult<()> {
        self.ctx
            .accessor()
            .input_text(&self.comment_textarea, comment, None)
            .await
    }

    /// Submit the comment form
    pub async fn submit_comment(&self) -> ForoResult<()> {
        self.ctx.accessor().click(&self.comment_submit, None).await
    }

    /// Full comment flow
    pub async fn create_comment(&self, comment: &str) -> ForoResult<()> {
        self.input_comment(comment).await?;
        self.submit_comment().await
    }

    /// All comment link elements
    pub async fn get_comments(&self) -> ForoResult<Vec<crate::driver::ElementHandle>> {
        self.ctx.accessor().find_all(&self.comment_list, None).await
    }

    /// Whether a comment with this content is listed.
    ///
    /// The UI truncates the link title at [`COMMENT_TITLE_CHARS`]
    /// characters, so only that prefix is compared.
    pub async fn is_comment_present(&self, comment: &str) -> ForoResult<bool> {
        let comments = self.get_comments().await?;
        if comments.is_empty() {
            return Ok(false);
        }

        let title: String = comment.chars().take(COMMENT_TITLE_CHARS).collect();

        for element in comments {
            if let Some(actual) = self
                .ctx
                .accessor()
                .driver()
                .get_attribute(&element, "title")
                .await?
            {
                if actual == title {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Observe the toast against an expected substring
    pub async fn check_toast_message(&self, expected: &str) -> ForoResult<ToastObservation> {
        self.ctx.check_toast(Some(expected)).await
    }

    /// Click the thread author's avatar
    pub async fn click_author_avatar(&self) -> ForoResult<()> {
        self.ctx.accessor().click(&self.author_avatar, None).await
    }
}
