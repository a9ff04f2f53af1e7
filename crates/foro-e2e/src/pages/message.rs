//! Private message (chat) page.

use super::PageContext;
use crate::locator::Locator;
use crate::result::ForoResult;
use crate::toast::ToastObservation;

/// Private message page flows
#[derive(Debug, Clone)]
pub struct MessagePage {
    ctx: PageContext,
    message_textarea: Locator,
    send_button: Locator,
    messages: Locator,
}

impl MessagePage {
    /// Create the page object over a context
    #[must_use]
    pub fn new(ctx: PageContext) -> Self {
        Self {
            ctx,
            message_textarea: Locator::css("div > textarea").named("message textarea"),
            send_button: Locator::css(
                "#__next > div > div > div> div > div > div> div > div> div> button",
            )
            .named("send button"),
            messages: Locator::css(
                "#__next > div > div > div._1AABQTkjs60yLerksyv0Lm._2Ma7oHEHm1xrBV92mrcdqI.mymessage-page > div > div > div._3ZZfB0N5_Sh035AFamfsrk > div > div.tztHKVAjDfSwFtjiTjboS > div > div > div.rqymFR5ufbMmkwvt7hBVT",
            )
            .named("message bubbles"),
        }
    }

    /// Open the chat with a user
    pub async fn open_message_page(&self, user_id: u64, nickname: &str) -> ForoResult<()> {
        self.ctx
            .open(&format!("message?page=chat&userId={user_id}&nickname={nickname}"))
            .await
    }

    /// Type a message
    pub async fn input_message(&self, message: &str) -> ForoResult<()> {
        self.ctx
            .accessor()
            .input_text(&self.message_textarea, message, None)
            .await
    }

    /// Click the send button
    pub async fn click_send_button(&self) -> ForoResult<()> {
        self.ctx.accessor().click(&self.send_button, None).await
    }

    /// Full send flow
    pub async fn send_message(&self, message: &str) -> ForoResult<()> {
        self.input_message(message).await?;
        self.click_send_button().await
    }

    /// Text of the newest message bubble, if any
    pub async fn get_last_message(&self) -> ForoResult<Option<String>> {
        let bubbles = self.ctx.accessor().find_all(&self.messages, None).await?;
        match bubbles.last() {
            Some(last) => Ok(Some(self.ctx.accessor().driver().get_text(last).await?)),
            None => Ok(None),
        }
    }

    /// Whether the newest message contains the sent content
    pub async fn is_message_sent(&self, message: &str) -> ForoResult<bool> {
        Ok(self
            .get_last_message()
            .await?
            .is_some_and(|last| last.contains(message)))
    }

    /// Observe the toast against an expected substring
    pub async fn check_toast_message(&self, expected: &str) -> ForoResult<ToastObservation> {
        self.ctx.check_toast(Some(expected)).await
    }
}
