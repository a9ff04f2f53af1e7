//! Account registration page.

use super::{PageContext, DISABLED_CLASS};
use crate::locator::Locator;
use crate::result::ForoResult;
use crate::toast::ToastObservation;

/// Registration page flows
#[derive(Debug, Clone)]
pub struct RegisterPage {
    ctx: PageContext,
    username_input: Locator,
    password_input: Locator,
    repeat_password_input: Locator,
    nickname_input: Locator,
    register_button: Locator,
}

impl RegisterPage {
    /// Create the page object over a context
    #[must_use]
    pub fn new(ctx: PageContext) -> Self {
        Self {
            ctx,
            username_input: Locator::css("input[placeholder=\"输入您的用户名\"]")
                .named("username input"),
            password_input: Locator::css("input[placeholder=\"输入您的登录密码\"]")
                .named("password input"),
            repeat_password_input: Locator::css("input[placeholder=\"确认密码\"]")
                .named("repeat password input"),
            nickname_input: Locator::css("input[placeholder=\"输入您的昵称\"]")
                .named("nickname input"),
            register_button: Locator::css(
                "#__next > div > div > div:nth-child(2) > div > div > div > div > div > div > button",
            )
            .named("register button"),
        }
    }

    /// Open the registration page
    pub async fn open_register_page(&self) -> ForoResult<()> {
        self.ctx.open("user/register").await
    }

    /// Type the username
    pub async fn input_username(&self, username: &str) -> ForoResult<()> {
        self.ctx
            .accessor()
            .input_text(&self.username_input, username, None)
            .await
    }

    /// Type the password
    pub async fn input_password(&self, password: &str) -> ForoResult<()> {
        self.ctx
            .accessor()
            .input_text(&self.password_input, password, None)
            .await
    }

    /// Type the repeat password
    pub async fn input_repeat_password(&self, repeat_password: &str) -> ForoResult<()> {
        self.ctx
            .accessor()
            .input_text(&self.repeat_password_input, repeat_password, None)
            .await
    }

    /// Type the nickname
    pub async fn input_nickname(&self, nickname: &str) -> ForoResult<()> {
        self.ctx
            .accessor()
            .input_text(&self.nickname_input, nickname, None)
            .await
    }

    /// Click the register button
    pub async fn click_register(&self) -> ForoResult<()> {
        self.ctx.accessor().click(&self.register_button, None).await
    }

    /// Full registration flow
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        repeat_password: &str,
        nickname: &str,
    ) -> ForoResult<()> {
        self.input_username(username).await?;
        self.input_password(password).await?;
        self.input_repeat_password(repeat_password).await?;
        self.input_nickname(nickname).await?;
        self.click_register().await
    }

    /// Whether the register button is enabled (form validation passed)
    pub async fn is_register_button_enabled(&self) -> ForoResult<bool> {
        let button = self.ctx.accessor().find(&self.register_button, None).await?;
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

    /// Whether the browser was redirected back to the forum root
    pub async fn is_redirect_to_home(&self) -> ForoResult<bool> {
        let root = format!("{}/", self.ctx.base_url());
        self.ctx.wait_url_contains(&root).await
    }
}
