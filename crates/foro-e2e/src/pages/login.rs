//! Username/password login page.

use super::{PageContext, DISABLED_CLASS};
use crate::locator::Locator;
use crate::result::ForoResult;

/// Login page flows
#[derive(Debug, Clone)]
pub struct LoginPage {
    ctx: PageContext,
    username_input: Locator,
    password_input: Locator,
    login_button: Locator,
}

impl LoginPage {
    /// Create the page object over a context
    #[must_use]
    pub fn new(ctx: PageContext) -> Self {
        Self {
            ctx,
            username_input: Locator::css("input[placeholder=\"输入您的用户名\"]")
                .named("username input"),
            password_input: Locator::css("input[placeholder=\"输入您的登录密码\"]")
                .named("password input"),
            login_button: Locator::css(
                "#__next > div > div > div> div > div > div > div > div> div > button",
            )
            .named("login button"),
        }
    }

    /// Open the login page
    pub async fn open_login_page(&self) -> ForoResult<()> {
        self.ctx.open("user/username-login").await
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

    /// Click the login button
    pub async fn click_login(&self) -> ForoResult<()> {
        self.ctx.accessor().click(&self.login_button, None).await
    }

    /// Full login flow
    pub async fn login(&self, username: &str, password: &str) -> ForoResult<()> {
        self.input_username(username).await?;
        self.input_password(password).await?;
        self.click_login().await
    }

    /// Whether the login button is enabled (form validation passed)
    pub async fn is_login_button_enabled(&self) -> ForoResult<bool> {
        let button = self.ctx.accessor().find(&self.login_button, None).await?;
        let class = self
            .ctx
            .accessor()
            .driver()
            .get_attribute(&button, "class")
            .await?;
        Ok(!class.unwrap_or_default().contains(DISABLED_CLASS))
    }

    /// Whether the browser was redirected back to the forum root
    pub async fn is_redirect_to_home(&self) -> ForoResult<bool> {
        let root = format!("{}/", self.ctx.base_url());
        self.ctx.wait_url_contains(&root).await
    }
}
