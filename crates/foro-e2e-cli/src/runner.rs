//! Scenario execution over the page flows.
//!
//! One runner drives every suite against a single page context. Forum
//! suites run each case under a fresh logged-in session; register cases
//! clean up the accounts they create through the store capability.

use std::sync::Arc;
use std::time::Duration;

use foro_e2e::{
    check_with_retry, CaseResult, Expected, FixtureManager, ForoError, ForumCases, ForumStore,
    HomePage, LoginPage, LoginSession, MessagePage, PageContext, PostPage, RegisterInput,
    RegisterPage, RetryPolicy, Scenario, SuiteReport, ThreadPage, UserPage,
};

/// Pause after a toast-producing action before checking the redirect,
/// giving the toast time to clear
const TOAST_DISSIPATION: Duration = Duration::from_secs(2);

/// Pause after toggling follow/block state before reading the label
const TOGGLE_SETTLE: Duration = Duration::from_secs(3);

/// Pause after submitting content before the list view reflects it
const CONTENT_SETTLE: Duration = Duration::from_secs(2);

/// Follow button label once following
const FOLLOWING_LABEL: &str = "已关注";

/// Block button label once blocking
const BLOCKING_LABEL: &str = "解除屏蔽";

/// A case failure message for the report
struct CaseFailure(String);

impl From<ForoError> for CaseFailure {
    fn from(e: ForoError) -> Self {
        Self(e.to_string())
    }
}

type CaseOutcome = Result<(), CaseFailure>;

fn expect(condition: bool, message: String) -> CaseOutcome {
    if condition {
        Ok(())
    } else {
        Err(CaseFailure(message))
    }
}

/// Drives scenario suites against one page context
pub struct SuiteRunner {
    ctx: PageContext,
    store: Option<Arc<dyn ForumStore>>,
    username: String,
    password: String,
    filter: Option<String>,
    fail_fast: bool,
}

impl SuiteRunner {
    /// Create a runner over a context
    #[must_use]
    pub fn new(ctx: PageContext) -> Self {
        Self {
            ctx,
            store: None,
            username: "test01".to_string(),
            password: "test01".to_string(),
            filter: None,
            fail_fast: false,
        }
    }

    /// Attach the fixture-cleanup store
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn ForumStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Credentials of the pre-provisioned account for forum suites
    #[must_use]
    pub fn with_credentials(mut self, username: &str, password: &str) -> Self {
        self.username = username.to_string();
        self.password = password.to_string();
        self
    }

    /// Only run cases whose id contains the fragment
    #[must_use]
    pub fn with_filter(mut self, filter: Option<String>) -> Self {
        self.filter = filter;
        self
    }

    /// Stop at the first failing case
    #[must_use]
    pub const fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    fn selected(&self, case_id: &str) -> bool {
        self.filter
            .as_deref()
            .map_or(true, |fragment| case_id.contains(fragment))
    }

    async fn run_case<F>(&self, report: &mut SuiteReport, case_id: &str, run: F) -> bool
    where
        F: std::future::Future<Output = CaseOutcome>,
    {
        if !self.selected(case_id) {
            return true;
        }
        tracing::info!(case_id, "running case");
        let start = std::time::Instant::now();
        let result = match run.await {
            Ok(()) => CaseResult::pass(case_id),
            Err(CaseFailure(message)) => {
                tracing::warn!(case_id, %message, "case failed");
                CaseResult::fail(case_id, message)
            }
        };
        let passed = result.passed;
        report.record(result.with_duration(start.elapsed()));
        !(self.fail_fast && !passed)
    }

    // ------------------------------------------------------------------
    // Register suite
    // ------------------------------------------------------------------

    /// Run the register suite
    pub async fn run_register(&self, cases: &[Scenario<RegisterInput>]) -> SuiteReport {
        let register = RegisterPage::new(self.ctx.clone());
        let home = HomePage::new(self.ctx.clone());
        let mut report = SuiteReport::new("register");
        let start = std::time::Instant::now();

        for case in cases {
            let keep_going = self
                .run_case(
                    &mut report,
                    &case.case_id,
                    self.register_case(&register, &home, case),
                )
                .await;
            if !keep_going {
                break;
            }
        }

        report.duration = start.elapsed();
        report
    }

    async fn register_case(
        &self,
        register: &RegisterPage,
        home: &HomePage,
        case: &Scenario<RegisterInput>,
    ) -> CaseOutcome {
        register.open_register_page().await?;
        register
            .register(
                &case.input.username,
                &case.input.password,
                &case.input.repeat_password,
                &case.input.nickname,
            )
            .await?;

        if let Some(expected_toast) = case.expected.toast_message.as_deref() {
            let observation = check_with_retry(
                || register.check_toast_message(expected_toast),
                RetryPolicy::default(),
            )
            .await
            .map_err(|e| CaseFailure(format!("expected toast '{expected_toast}': {e}")))?;
            tracing::debug!(
                case_id = %case.case_id,
                toast = observation.text.as_deref().unwrap_or("<none>"),
                "toast matched"
            );
        }

        if case.expected.redirect_to_home {
            tokio::time::sleep(TOAST_DISSIPATION).await;
            let redirected = register.is_redirect_to_home().await?;
            expect(
                redirected == case.expected.success,
                format!(
                    "redirect to home: expected {}, got {redirected}",
                    case.expected.success
                ),
            )?;

            // undo the state this case created through the UI
            home.click_logout().await?;
            if let Some(store) = &self.store {
                let rows = store.delete_user_by_username(&case.input.username)?;
                tracing::info!(username = %case.input.username, rows, "cleaned up registered user");
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Forum suites
    // ------------------------------------------------------------------

    /// Run all forum suites (each case under a fresh logged-in session)
    pub async fn run_forum(&self, cases: &ForumCases) -> SuiteReport {
        let mut report = SuiteReport::new("forum");
        let start = std::time::Instant::now();

        let post = PostPage::new(self.ctx.clone());
        let thread = ThreadPage::new(self.ctx.clone());
        let user = UserPage::new(self.ctx.clone());
        let message = MessagePage::new(self.ctx.clone());

        macro_rules! run_group {
            ($group:expr, $body:expr) => {
                for case in $group {
                    let keep_going = self
                        .run_case(&mut report, &case.case_id, self.logged_in(case, $body))
                        .await;
                    if !keep_going {
                        report.duration = start.elapsed();
                        return report;
                    }
                }
            };
        }

        run_group!(&cases.post_tests, |c| self.post_case(&post, c));
        run_group!(&cases.like_tests, |c| self.like_case(&thread, c));
        run_group!(&cases.comment_tests, |c| self.comment_case(&thread, c));
        run_group!(&cases.follow_tests, |c| self.follow_case(&user, c));
        run_group!(&cases.block_tests, |c| self.block_case(&user, c));
        run_group!(&cases.message_tests, |c| self.message_case(&message, c));

        report.duration = start.elapsed();
        report
    }

    /// Run a case body inside a login/logout fixture pair
    async fn logged_in<'a, I, F, Fut>(&'a self, case: &'a Scenario<I>, body: F) -> CaseOutcome
    where
        F: FnOnce(&'a Scenario<I>) -> Fut,
        Fut: std::future::Future<Output = CaseOutcome>,
    {
        let mut fixtures = FixtureManager::new();
        fixtures.register(LoginSession::new(
            LoginPage::new(self.ctx.clone()),
            HomePage::new(self.ctx.clone()),
            &self.username,
            &self.password,
        ));
        fixtures.setup_all().await?;

        let outcome = body(case).await;

        // logout must run whether the case passed or not
        if let Err(e) = fixtures.teardown_all().await {
            tracing::warn!(error = %e, "fixture teardown failed");
        }
        outcome
    }

    async fn post_case(&self, page: &PostPage, case: &Scenario<foro_e2e::PostInput>) -> CaseOutcome {
        page.open_post_page().await?;
        page.create_post(&case.input.title, &case.input.content, case.input.category())
            .await?;

        if let Some(expected_toast) = case.expected.toast_message.as_deref() {
            check_with_retry(
                || page.check_toast_message(expected_toast),
                RetryPolicy::default(),
            )
            .await
            .map_err(|e| CaseFailure(format!("expected toast '{expected_toast}': {e}")))?;
        }

        if case.expected.redirect_to_thread {
            let redirected = page.is_redirect_to_thread().await?;
            expect(
                redirected == case.expected.success,
                format!(
                    "redirect to thread: expected {}, got {redirected}",
                    case.expected.success
                ),
            )?;
        }
        Ok(())
    }

    async fn like_case(
        &self,
        page: &ThreadPage,
        case: &Scenario<foro_e2e::LikeInput>,
    ) -> CaseOutcome {
        page.open_thread_page(case.input.thread_id).await?;

        // like first so the second click exercises the toggle-off path
        page.click_like_button().await?;
        expect(
            page.is_thread_liked().await?,
            "thread not liked after first toggle".to_string(),
        )?;

        page.click_like_button().await?;
        let liked = page.is_thread_liked().await?;
        let expected = case.expected.like_status.unwrap_or(false);
        expect(
            liked == expected,
            format!("like status: expected {expected}, got {liked}"),
        )
    }

    async fn comment_case(
        &self,
        page: &ThreadPage,
        case: &Scenario<foro_e2e::CommentInput>,
    ) -> CaseOutcome {
        page.open_thread_page(case.input.thread_id).await?;
        page.create_comment(&case.input.content).await?;

        if let Some(expected_toast) = case.expected.toast_message.as_deref() {
            let observation = check_with_retry(
                || page.check_toast_message(expected_toast),
                RetryPolicy::default(),
            )
            .await
            .map_err(|e| CaseFailure(format!("expected toast '{expected_toast}': {e}")))?;
            tracing::debug!(toast = observation.text.as_deref().unwrap_or(""), "comment toast");
            return Ok(());
        }

        tokio::time::sleep(CONTENT_SETTLE).await;
        let present = page.is_comment_present(&case.input.content).await?;
        expect(
            present == case.expected.success,
            format!(
                "comment visibility: expected {}, got {present}",
                case.expected.success
            ),
        )
    }

    async fn follow_case(
        &self,
        page: &UserPage,
        case: &Scenario<foro_e2e::FollowInput>,
    ) -> CaseOutcome {
        page.open_user_page(case.input.user_id).await?;

        let want_following = case.expected.button_text.as_deref() == Some(FOLLOWING_LABEL);

        // move to the opposite state first so the asserted click flips it
        if page.is_following().await? == want_following {
            page.click_follow_button().await?;
            tokio::time::sleep(TOGGLE_SETTLE).await;
        }

        page.click_follow_button().await?;
        tokio::time::sleep(TOGGLE_SETTLE).await;

        let text = page.get_follow_button_text().await?;
        check_label(&case.expected, &text)?;

        if want_following {
            // restore the initial state
            page.click_follow_button().await?;
        }
        Ok(())
    }

    async fn block_case(
        &self,
        page: &UserPage,
        case: &Scenario<foro_e2e::BlockInput>,
    ) -> CaseOutcome {
        page.open_user_page(case.input.user_id).await?;

        let want_blocking = case.expected.button_text.as_deref() == Some(BLOCKING_LABEL);

        if page.is_blocking().await? == want_blocking {
            page.click_block_button().await?;
            tokio::time::sleep(TOGGLE_SETTLE).await;
        }

        page.click_block_button().await?;
        tokio::time::sleep(TOGGLE_SETTLE).await;

        let text = page.get_block_button_text().await?;
        check_label(&case.expected, &text)?;

        if want_blocking {
            page.click_block_button().await?;
        }
        Ok(())
    }

    async fn message_case(
        &self,
        page: &MessagePage,
        case: &Scenario<foro_e2e::MessageInput>,
    ) -> CaseOutcome {
        page.open_message_page(case.input.user_id, &case.input.nickname)
            .await?;
        page.send_message(&case.input.content).await?;

        if let Some(expected_toast) = case.expected.toast_message.as_deref() {
            check_with_retry(
                || page.check_toast_message(expected_toast),
                RetryPolicy::default(),
            )
            .await
            .map_err(|e| CaseFailure(format!("expected toast '{expected_toast}': {e}")))?;
            return Ok(());
        }

        tokio::time::sleep(CONTENT_SETTLE).await;
        let sent = page.is_message_sent(&case.input.content).await?;
        expect(
            sent == case.expected.success,
            format!(
                "message delivery: expected {}, got {sent}",
                case.expected.success
            ),
        )
    }
}

fn check_label(expected: &Expected, actual: &str) -> CaseOutcome {
    let Some(wanted) = expected.button_text.as_deref() else {
        return Ok(());
    };
    expect(
        actual == wanted,
        format!("button label: expected '{wanted}', got '{actual}'"),
    )
}
