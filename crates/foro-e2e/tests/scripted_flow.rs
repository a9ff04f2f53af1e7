//! End-to-end scenario flows against the scripted driver.

use std::sync::Arc;
use std::time::Duration;

use foro_e2e::{
    check_with_retry, find_case, FixtureManager, ForumStore, HomePage, NullDiagnostics,
    PageContext, RegisterInput, RegisterPage, RetryPolicy, Scenario, ScriptedDriver,
    ScriptedElement, SessionFixture, SqliteStore, SuiteConfig, ThreadPage, UserCleanup,
    TOAST_SELECTOR,
};

const REGISTER_BUTTON: &str =
    "#__next > div > div > div:nth-child(2) > div > div > div > div > div > div > button";
const USER_TRIGGER: &str = "#__next > div > div > div > div > div > div > div.dzq-dropdown";
const COMMENT_TEXTAREA: &str = "#__next > div > div > div > div > div > div > div > div:nth-child(1) > div> div > div:nth-child(2) > div > div> div > textarea";
const COMMENT_SUBMIT: &str = "#__next > div > div > div > div > div > div > div > div:nth-child(1) > div > div > div:nth-child(2) > div > div > button";

fn context_over(driver: &ScriptedDriver) -> PageContext {
    let config = SuiteConfig {
        element_timeout_ms: 300,
        toast_timeout_ms: 500,
        ..SuiteConfig::default()
    };
    PageContext::new(
        Arc::new(driver.clone()),
        &config,
        Arc::new(NullDiagnostics),
    )
}

fn register_form(driver: &ScriptedDriver) {
    driver.add_element(ScriptedElement::new("input[placeholder=\"输入您的用户名\"]", ""));
    driver.add_element(ScriptedElement::new("input[placeholder=\"输入您的登录密码\"]", ""));
    driver.add_element(ScriptedElement::new("input[placeholder=\"确认密码\"]", ""));
    driver.add_element(ScriptedElement::new("input[placeholder=\"输入您的昵称\"]", ""));
    driver.add_element(ScriptedElement::new(REGISTER_BUTTON, "注册"));
}

fn register_cases() -> Vec<Scenario<RegisterInput>> {
    serde_json::from_str(
        r#"[
        {
            "case_id": "register_valid_1",
            "input": {
                "username": "e2e_user_1",
                "password": "abc12345",
                "repeat_password": "abc12345",
                "nickname": "e2e昵称一"
            },
            "expected": {"success": true, "toast_message": null, "redirect_to_home": true}
        }
    ]"#,
    )
    .unwrap()
}

#[tokio::test(start_paused = true)]
async fn valid_register_redirects_and_cleans_up() {
    let driver = ScriptedDriver::new();
    register_form(&driver);
    driver.set_url("https://localhost/user/register");
    // the application redirects home shortly after a successful submit
    driver.schedule_url(Duration::from_millis(700), "https://localhost/");
    driver.add_element(ScriptedElement::new(USER_TRIGGER, ""));

    let cases = register_cases();
    let case = find_case(&cases, "register_valid_1").unwrap();

    let ctx = context_over(&driver);
    let register = RegisterPage::new(ctx.clone());
    let home = HomePage::new(ctx);

    // store row exists once the UI created the account
    let store = SqliteStore::open_memory().unwrap();
    let _ = store
        .insert_user(&case.input.username, &case.input.nickname)
        .unwrap();

    let mut fixtures = FixtureManager::new();
    fixtures.register(SessionFixture::new(Arc::new(driver.clone())));
    fixtures.register(UserCleanup::new(
        Arc::new(store.clone()),
        &case.input.username,
    ));
    fixtures.setup_all().await.unwrap();

    register.open_register_page().await.unwrap();
    register
        .register(
            &case.input.username,
            &case.input.password,
            &case.input.repeat_password,
            &case.input.nickname,
        )
        .await
        .unwrap();

    assert!(home.is_logged_in().await);
    assert_eq!(
        register.is_redirect_to_home().await.unwrap(),
        case.expected.redirect_to_home
    );

    fixtures.teardown_all().await.unwrap();
    // session released and store cleaned regardless of outcome
    assert!(driver.is_closed());
    assert!(store.lookup_user_id(&case.input.username).unwrap().is_none());
}

#[tokio::test(start_paused = true)]
async fn empty_comment_toast_is_absorbed_by_retry() {
    let driver = ScriptedDriver::new();
    driver.add_element(ScriptedElement::new(COMMENT_TEXTAREA, ""));
    driver.add_element(ScriptedElement::new(COMMENT_SUBMIT, "评论"));
    // the toast renders only after a page transition settles, past the
    // first observation window
    driver.add_element(
        ScriptedElement::new(TOAST_SELECTOR, "请输入内容")
            .present_between(Duration::from_millis(1200), Duration::from_millis(2500))
            .visible_between(Duration::from_millis(1200), Duration::from_millis(2500)),
    );

    let ctx = context_over(&driver);
    let thread = ThreadPage::new(ctx);

    thread.open_thread_page(1).await.unwrap();
    thread.create_comment("").await.unwrap();

    let observation = check_with_retry(
        || thread.check_toast_message("请输入内容"),
        RetryPolicy::new(3).with_wait_between(Duration::from_millis(300)),
    )
    .await
    .unwrap();

    assert!(observation.matched);
    assert_eq!(observation.text.as_deref(), Some("请输入内容"));
}

#[tokio::test(start_paused = true)]
async fn missing_toast_exhausts_retry_with_diagnostic_text() {
    let driver = ScriptedDriver::new();
    driver.add_element(ScriptedElement::new(TOAST_SELECTOR, "操作太频繁"));

    let ctx = context_over(&driver);
    let thread = ThreadPage::new(ctx);

    let err = check_with_retry(
        || thread.check_toast_message("评论成功"),
        RetryPolicy::new(2).with_wait_between(Duration::from_millis(100)),
    )
    .await
    .unwrap_err();

    match err {
        foro_e2e::ForoError::RetryExhausted { attempts, last_text } => {
            assert_eq!(attempts, 2);
            // the actual toast text survives for the failure report
            assert_eq!(last_text.as_deref(), Some("操作太频繁"));
        }
        other => panic!("expected RetryExhausted, got {other:?}"),
    }
}
