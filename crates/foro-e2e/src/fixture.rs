//! Test fixture setup and teardown.
//!
//! Fixtures own the resources a scenario needs (browser session, logged-in
//! user, store-backed cleanup) and guarantee release: teardown runs in
//! reverse setup order, runs for everything that was set up even when a
//! later setup failed, and session release does not depend on the test
//! outcome.

use std::sync::Arc;

use async_trait::async_trait;

use crate::driver::UiDriver;
use crate::pages::{HomePage, LoginPage};
use crate::result::{ForoError, ForoResult};
use crate::store::ForumStore;

/// A resource with managed setup and teardown
#[async_trait]
pub trait Fixture: Send + Sync {
    /// Set up the fixture before test execution
    async fn setup(&mut self) -> ForoResult<()>;

    /// Tear down the fixture after test execution
    async fn teardown(&mut self) -> ForoResult<()>;

    /// Fixture name for logging
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Priority: higher = set up first, torn down last
    fn priority(&self) -> i32 {
        0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FixtureState {
    Registered,
    SetUp,
    TornDown,
    Failed,
}

struct Entry {
    fixture: Box<dyn Fixture>,
    state: FixtureState,
}

/// Priority-ordered fixture lifecycle manager
#[derive(Default)]
pub struct FixtureManager {
    entries: Vec<Entry>,
    setup_order: Vec<usize>,
}

impl std::fmt::Debug for FixtureManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixtureManager")
            .field("fixtures", &self.entries.len())
            .finish()
    }
}

impl FixtureManager {
    /// Create an empty manager
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fixture
    pub fn register<F: Fixture + 'static>(&mut self, fixture: F) {
        self.entries.push(Entry {
            fixture: Box::new(fixture),
            state: FixtureState::Registered,
        });
    }

    /// Number of registered fixtures
    #[must_use]
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Set up all fixtures, highest priority first.
    ///
    /// # Errors
    ///
    /// If any setup fails, fixtures already set up are torn down before
    /// the error is returned.
    pub async fn setup_all(&mut self) -> ForoResult<()> {
        let mut order: Vec<usize> = (0..self.entries.len()).collect();
        order.sort_by_key(|&i| std::cmp::Reverse(self.entries[i].fixture.priority()));

        self.setup_order.clear();

        for index in order {
            let entry = &mut self.entries[index];
            if entry.state == FixtureState::SetUp {
                continue;
            }
            tracing::debug!(fixture = entry.fixture.name(), "fixture setup");
            if let Err(e) = entry.fixture.setup().await {
                let message = format!("Fixture '{}' setup failed: {e}", entry.fixture.name());
                entry.state = FixtureState::Failed;
                let _ = self.teardown_all().await;
                return Err(ForoError::Fixture { message });
            }
            entry.state = FixtureState::SetUp;
            self.setup_order.push(index);
        }
        Ok(())
    }

    /// Tear down all set-up fixtures in reverse setup order.
    ///
    /// # Errors
    ///
    /// Every fixture is torn down regardless; the first failure is
    /// returned.
    pub async fn teardown_all(&mut self) -> ForoResult<()> {
        let mut first_error: Option<ForoError> = None;

        for &index in self.setup_order.clone().iter().rev() {
            let entry = &mut self.entries[index];
            if entry.state != FixtureState::SetUp {
                continue;
            }
            tracing::debug!(fixture = entry.fixture.name(), "fixture teardown");
            match entry.fixture.teardown().await {
                Ok(()) => entry.state = FixtureState::TornDown,
                Err(e) => {
                    entry.state = FixtureState::Failed;
                    if first_error.is_none() {
                        first_error = Some(ForoError::Fixture {
                            message: format!(
                                "Fixture '{}' teardown failed: {e}",
                                entry.fixture.name()
                            ),
                        });
                    }
                }
            }
        }
        self.setup_order.clear();

        first_error.map_or(Ok(()), Err)
    }
}

/// Owns the browser session; releases it unconditionally at teardown
pub struct SessionFixture {
    driver: Arc<dyn UiDriver>,
}

impl SessionFixture {
    /// Wrap an already-launched session
    #[must_use]
    pub fn new(driver: Arc<dyn UiDriver>) -> Self {
        Self { driver }
    }
}

#[async_trait]
impl Fixture for SessionFixture {
    async fn setup(&mut self) -> ForoResult<()> {
        Ok(())
    }

    async fn teardown(&mut self) -> ForoResult<()> {
        self.driver.close().await
    }

    fn name(&self) -> &str {
        "browser session"
    }

    fn priority(&self) -> i32 {
        // first up, last down: everything else depends on the session
        100
    }
}

/// Logs a user in at setup and out at teardown
pub struct LoginSession {
    login: LoginPage,
    home: HomePage,
    username: String,
    password: String,
}

impl LoginSession {
    /// Create the fixture for the given credentials
    #[must_use]
    pub fn new(login: LoginPage, home: HomePage, username: &str, password: &str) -> Self {
        Self {
            login,
            home,
            username: username.to_string(),
            password: password.to_string(),
        }
    }
}

#[async_trait]
impl Fixture for LoginSession {
    async fn setup(&mut self) -> ForoResult<()> {
        self.login.open_login_page().await?;
        self.login.login(&self.username, &self.password).await?;
        if !self.home.is_logged_in().await {
            return Err(ForoError::Fixture {
                message: format!("login as '{}' did not produce a session", self.username),
            });
        }
        Ok(())
    }

    async fn teardown(&mut self) -> ForoResult<()> {
        self.home.open_home().await?;
        self.home.click_logout().await
    }

    fn name(&self) -> &str {
        "logged-in user"
    }
}

/// Deletes a UI-created user from the backing store at teardown
pub struct UserCleanup {
    store: Arc<dyn ForumStore>,
    username: String,
}

impl UserCleanup {
    /// Create the cleanup fixture for a username
    #[must_use]
    pub fn new(store: Arc<dyn ForumStore>, username: &str) -> Self {
        Self {
            store,
            username: username.to_string(),
        }
    }
}

#[async_trait]
impl Fixture for UserCleanup {
    async fn setup(&mut self) -> ForoResult<()> {
        Ok(())
    }

    async fn teardown(&mut self) -> ForoResult<()> {
        let rows = self.store.delete_user_by_username(&self.username)?;
        tracing::info!(username = %self.username, rows, "registered user cleaned up");
        Ok(())
    }

    fn name(&self) -> &str {
        "user cleanup"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;
    use parking_lot::Mutex;

    struct Probe {
        label: &'static str,
        priority: i32,
        fail_setup: bool,
        events: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Fixture for Probe {
        async fn setup(&mut self) -> ForoResult<()> {
            self.events.lock().push(format!("setup:{}", self.label));
            if self.fail_setup {
                return Err(ForoError::Fixture {
                    message: "probe setup failure".into(),
                });
            }
            Ok(())
        }

        async fn teardown(&mut self) -> ForoResult<()> {
            self.events.lock().push(format!("teardown:{}", self.label));
            Ok(())
        }

        fn name(&self) -> &str {
            self.label
        }

        fn priority(&self) -> i32 {
            self.priority
        }
    }

    fn probe(
        label: &'static str,
        priority: i32,
        fail_setup: bool,
        events: &Arc<Mutex<Vec<String>>>,
    ) -> Probe {
        Probe {
            label,
            priority,
            fail_setup,
            events: events.clone(),
        }
    }

    #[tokio::test]
    async fn test_setup_priority_and_reverse_teardown() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let mut manager = FixtureManager::new();
        manager.register(probe("low", 0, false, &events));
        manager.register(probe("high", 10, false, &events));

        manager.setup_all().await.unwrap();
        manager.teardown_all().await.unwrap();

        assert_eq!(
            events.lock().as_slice(),
            [
                "setup:high",
                "setup:low",
                "teardown:low",
                "teardown:high"
            ]
        );
    }

    #[tokio::test]
    async fn test_partial_setup_failure_tears_down_completed() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let mut manager = FixtureManager::new();
        manager.register(probe("first", 10, false, &events));
        manager.register(probe("broken", 0, true, &events));

        let err = manager.setup_all().await.unwrap_err();
        assert!(matches!(err, ForoError::Fixture { .. }));
        assert_eq!(
            events.lock().as_slice(),
            ["setup:first", "setup:broken", "teardown:first"]
        );
    }

    #[tokio::test]
    async fn test_session_fixture_releases_driver() {
        use crate::driver::ScriptedDriver;

        let driver = ScriptedDriver::new();
        let mut manager = FixtureManager::new();
        manager.register(SessionFixture::new(Arc::new(driver.clone())));

        manager.setup_all().await.unwrap();
        assert!(!driver.is_closed());
        manager.teardown_all().await.unwrap();
        assert!(driver.is_closed());
    }

    #[tokio::test]
    async fn test_user_cleanup_deletes_row() {
        let store = SqliteStore::open_memory().unwrap();
        let _ = store.insert_user("ui_created", "界面用户").unwrap();

        let mut fixture = UserCleanup::new(Arc::new(store.clone()), "ui_created");
        fixture.setup().await.unwrap();
        fixture.teardown().await.unwrap();
        assert!(store.lookup_user_id("ui_created").unwrap().is_none());
    }
}
