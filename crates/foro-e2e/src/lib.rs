//! foro-e2e: browser-driven end-to-end test harness for the foro web forum.
//!
//! The suite exercises the live UI (registration, login, posting,
//! commenting, liking, following, blocking, private messaging) through an
//! abstract automation driver, asserts on UI state, and cross-checks side
//! effects against the forum's backing store.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  Scenario data ──► Page flow objects ──► Element accessor        │
//! │                         │                     │                  │
//! │                         ▼                     ▼                  │
//! │                   Toast poller ────────► UiDriver (CDP/chromium) │
//! │                   (+ retry wrapper)                              │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The hardest piece is the transient-notification protocol in
//! [`toast`]: the forum's toast can render and disappear faster than one
//! fixed wait samples, so observation is sliced polling with a final
//! unconditional sweep, optionally wrapped in a bounded re-check
//! ([`retry`]) where a page transition races the toast.

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

/// Element accessor: bounded-wait locator resolution
pub mod accessor;
/// Suite configuration
pub mod config;
/// Diagnostic screenshot sinks
pub mod diag;
/// Abstract automation-driver capability and the scripted test double
pub mod driver;
/// Fixture setup/teardown management
pub mod fixture;
/// Suite run reporting
pub mod harness;
/// Locator descriptors
pub mod locator;
/// Page flow objects
pub mod pages;
mod result;
/// Bounded re-check wrapper
pub mod retry;
/// Scenario data records
pub mod scenario;
/// Chromium session (requires the `browser` feature)
#[cfg(feature = "browser")]
pub mod session;
/// Fixture-cleanup store capability
pub mod store;
/// Transient toast-notification polling
pub mod toast;

pub use accessor::ElementAccessor;
pub use config::SuiteConfig;
pub use diag::{DiagnosticSink, FsDiagnostics, NullDiagnostics};
pub use driver::{ElementHandle, ScriptedDriver, ScriptedElement, SessionConfig, UiDriver};
pub use fixture::{Fixture, FixtureManager, LoginSession, SessionFixture, UserCleanup};
pub use harness::{CaseResult, SuiteReport};
pub use locator::{Locator, Selector};
pub use pages::{
    Category, HomePage, LoginPage, MessagePage, PageContext, PostPage, RegisterPage, ThreadPage,
    UserPage,
};
pub use result::{ForoError, ForoResult};
pub use retry::{check_with_retry, RetryPolicy};
pub use scenario::{
    find_case, load_forum_cases, load_register_cases, BlockInput, CommentInput, Expected,
    FollowInput, ForumCases, LikeInput, MessageInput, PostInput, RegisterInput, Scenario,
};
#[cfg(feature = "browser")]
pub use session::CdpSession;
pub use store::{ForumStore, SqliteStore};
pub use toast::{ToastObservation, ToastPoller, DEFAULT_TOAST_TIMEOUT, TOAST_SELECTOR};
