//! Bounded re-check wrapper for toast observations.
//!
//! Some actions race the toast against a page transition that can dismiss
//! or replace it before the poller's first slice runs. The wrapper
//! re-issues the *check* (never the triggering action) to absorb that
//! race. The race window is small and constant, so the interval is fixed
//! rather than exponential.

use std::future::Future;
use std::time::Duration;

use crate::result::{ForoError, ForoResult};
use crate::toast::ToastObservation;

/// Bounds for [`check_with_retry`]
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total check invocations, including the first
    pub max_attempts: u32,
    /// Fixed wait between invocations
    pub wait_between: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            wait_between: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Create a policy with the given attempt bound
    #[must_use]
    pub const fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            wait_between: Duration::from_secs(2),
        }
    }

    /// Set the wait between attempts
    #[must_use]
    pub const fn with_wait_between(mut self, wait: Duration) -> Self {
        self.wait_between = wait;
        self
    }
}

/// Invoke `check` until it reports a positive match, up to
/// `policy.max_attempts` times with `policy.wait_between` in between.
///
/// Retries happen only on a negative match; any error from the check
/// propagates immediately and untouched.
///
/// # Errors
///
/// [`ForoError::RetryExhausted`] (carrying the last observed text) after
/// all attempts report a negative match.
pub async fn check_with_retry<F, Fut>(mut check: F, policy: RetryPolicy) -> ForoResult<ToastObservation>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ForoResult<ToastObservation>>,
{
    let mut last: Option<ToastObservation> = None;

    for attempt in 1..=policy.max_attempts.max(1) {
        let observation = check().await?;
        if observation.matched {
            return Ok(observation);
        }
        tracing::debug!(
            attempt,
            text = observation.text.as_deref().unwrap_or("<none>"),
            "toast check negative"
        );
        last = Some(observation);
        if attempt < policy.max_attempts {
            tokio::time::sleep(policy.wait_between).await;
        }
    }

    Err(ForoError::RetryExhausted {
        attempts: policy.max_attempts.max(1),
        last_text: last.and_then(|o| o.text),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio::time::Instant;

    fn positive(text: &str) -> ForoResult<ToastObservation> {
        Ok(ToastObservation {
            matched: true,
            text: Some(text.to_string()),
        })
    }

    fn negative(text: Option<&str>) -> ForoResult<ToastObservation> {
        Ok(ToastObservation {
            matched: false,
            text: text.map(String::from),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_attempt_positive_returns_immediately() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();
        let result = check_with_retry(
            move || {
                let _ = calls_clone.fetch_add(1, Ordering::SeqCst);
                async { positive("注册成功") }
            },
            RetryPolicy::default(),
        )
        .await
        .unwrap();
        assert!(result.matched);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_attempt_positive_stops_there() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();
        let result = check_with_retry(
            move || {
                let n = calls_clone.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 1 {
                        positive("评论成功")
                    } else {
                        negative(None)
                    }
                }
            },
            RetryPolicy::default(),
        )
        .await
        .unwrap();
        assert!(result.matched);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_performs_exact_attempts_with_spacing() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();
        let start = Instant::now();
        let err = check_with_retry(
            move || {
                let _ = calls_clone.fetch_add(1, Ordering::SeqCst);
                async { negative(Some("用户名已存在")) }
            },
            RetryPolicy::default(),
        )
        .await
        .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // two waits of 2s between three attempts
        assert!(start.elapsed() >= Duration::from_secs(4));
        match err {
            ForoError::RetryExhausted { attempts, last_text } => {
                assert_eq!(attempts, 3);
                assert_eq!(last_text.as_deref(), Some("用户名已存在"));
            }
            other => panic!("expected RetryExhausted, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_without_text() {
        let err = check_with_retry(
            || async { negative(None) },
            RetryPolicy::new(2).with_wait_between(Duration::from_millis(10)),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            ForoError::RetryExhausted {
                attempts: 2,
                last_text: None
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_match_errors_propagate_without_retry() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();
        let err = check_with_retry(
            move || {
                let _ = calls_clone.fetch_add(1, Ordering::SeqCst);
                async {
                    Err(ForoError::Driver {
                        message: "session lost".into(),
                    })
                }
            },
            RetryPolicy::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ForoError::Driver { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_attempts_clamped_to_one() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();
        let err = check_with_retry(
            move || {
                let _ = calls_clone.fetch_add(1, Ordering::SeqCst);
                async { negative(None) }
            },
            RetryPolicy {
                max_attempts: 0,
                wait_between: Duration::ZERO,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(err, ForoError::RetryExhausted { attempts: 1, .. }));
    }
}
