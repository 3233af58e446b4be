//! Wait Mechanisms
//!
//! Condition-based synchronization for a client-rendered application.
//!
//! Every wait polls an asynchronous probe until it holds or the deadline
//! passes. Fixed sleeps are never the primary strategy: [`wait_for`] fails
//! with [`TellerError::Timeout`], while [`wait_for_change`] is the bounded
//! fallback for transitions that expose no stable readiness signal and
//! reports expiry without failing.

use crate::result::{TellerError, TellerResult};
use std::future::Future;
use std::time::{Duration, Instant};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for wait operations (30 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 30_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

// =============================================================================
// LOAD STATE
// =============================================================================

/// Page load states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadState {
    /// Wait for `DOMContentLoaded` event
    DomContentLoaded,
    /// No application requests in flight
    NetworkIdle,
}

impl LoadState {
    /// Get the JavaScript event name for this load state
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::DomContentLoaded => "DOMContentLoaded",
            Self::NetworkIdle => "networkidle",
        }
    }
}

impl std::fmt::Display for LoadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.event_name())
    }
}

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// =============================================================================
// WAIT RESULT
// =============================================================================

/// Result of a wait operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitResult {
    /// Whether the condition was observed before the deadline
    pub success: bool,
    /// Time spent waiting
    pub elapsed: Duration,
    /// Description of what was waited for
    pub waited_for: String,
}

impl WaitResult {
    /// Create a successful wait result
    #[must_use]
    pub fn success(elapsed: Duration, waited_for: impl Into<String>) -> Self {
        Self {
            success: true,
            elapsed,
            waited_for: waited_for.into(),
        }
    }

    /// Create an expired wait result
    #[must_use]
    pub fn expired(elapsed: Duration, waited_for: impl Into<String>) -> Self {
        Self {
            success: false,
            elapsed,
            waited_for: waited_for.into(),
        }
    }
}

// =============================================================================
// POLLING
// =============================================================================

/// Poll `probe` until it returns `true`.
///
/// Probe errors abort the wait immediately. Expiry is
/// [`TellerError::Timeout`].
pub async fn wait_for<F, Fut>(
    waited_for: &str,
    options: &WaitOptions,
    mut probe: F,
) -> TellerResult<WaitResult>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = TellerResult<bool>>,
{
    let start = Instant::now();
    loop {
        if probe().await? {
            tracing::trace!(
                waited_for,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "wait satisfied"
            );
            return Ok(WaitResult::success(start.elapsed(), waited_for));
        }
        if !pause(start, options).await {
            tracing::debug!(waited_for, timeout_ms = options.timeout_ms, "wait timed out");
            return Err(TellerError::Timeout {
                ms: options.timeout_ms,
                waited_for: waited_for.to_string(),
            });
        }
    }
}

/// Poll `probe` until its value differs from `before`.
///
/// Expiry is not an error: the returned [`WaitResult`] reports
/// `success == false` and the caller proceeds.
pub async fn wait_for_change<T, F, Fut>(
    waited_for: &str,
    before: &T,
    options: &WaitOptions,
    mut probe: F,
) -> TellerResult<WaitResult>
where
    T: PartialEq,
    F: FnMut() -> Fut,
    Fut: Future<Output = TellerResult<T>>,
{
    let start = Instant::now();
    loop {
        if probe().await? != *before {
            return Ok(WaitResult::success(start.elapsed(), waited_for));
        }
        if !pause(start, options).await {
            tracing::debug!(waited_for, fallback_ms = options.timeout_ms, "no change observed");
            return Ok(WaitResult::expired(start.elapsed(), waited_for));
        }
    }
}

/// Sleep one poll interval, clamped to the deadline. Returns `false` once
/// the deadline has passed.
async fn pause(start: Instant, options: &WaitOptions) -> bool {
    let elapsed = start.elapsed();
    let timeout = options.timeout();
    if elapsed >= timeout {
        return false;
    }
    let step = options.poll_interval().min(timeout - elapsed);
    tokio::time::sleep(step).await;
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    mod load_state_tests {
        use super::*;

        #[test]
        fn test_load_state_event_names() {
            assert_eq!(LoadState::DomContentLoaded.event_name(), "DOMContentLoaded");
            assert_eq!(LoadState::NetworkIdle.event_name(), "networkidle");
        }

        #[test]
        fn test_load_state_display() {
            assert_eq!(format!("{}", LoadState::NetworkIdle), "networkidle");
        }
    }

    mod wait_options_tests {
        use super::*;

        #[test]
        fn test_wait_options_default() {
            let opts = WaitOptions::default();
            assert_eq!(opts.timeout_ms, DEFAULT_WAIT_TIMEOUT_MS);
            assert_eq!(opts.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
        }

        #[test]
        fn test_wait_options_chained() {
            let opts = WaitOptions::new().with_timeout(500).with_poll_interval(10);
            assert_eq!(opts.timeout(), Duration::from_millis(500));
            assert_eq!(opts.poll_interval(), Duration::from_millis(10));
        }
    }

    mod wait_for_tests {
        use super::*;

        #[tokio::test]
        async fn test_immediate_success() {
            let opts = WaitOptions::new().with_timeout(100).with_poll_interval(5);
            let result = wait_for("always", &opts, || async { Ok(true) }).await.unwrap();
            assert!(result.success);
            assert_eq!(result.waited_for, "always");
        }

        #[tokio::test]
        async fn test_becomes_true() {
            let polls = AtomicUsize::new(0);
            let opts = WaitOptions::new().with_timeout(1_000).with_poll_interval(5);
            let result = wait_for("third poll", &opts, || {
                let n = polls.fetch_add(1, Ordering::SeqCst);
                async move { Ok(n >= 2) }
            })
            .await
            .unwrap();
            assert!(result.success);
            assert_eq!(polls.load(Ordering::SeqCst), 3);
        }

        #[tokio::test]
        async fn test_timeout() {
            let opts = WaitOptions::new().with_timeout(30).with_poll_interval(5);
            let err = wait_for("never", &opts, || async { Ok(false) }).await.unwrap_err();
            match err {
                TellerError::Timeout { ms, waited_for } => {
                    assert_eq!(ms, 30);
                    assert_eq!(waited_for, "never");
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[tokio::test]
        async fn test_probe_error_aborts() {
            let opts = WaitOptions::new().with_timeout(1_000).with_poll_interval(5);
            let err = wait_for("broken", &opts, || async {
                Err::<bool, _>(TellerError::driver("boom"))
            })
            .await
            .unwrap_err();
            assert!(matches!(err, TellerError::Driver { .. }));
        }
    }

    mod wait_for_change_tests {
        use super::*;

        #[tokio::test]
        async fn test_change_observed() {
            let polls = AtomicUsize::new(0);
            let opts = WaitOptions::new().with_timeout(1_000).with_poll_interval(5);
            let before = vec!["a".to_string(), "b".to_string()];
            let result = wait_for_change("reorder", &before, &opts, || {
                let n = polls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Ok(vec!["a".to_string(), "b".to_string()])
                    } else {
                        Ok(vec!["b".to_string(), "a".to_string()])
                    }
                }
            })
            .await
            .unwrap();
            assert!(result.success);
        }

        #[tokio::test]
        async fn test_expiry_is_not_an_error() {
            let opts = WaitOptions::new().with_timeout(20).with_poll_interval(5);
            let result = wait_for_change("static", &3_usize, &opts, || async { Ok(3_usize) })
                .await
                .unwrap();
            assert!(!result.success);
            assert!(result.elapsed >= Duration::from_millis(20));
        }
    }
}
