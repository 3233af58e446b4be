//! Scenario runner: fresh session per attempt, overall timeout, retries and
//! screenshot-on-failure.
//!
//! ```ignore
//! run_simulated("deposit", &SuiteConfig::default(), |pages| async move {
//!     pages.home().goto().await?;
//!     Ok(())
//! })
//! .await?;
//! ```

use crate::config::SuiteConfig;
use crate::page::BasePage;
use crate::pages::Pages;
use crate::result::{TellerError, TellerResult};
use crate::session::Session;
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Result of one attempt of a scenario
#[derive(Debug, Clone)]
pub struct AttemptResult {
    /// 1-based attempt number
    pub attempt: u32,
    /// Whether the attempt passed
    pub passed: bool,
    /// Error or panic message if failed
    pub error: Option<String>,
    /// Attempt duration
    pub duration: Duration,
    /// Screenshot captured on failure
    pub screenshot: Option<PathBuf>,
}

impl AttemptResult {
    /// Create a passing attempt
    #[must_use]
    pub const fn pass(attempt: u32) -> Self {
        Self {
            attempt,
            passed: true,
            error: None,
            duration: Duration::ZERO,
            screenshot: None,
        }
    }

    /// Create a failing attempt
    #[must_use]
    pub fn fail(attempt: u32, error: impl Into<String>) -> Self {
        Self {
            attempt,
            passed: false,
            error: Some(error.into()),
            duration: Duration::ZERO,
            screenshot: None,
        }
    }

    /// Set duration
    #[must_use]
    pub const fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// Every attempt of one scenario
#[derive(Debug, Clone)]
pub struct ScenarioReport {
    /// Scenario name
    pub name: String,
    /// Attempts in order
    pub attempts: Vec<AttemptResult>,
}

impl ScenarioReport {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attempts: Vec::new(),
        }
    }

    /// Whether the last attempt passed
    #[must_use]
    pub fn passed(&self) -> bool {
        self.attempts.last().is_some_and(|a| a.passed)
    }

    /// Number of attempts made
    #[must_use]
    pub fn attempt_count(&self) -> usize {
        self.attempts.len()
    }

    /// Failed attempts
    #[must_use]
    pub fn failures(&self) -> Vec<&AttemptResult> {
        self.attempts.iter().filter(|a| !a.passed).collect()
    }

    /// Total time across attempts
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.attempts.iter().map(|a| a.duration).sum()
    }
}

enum Outcome {
    Passed,
    Failed(TellerError),
    Panicked(Box<dyn Any + Send>),
}

impl Outcome {
    fn message(&self) -> Option<String> {
        match self {
            Self::Passed => None,
            Self::Failed(e) => Some(e.to_string()),
            Self::Panicked(payload) => Some(panic_message(payload.as_ref())),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}

/// Run `body` against a fresh session from `factory`, up to
/// `1 + config.retries` times.
///
/// Each attempt runs under `config.test_timeout()`. A failed attempt gets a
/// screenshot when `config.screenshot_on_failure` is set, and its session is
/// closed whether the body passed, failed, panicked or timed out. When the
/// final attempt panicked the panic is resumed; otherwise its error is
/// returned.
pub async fn run_scenario<F, SFut, B, BFut>(
    name: &str,
    config: &SuiteConfig,
    factory: F,
    body: B,
) -> TellerResult<ScenarioReport>
where
    F: Fn(SuiteConfig) -> SFut,
    SFut: Future<Output = TellerResult<Session>>,
    B: Fn(Pages) -> BFut,
    BFut: Future<Output = TellerResult<()>>,
{
    let total = config.retries.saturating_add(1);
    let mut report = ScenarioReport::new(name);

    for attempt in 1..=total {
        let start = Instant::now();
        tracing::info!(scenario = name, attempt, of = total, "scenario attempt");

        let session = factory(config.clone()).await?;
        let run = AssertUnwindSafe(body(Pages::new(session.clone()))).catch_unwind();
        let outcome = match tokio::time::timeout(config.test_timeout(), run).await {
            Ok(Ok(Ok(()))) => Outcome::Passed,
            Ok(Ok(Err(e))) => Outcome::Failed(e),
            Ok(Err(payload)) => Outcome::Panicked(payload),
            Err(_) => Outcome::Failed(TellerError::Timeout {
                ms: config.test_timeout_ms,
                waited_for: format!("scenario {name}"),
            }),
        };

        let mut result = match outcome.message() {
            None => AttemptResult::pass(attempt),
            Some(message) => {
                tracing::warn!(
                    scenario = name,
                    attempt,
                    error = %message,
                    "scenario attempt failed"
                );
                AttemptResult::fail(attempt, message)
            }
        };
        if !result.passed && config.screenshot_on_failure {
            result.screenshot = capture_failure(&session, name, attempt).await;
        }
        if let Err(e) = session.close().await {
            tracing::warn!(scenario = name, error = %e, "closing session failed");
        }
        report.attempts.push(result.with_duration(start.elapsed()));

        match outcome {
            Outcome::Passed => return Ok(report),
            _ if attempt < total => {}
            Outcome::Failed(e) => return Err(e),
            Outcome::Panicked(payload) => std::panic::resume_unwind(payload),
        }
    }

    Ok(report)
}

/// [`run_scenario`] over in-process simulated sessions
pub async fn run_simulated<B, BFut>(
    name: &str,
    config: &SuiteConfig,
    body: B,
) -> TellerResult<ScenarioReport>
where
    B: Fn(Pages) -> BFut,
    BFut: Future<Output = TellerResult<()>>,
{
    run_scenario(name, config, |config| async move { Ok(Session::simulated(config)) }, body).await
}

/// [`run_scenario`] over Chromium sessions
#[cfg(feature = "browser")]
pub async fn run_in_browser<B, BFut>(
    name: &str,
    config: &SuiteConfig,
    body: B,
) -> TellerResult<ScenarioReport>
where
    B: Fn(Pages) -> BFut,
    BFut: Future<Output = TellerResult<()>>,
{
    run_scenario(name, config, |config| async move { Session::launch(&config).await }, body).await
}

async fn capture_failure(session: &Session, name: &str, attempt: u32) -> Option<PathBuf> {
    let shot_name = format!("{name}-attempt-{attempt}");
    match BasePage::new(session.clone()).take_screenshot(&shot_name).await {
        Ok(path) => Some(path),
        Err(e) => {
            tracing::warn!(scenario = name, error = %e, "failure screenshot not captured");
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    fn quiet_config() -> SuiteConfig {
        SuiteConfig {
            screenshot_on_failure: false,
            ..SuiteConfig::default()
        }
    }

    mod report_tests {
        use super::*;

        #[test]
        fn test_empty_report_not_passed() {
            let report = ScenarioReport::new("empty");
            assert!(!report.passed());
            assert_eq!(report.attempt_count(), 0);
            assert_eq!(report.duration(), Duration::ZERO);
        }

        #[test]
        fn test_report_counts_failures() {
            let mut report = ScenarioReport::new("flaky");
            report
                .attempts
                .push(AttemptResult::fail(1, "boom").with_duration(Duration::from_millis(30)));
            report
                .attempts
                .push(AttemptResult::pass(2).with_duration(Duration::from_millis(20)));
            assert!(report.passed());
            assert_eq!(report.failures().len(), 1);
            assert_eq!(report.failures()[0].error.as_deref(), Some("boom"));
            assert_eq!(report.duration(), Duration::from_millis(50));
        }

        #[test]
        fn test_panic_message_payloads() {
            let s: Box<dyn Any + Send> = Box::new("static");
            assert_eq!(panic_message(s.as_ref()), "static");
            let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
            assert_eq!(panic_message(owned.as_ref()), "owned");
            let other: Box<dyn Any + Send> = Box::new(7_u8);
            assert_eq!(panic_message(other.as_ref()), "panic with non-string payload");
        }
    }

    mod runner_tests {
        use super::*;

        #[tokio::test]
        async fn test_passing_scenario_single_attempt() {
            let report = run_simulated("home", &quiet_config(), |pages| async move {
                pages.home().goto().await
            })
            .await
            .unwrap();
            assert!(report.passed());
            assert_eq!(report.attempt_count(), 1);
        }

        #[tokio::test]
        async fn test_retry_until_pass() {
            let calls = Arc::new(AtomicU32::new(0));
            let report = run_simulated("flaky", &quiet_config(), |_pages| {
                let calls = Arc::clone(&calls);
                async move {
                    if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err(TellerError::driver("first attempt fails"))
                    } else {
                        Ok(())
                    }
                }
            })
            .await
            .unwrap();
            assert_eq!(report.attempt_count(), 2);
            assert!(!report.attempts[0].passed);
            assert!(report.passed());
        }

        #[tokio::test]
        async fn test_exhausted_retries_return_last_error() {
            let calls = Arc::new(AtomicU32::new(0));
            let config = quiet_config().with_retries(1);
            let err = run_simulated("always fails", &config, |_pages| {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(TellerError::driver("nope"))
                }
            })
            .await
            .unwrap_err();
            assert!(matches!(err, TellerError::Driver { .. }));
            assert_eq!(calls.load(Ordering::SeqCst), 2);
        }

        #[tokio::test]
        async fn test_timeout_preempts_and_closes() {
            let opened = Arc::new(Mutex::new(Vec::new()));
            let config = quiet_config().with_retries(0).with_test_timeout_ms(50);
            let factory = |config: SuiteConfig| {
                let opened = Arc::clone(&opened);
                async move {
                    let session = Session::simulated(config);
                    opened.lock().unwrap().push(session.clone());
                    Ok(session)
                }
            };
            let err = run_scenario("slow", &config, factory, |_pages| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await
            .unwrap_err();
            assert!(err.is_timeout());
            let opened = opened.lock().unwrap();
            assert_eq!(opened.len(), 1);
            assert!(opened[0].is_closed());
        }

        #[tokio::test]
        async fn test_panic_closes_every_session_and_resumes() {
            let opened = Arc::new(Mutex::new(Vec::new()));
            let config = quiet_config().with_retries(2);
            let factory = |config: SuiteConfig| {
                let opened = Arc::clone(&opened);
                async move {
                    let session = Session::simulated(config);
                    opened.lock().unwrap().push(session.clone());
                    Ok(session)
                }
            };
            let run = run_scenario("panics", &config, factory, |pages| async move {
                assert!(pages.session().is_closed(), "body ran on a live session");
                Ok(())
            });
            let payload = AssertUnwindSafe(run).catch_unwind().await.unwrap_err();
            assert!(panic_message(payload.as_ref()).contains("body ran on a live session"));

            let opened = opened.lock().unwrap();
            assert_eq!(opened.len(), 3);
            assert!(opened.iter().all(Session::is_closed));
        }

        #[tokio::test]
        async fn test_factory_error_propagates() {
            let err = run_scenario(
                "no browser",
                &quiet_config(),
                |_config| async {
                    Err::<Session, _>(TellerError::BrowserLaunch {
                        message: "missing".into(),
                    })
                },
                |_pages| async { Ok(()) },
            )
            .await
            .unwrap_err();
            assert!(matches!(err, TellerError::BrowserLaunch { .. }));
        }

        #[tokio::test]
        async fn test_failure_screenshot_written() {
            let dir = tempfile::tempdir().unwrap();
            let config = SuiteConfig::default()
                .with_retries(0)
                .with_output_dir(dir.path());
            let failing = run_simulated("shot on failure", &config, |pages| async move {
                pages.home().goto().await?;
                Err(TellerError::driver("assertion stand-in"))
            });
            assert!(failing.await.is_err());
            let shot = dir.path().join("screenshots").join("shot-on-failure-attempt-1.png");
            let bytes = std::fs::read(shot).unwrap();
            assert!(bytes.starts_with(&[0x89, b'P', b'N', b'G']));
        }
    }
}
