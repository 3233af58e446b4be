//! Dialog Handling
//!
//! Native dialogs (alert, confirm, prompt, beforeunload) block the page
//! until answered. [`DialogInterceptor::arm_one_shot`] turns the next dialog
//! event into an awaitable [`DialogCapture`]:
//!
//! 1. arm: the event subscription is installed before returning
//! 2. trigger the UI action that opens the dialog
//! 3. await the capture, which resolves once the dialog has been answered
//!
//! The capture has no timeout of its own; use [`DialogCapture::within`].

use crate::driver::BrowserDriver;
use crate::result::{TellerError, TellerResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, oneshot};

/// Type of browser dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogType {
    /// Alert dialog (OK button only)
    Alert,
    /// Confirm dialog (OK/Cancel buttons)
    Confirm,
    /// Prompt dialog (text input + OK/Cancel)
    Prompt,
    /// Before unload dialog (Leave/Stay buttons)
    BeforeUnload,
}

impl std::fmt::Display for DialogType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Alert => write!(f, "alert"),
            Self::Confirm => write!(f, "confirm"),
            Self::Prompt => write!(f, "prompt"),
            Self::BeforeUnload => write!(f, "beforeunload"),
        }
    }
}

/// Action taken on a dialog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogAction {
    /// Dialog was accepted (OK/Yes/Leave)
    Accept,
    /// Dialog was accepted with input text (for prompts)
    AcceptWith(String),
    /// Dialog was dismissed (Cancel/No/Stay)
    Dismiss,
    /// Dialog is pending (not yet handled)
    Pending,
}

/// Represents a browser dialog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dialog {
    /// Type of dialog
    dialog_type: DialogType,
    /// Message displayed in the dialog
    message: String,
    /// Default value (for prompt dialogs)
    default_value: Option<String>,
    /// Action taken
    action: DialogAction,
}

impl Dialog {
    /// Create a new dialog
    #[must_use]
    pub fn new(dialog_type: DialogType, message: impl Into<String>) -> Self {
        Self {
            dialog_type,
            message: message.into(),
            default_value: None,
            action: DialogAction::Pending,
        }
    }

    /// Create an alert dialog
    #[must_use]
    pub fn alert(message: impl Into<String>) -> Self {
        Self::new(DialogType::Alert, message)
    }

    /// Create a prompt dialog
    #[must_use]
    pub fn prompt(message: impl Into<String>, default: Option<String>) -> Self {
        let mut dialog = Self::new(DialogType::Prompt, message);
        dialog.default_value = default;
        dialog
    }

    /// Get dialog type
    #[must_use]
    pub fn dialog_type(&self) -> DialogType {
        self.dialog_type
    }

    /// Get dialog message
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get default value (for prompts)
    #[must_use]
    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    /// Get action taken
    #[must_use]
    pub fn action(&self) -> &DialogAction {
        &self.action
    }

    /// Check if dialog was handled
    #[must_use]
    pub fn is_handled(&self) -> bool {
        !matches!(self.action, DialogAction::Pending)
    }

    /// Trailing number of the message, e.g. the id in
    /// `"Customer added successfully with customer id :6"`
    #[must_use]
    pub fn trailing_number(&self) -> Option<u64> {
        extract_trailing_number(&self.message)
    }
}

/// How an intercepted dialog is answered
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DialogResponse {
    /// Press OK
    #[default]
    Accept,
    /// Press OK after typing into a prompt
    AcceptWith(String),
    /// Press Cancel
    Dismiss,
}

impl DialogResponse {
    async fn answer(&self, driver: &dyn BrowserDriver, dialog: &mut Dialog) -> TellerResult<()> {
        match self {
            Self::Accept => {
                driver.accept_dialog(None).await?;
                dialog.action = DialogAction::Accept;
            }
            Self::AcceptWith(text) => {
                driver.accept_dialog(Some(text.clone())).await?;
                dialog.action = DialogAction::AcceptWith(text.clone());
            }
            Self::Dismiss => {
                driver.dismiss_dialog().await?;
                dialog.action = DialogAction::Dismiss;
            }
        }
        Ok(())
    }
}

/// Every dialog a session has answered, oldest first
#[derive(Debug, Clone, Default)]
pub struct DialogLog {
    dialogs: Arc<Mutex<Vec<Dialog>>>,
}

impl DialogLog {
    /// Create an empty log
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, dialog: Dialog) {
        if let Ok(mut dialogs) = self.dialogs.lock() {
            dialogs.push(dialog);
        }
    }

    /// Snapshot of recorded dialogs
    #[must_use]
    pub fn dialogs(&self) -> Vec<Dialog> {
        self.dialogs.lock().map(|d| d.clone()).unwrap_or_default()
    }

    /// Most recent dialog
    #[must_use]
    pub fn last(&self) -> Option<Dialog> {
        self.dialogs.lock().ok().and_then(|d| d.last().cloned())
    }

    /// Number of recorded dialogs
    #[must_use]
    pub fn len(&self) -> usize {
        self.dialogs.lock().map(|d| d.len()).unwrap_or(0)
    }

    /// Whether nothing has been recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One-shot dialog capture for a session.
///
/// At most one capture may be armed per session at a time.
#[derive(Clone)]
pub struct DialogInterceptor {
    driver: Arc<dyn BrowserDriver>,
    armed: Arc<AtomicBool>,
    log: DialogLog,
}

impl std::fmt::Debug for DialogInterceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogInterceptor")
            .field("armed", &self.is_armed())
            .field("captured", &self.log.len())
            .finish_non_exhaustive()
    }
}

impl DialogInterceptor {
    pub(crate) fn new(
        driver: Arc<dyn BrowserDriver>,
        armed: Arc<AtomicBool>,
        log: DialogLog,
    ) -> Self {
        Self { driver, armed, log }
    }

    /// Whether a capture is currently armed
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::SeqCst)
    }

    /// Arm a capture that accepts the next dialog
    pub fn arm_one_shot(&self) -> TellerResult<DialogCapture> {
        self.arm_one_shot_with(DialogResponse::Accept)
    }

    /// Arm a capture that answers the next dialog with `response`.
    ///
    /// Fails with [`TellerError::DialogAlreadyArmed`] while another capture
    /// is live. Dropping the returned capture disarms it.
    pub fn arm_one_shot_with(&self, response: DialogResponse) -> TellerResult<DialogCapture> {
        if self.armed.swap(true, Ordering::SeqCst) {
            return Err(TellerError::DialogAlreadyArmed);
        }
        let mut events = self.driver.subscribe_dialogs();
        let (mut tx, rx) = oneshot::channel();
        let driver = Arc::clone(&self.driver);
        let armed = Arc::clone(&self.armed);
        let log = self.log.clone();
        tracing::debug!(?response, "dialog capture armed");

        tokio::spawn(async move {
            let received = tokio::select! {
                () = tx.closed() => None,
                received = next_dialog(&mut events) => Some(received),
            };
            drop(events);
            let Some(received) = received else {
                armed.store(false, Ordering::SeqCst);
                tracing::debug!("dialog capture dropped before a dialog fired");
                return;
            };
            let outcome = match received {
                Ok(mut dialog) => response
                    .answer(driver.as_ref(), &mut dialog)
                    .await
                    .map(|()| dialog),
                Err(e) => Err(e),
            };
            if let Ok(dialog) = &outcome {
                tracing::info!(
                    kind = %dialog.dialog_type(),
                    message = dialog.message(),
                    "dialog captured"
                );
                log.record(dialog.clone());
            }
            armed.store(false, Ordering::SeqCst);
            let _ = tx.send(outcome);
        });

        Ok(DialogCapture { rx })
    }
}

async fn next_dialog(events: &mut broadcast::Receiver<Dialog>) -> TellerResult<Dialog> {
    loop {
        match events.recv().await {
            Ok(dialog) => return Ok(dialog),
            Err(RecvError::Lagged(skipped)) => tracing::warn!(skipped, "dialog events lagged"),
            Err(RecvError::Closed) => return Err(TellerError::DialogDropped),
        }
    }
}

/// Pending result of [`DialogInterceptor::arm_one_shot`]
#[derive(Debug)]
#[must_use = "a dialog capture disarms when dropped"]
pub struct DialogCapture {
    rx: oneshot::Receiver<TellerResult<Dialog>>,
}

impl DialogCapture {
    /// Await the dialog, failing with [`TellerError::Timeout`] after `timeout`
    pub async fn within(self, timeout: Duration) -> TellerResult<Dialog> {
        tokio::time::timeout(timeout, self)
            .await
            .map_err(|_| TellerError::Timeout {
                ms: timeout.as_millis() as u64,
                waited_for: "native dialog".to_string(),
            })?
    }
}

impl Future for DialogCapture {
    type Output = TellerResult<Dialog>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(_)) => Poll::Ready(Err(TellerError::DialogDropped)),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// `:<digits>` at the end of a message
static TRAILING_NUMBER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r":\s*(\d+)\s*$").ok());

/// Parse the number that ends a dialog message, as in
/// `"Account created successfully with account Number :1016"`.
#[must_use]
pub fn extract_trailing_number(message: &str) -> Option<u64> {
    TRAILING_NUMBER
        .as_ref()?
        .captures(message)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::SuiteConfig;
    use crate::locator::Selector;
    use crate::simulator::BankSimulator;

    fn interceptor(sim: &Arc<BankSimulator>) -> (DialogInterceptor, DialogLog) {
        let log = DialogLog::new();
        let driver: Arc<dyn BrowserDriver> = Arc::clone(sim) as Arc<dyn BrowserDriver>;
        let armed = Arc::new(AtomicBool::new(false));
        let interceptor = DialogInterceptor::new(driver, armed, log.clone());
        (interceptor, log)
    }

    mod dialog_tests {
        use super::*;

        #[test]
        fn test_alert() {
            let dialog = Dialog::alert("Hello");
            assert_eq!(dialog.dialog_type(), DialogType::Alert);
            assert_eq!(dialog.message(), "Hello");
            assert!(!dialog.is_handled());
        }

        #[test]
        fn test_prompt_default() {
            let dialog = Dialog::prompt("Name?", Some("Harry".to_string()));
            assert_eq!(dialog.default_value(), Some("Harry"));
        }

        #[test]
        fn test_type_display() {
            assert_eq!(DialogType::BeforeUnload.to_string(), "beforeunload");
        }
    }

    mod trailing_number_tests {
        use super::*;

        #[test]
        fn test_customer_id() {
            assert_eq!(
                extract_trailing_number("Customer added successfully with customer id :6"),
                Some(6)
            );
        }

        #[test]
        fn test_account_number_with_space() {
            assert_eq!(
                extract_trailing_number("Account created successfully with account Number : 1016 "),
                Some(1016)
            );
        }

        #[test]
        fn test_no_number() {
            assert_eq!(
                extract_trailing_number("Please check the details. Customer may be duplicate."),
                None
            );
            assert_eq!(Dialog::alert("id :x").trailing_number(), None);
        }

        #[test]
        fn test_pattern_compiled_once_and_reused() {
            assert!(TRAILING_NUMBER.is_some());
            for id in [1_u64, 42, 1016] {
                let message = format!("Customer added successfully with customer id :{id}");
                assert_eq!(extract_trailing_number(&message), Some(id));
            }
        }
    }

    mod interceptor_tests {
        use super::*;

        #[tokio::test]
        async fn test_round_trip_accepts_dialog() {
            let sim = Arc::new(BankSimulator::new(&SuiteConfig::default()));
            let (interceptor, log) = interceptor(&sim);

            let capture = interceptor.arm_one_shot().unwrap();
            assert!(interceptor.is_armed());
            sim.raise_alert("Account created successfully with account Number :1016");

            let dialog = capture.within(Duration::from_secs(2)).await.unwrap();
            assert_eq!(dialog.message(), "Account created successfully with account Number :1016");
            assert_eq!(dialog.action(), &DialogAction::Accept);
            assert!(!sim.has_open_dialog());
            assert!(!interceptor.is_armed());
            assert_eq!(log.len(), 1);
        }

        #[tokio::test]
        async fn test_second_arm_is_rejected() {
            let sim = Arc::new(BankSimulator::new(&SuiteConfig::default()));
            let (interceptor, _) = interceptor(&sim);

            let _first = interceptor.arm_one_shot().unwrap();
            let err = interceptor.arm_one_shot().unwrap_err();
            assert!(matches!(err, TellerError::DialogAlreadyArmed));
        }

        #[tokio::test]
        async fn test_rearm_after_capture() {
            let sim = Arc::new(BankSimulator::new(&SuiteConfig::default()));
            let (interceptor, log) = interceptor(&sim);

            for message in ["first", "second"] {
                let capture = interceptor.arm_one_shot().unwrap();
                sim.raise_alert(message);
                let dialog = capture.within(Duration::from_secs(2)).await.unwrap();
                assert_eq!(dialog.message(), message);
            }
            let messages: Vec<String> =
                log.dialogs().iter().map(|d| d.message().to_string()).collect();
            assert_eq!(messages, ["first", "second"]);
        }

        #[tokio::test]
        async fn test_dismiss_response() {
            let sim = Arc::new(BankSimulator::new(&SuiteConfig::default()));
            let (interceptor, log) = interceptor(&sim);

            let capture = interceptor.arm_one_shot_with(DialogResponse::Dismiss).unwrap();
            sim.raise_alert("Leave?");
            let dialog = capture.within(Duration::from_secs(2)).await.unwrap();
            assert_eq!(dialog.action(), &DialogAction::Dismiss);
            assert!(!sim.has_open_dialog());
            assert_eq!(log.last().unwrap().message(), "Leave?");
        }

        #[tokio::test]
        async fn test_no_dialog_times_out_and_disarms() {
            let sim = Arc::new(BankSimulator::new(&SuiteConfig::default()));
            let (interceptor, _) = interceptor(&sim);

            let capture = interceptor.arm_one_shot().unwrap();
            let err = capture.within(Duration::from_millis(30)).await.unwrap_err();
            assert!(err.is_timeout());

            // the spawned listener notices the dropped capture
            for _ in 0..100 {
                if !interceptor.is_armed() {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            assert!(!interceptor.is_armed());
        }

        #[tokio::test]
        async fn test_dialog_before_arming_is_not_captured() {
            let sim = Arc::new(BankSimulator::new(&SuiteConfig::default()));
            let (interceptor, _) = interceptor(&sim);

            sim.raise_alert("too early");
            sim.accept_dialog(None).await.unwrap();
            let capture = interceptor.arm_one_shot().unwrap();
            let err = capture.within(Duration::from_millis(30)).await.unwrap_err();
            assert!(err.is_timeout());
            assert_eq!(sim.count(&Selector::css("body")).await.unwrap(), 1);
        }
    }
}
