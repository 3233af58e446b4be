//! Session handle: one browser tab, shared by every page object of a test.

use crate::config::SuiteConfig;
use crate::dialog::{DialogInterceptor, DialogLog};
use crate::driver::BrowserDriver;
use crate::result::{TellerError, TellerResult};
use crate::simulator::BankSimulator;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Cheap-to-clone handle over one browser tab.
///
/// Clones share the tab. Page objects hold clones but never close them;
/// the scenario runner (or an explicit [`Session::close`]) does.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    id: Uuid,
    driver: Arc<dyn BrowserDriver>,
    config: SuiteConfig,
    dialog_armed: Arc<AtomicBool>,
    dialogs: DialogLog,
    closed: AtomicBool,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.inner.id)
            .field("engine", &self.inner.driver.engine())
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Wrap an already-open driver
    #[must_use]
    pub fn new(driver: Arc<dyn BrowserDriver>, config: SuiteConfig) -> Self {
        let id = Uuid::new_v4();
        tracing::debug!(%id, engine = %driver.engine(), "session opened");
        Self {
            inner: Arc::new(SessionInner {
                id,
                driver,
                config,
                dialog_armed: Arc::new(AtomicBool::new(false)),
                dialogs: DialogLog::new(),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Session over a fresh in-process [`BankSimulator`]
    #[must_use]
    pub fn simulated(config: SuiteConfig) -> Self {
        let driver = Arc::new(BankSimulator::new(&config));
        Self::new(driver, config)
    }

    /// Launch Chromium over CDP and open one tab
    #[cfg(feature = "browser")]
    pub async fn launch(config: &SuiteConfig) -> TellerResult<Self> {
        let driver_config = crate::driver::DriverConfig::from(config);
        let driver = crate::browser::CdpDriver::launch(driver_config).await?;
        Ok(Self::new(Arc::new(driver), config.clone()))
    }

    /// Session identifier used in logs and artifact names
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// Suite configuration
    #[must_use]
    pub fn config(&self) -> &SuiteConfig {
        &self.inner.config
    }

    /// The driver, unless the session was closed
    pub fn driver(&self) -> TellerResult<&dyn BrowserDriver> {
        if self.is_closed() {
            return Err(TellerError::SessionClosed);
        }
        Ok(self.inner.driver.as_ref())
    }

    /// Dialog interceptor bound to this tab
    #[must_use]
    pub fn dialog_interceptor(&self) -> DialogInterceptor {
        DialogInterceptor::new(
            Arc::clone(&self.inner.driver),
            Arc::clone(&self.inner.dialog_armed),
            self.inner.dialogs.clone(),
        )
    }

    /// Dialogs answered so far
    #[must_use]
    pub fn dialog_log(&self) -> &DialogLog {
        &self.inner.dialogs
    }

    /// Whether [`Session::close`] has run
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Release the tab. Later calls are no-ops.
    pub async fn close(&self) -> TellerResult<()> {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        tracing::debug!(id = %self.inner.id, "session closed");
        self.inner.driver.close().await
    }
}
