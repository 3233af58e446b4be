//! Base page capability shared by every page object.

use crate::config::SuiteConfig;
use crate::driver::BrowserDriver;
use crate::locator::{BoundingBox, Locator};
use crate::result::{TellerError, TellerResult};
use crate::session::Session;
use crate::wait::{self, LoadState, WaitOptions};
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

/// Operations common to all screens, bound to one [`Session`]
#[derive(Debug, Clone)]
pub struct BasePage {
    session: Session,
}

impl BasePage {
    /// Bind to a session
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    /// The underlying session
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Suite configuration
    #[must_use]
    pub fn config(&self) -> &SuiteConfig {
        self.session.config()
    }

    fn driver(&self) -> TellerResult<&dyn BrowserDriver> {
        self.session.driver()
    }

    /// Bound an engine call by the action timeout
    async fn bounded<T>(
        &self,
        what: &str,
        op: impl Future<Output = TellerResult<T>>,
    ) -> TellerResult<T> {
        let timeout = self.config().action_timeout();
        tokio::time::timeout(timeout, op).await.map_err(|_| TellerError::Timeout {
            ms: timeout.as_millis() as u64,
            waited_for: what.to_string(),
        })?
    }

    // =========================================================================
    // Navigation and readiness
    // =========================================================================

    /// Navigate to `url`, resolved against the base URL when relative
    pub async fn navigate(&self, url: &str) -> TellerResult<()> {
        let target = self.config().resolve_url(url);
        let timeout = self.config().navigation_timeout();
        tracing::info!(url = %target, "navigate");
        let driver = self.driver()?;
        match tokio::time::timeout(timeout, driver.navigate(&target)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err @ TellerError::Navigation { .. })) => Err(err),
            Ok(Err(other)) => Err(TellerError::Navigation {
                url: target,
                message: other.to_string(),
            }),
            Err(_) => Err(TellerError::Navigation {
                url: target,
                message: format!("no response within {}ms", timeout.as_millis()),
            }),
        }
    }

    /// Wait until the document is parsed and the network is idle
    pub async fn wait_for_page_load(&self) -> TellerResult<()> {
        self.wait_for_load_state(LoadState::DomContentLoaded).await?;
        self.wait_for_load_state(LoadState::NetworkIdle).await
    }

    /// Wait for a single load state, bounded by the navigation timeout
    pub async fn wait_for_load_state(&self, state: LoadState) -> TellerResult<()> {
        let driver = self.driver()?;
        let options = self.config().wait_options(self.config().navigation_timeout_ms);
        wait::wait_for(state.event_name(), &options, || driver.load_state_reached(state)).await?;
        Ok(())
    }

    /// Current document URL
    pub async fn current_url(&self) -> TellerResult<String> {
        self.driver()?.current_url().await
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Whether the element is visible; absent elements are not visible
    pub async fn is_element_visible(&self, locator: &Locator) -> TellerResult<bool> {
        self.driver()?.is_visible(locator.selector()).await
    }

    /// Trimmed text content, empty when the element or its text is missing
    pub async fn get_element_text(&self, locator: &Locator) -> TellerResult<String> {
        let text = self.driver()?.text_content(locator.selector()).await?;
        Ok(text.map(|t| t.trim().to_string()).unwrap_or_default())
    }

    /// Wait until the element is visible
    pub async fn wait_for_element(&self, locator: &Locator, timeout: Duration) -> TellerResult<()> {
        let driver = self.driver()?;
        let options = self.config().wait_options(timeout.as_millis() as u64);
        let waited_for = format!("{locator} to be visible");
        wait::wait_for(&waited_for, &options, || driver.is_visible(locator.selector())).await?;
        Ok(())
    }

    /// Number of matches
    pub async fn count(&self, locator: &Locator) -> TellerResult<usize> {
        self.driver()?.count(locator.selector()).await
    }

    /// Trimmed text of every match, in document order
    pub async fn all_texts(&self, locator: &Locator) -> TellerResult<Vec<String>> {
        let texts = self.driver()?.all_text_contents(locator.selector()).await?;
        Ok(texts.into_iter().map(|t| t.trim().to_string()).collect())
    }

    /// Trimmed labels of a `<select>` element's options
    pub async fn option_texts(&self, select: &Locator) -> TellerResult<Vec<String>> {
        self.all_texts(&select.descendant("option")).await
    }

    /// Current value of a form control
    pub async fn input_value(&self, locator: &Locator) -> TellerResult<String> {
        self.driver()?.input_value(locator.selector()).await
    }

    /// Native validation message of a form control (empty when valid)
    pub async fn validation_message(&self, locator: &Locator) -> TellerResult<String> {
        self.driver()?.validation_message(locator.selector()).await
    }

    /// Computed CSS property value
    pub async fn computed_style(&self, locator: &Locator, property: &str) -> TellerResult<String> {
        self.driver()?.computed_style(locator.selector(), property).await
    }

    /// Layout box, `None` when absent or not rendered
    pub async fn bounding_box(&self, locator: &Locator) -> TellerResult<Option<BoundingBox>> {
        self.driver()?.bounding_box(locator.selector()).await
    }

    // =========================================================================
    // Interactions
    // =========================================================================

    /// Click the element
    pub async fn click(&self, locator: &Locator) -> TellerResult<()> {
        tracing::debug!(%locator, "click");
        let driver = self.driver()?;
        self.bounded(&format!("click on {locator}"), driver.click(locator.selector()))
            .await
    }

    /// Clear the control and type `value`
    pub async fn fill(&self, locator: &Locator, value: &str) -> TellerResult<()> {
        tracing::debug!(%locator, value, "fill");
        let driver = self.driver()?;
        self.bounded(&format!("fill of {locator}"), driver.fill(locator.selector(), value))
            .await
    }

    /// Select an option by its visible label
    pub async fn select_option(&self, locator: &Locator, label: &str) -> TellerResult<()> {
        tracing::debug!(%locator, label, "select");
        let driver = self.driver()?;
        self.bounded(
            &format!("select on {locator}"),
            driver.select_option(locator.selector(), label),
        )
        .await
    }

    // =========================================================================
    // Artifacts
    // =========================================================================

    /// Save a full-page PNG as `<output_dir>/screenshots/<name>.png`
    pub async fn take_screenshot(&self, name: &str) -> TellerResult<PathBuf> {
        let shot = self.driver()?.screenshot().await?;
        let dir = self.config().output_dir.join("screenshots");
        tokio::fs::create_dir_all(&dir).await?;
        let path = dir.join(format!("{}.png", sanitize_file_name(name)));
        tokio::fs::write(&path, &shot.data).await?;
        tracing::info!(path = %path.display(), bytes = shot.size_bytes(), "screenshot saved");
        Ok(path)
    }

    /// Wait options for settle conditions
    #[must_use]
    pub fn settle_wait(&self) -> WaitOptions {
        self.config().settle_wait()
    }
}

/// Replace anything outside `[A-Za-z0-9_-]` with `-`
#[must_use]
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '-' })
        .collect();
    if cleaned.is_empty() {
        "screenshot".to_string()
    } else {
        cleaned
    }
}
