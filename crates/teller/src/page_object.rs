//! Page Object Model support.
//!
//! A page object wraps a [`Screen`]: the shared [`BasePage`] capability
//! plus a [`LocatorRegistry`] that names the screen's elements. Near-identical
//! screens differ only in their registry, so page objects declare selectors
//! once and address them by name.
//!
//! ```ignore
//! let registry = LocatorRegistry::builder()
//!     .defining("amount", Selector::css(r#"input[ng-model="amount"]"#))
//!     .defining("submit", Selector::css_with_text(r#"button[type="submit"]"#, "Deposit"))
//!     .with_locator("message", Selector::css(r#"span[ng-show="message"]"#))
//!     .build();
//! let screen = Screen::new(session, registry);
//! screen.fill("amount", "100").await?;
//! ```

use crate::locator::{Locator, Selector};
use crate::page::BasePage;
use crate::result::{TellerError, TellerResult};
use crate::session::Session;
use crate::wait;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Contract every page object satisfies.
#[async_trait]
pub trait PageObject: Send + Sync {
    /// The screen this page object drives
    fn screen(&self) -> &Screen;

    /// Name used in logs
    fn page_name(&self) -> &'static str;

    /// Whether every defining element is visible
    async fn is_loaded(&self) -> TellerResult<bool> {
        self.screen().is_loaded().await
    }
}

// =============================================================================
// Registry
// =============================================================================

/// Declarative name → selector table for one screen.
#[derive(Debug, Clone, Default)]
pub struct LocatorRegistry {
    locators: HashMap<String, Locator>,
    defining: Vec<String>,
}

impl LocatorRegistry {
    /// Start building a registry
    #[must_use]
    pub fn builder() -> LocatorRegistryBuilder {
        LocatorRegistryBuilder::default()
    }

    /// Look up a locator by name
    pub fn locator(&self, name: &str) -> TellerResult<Locator> {
        self.locators.get(name).cloned().ok_or_else(|| TellerError::InvalidSelector {
            selector: name.to_string(),
            message: "no locator registered under this name".to_string(),
        })
    }

    /// Names of the elements whose visibility defines "loaded", in
    /// declaration order
    #[must_use]
    pub fn defining_names(&self) -> &[String] {
        &self.defining
    }

    /// Whether `name` is registered
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.locators.contains_key(name)
    }

    /// Number of registered locators
    #[must_use]
    pub fn len(&self) -> usize {
        self.locators.len()
    }

    /// Whether the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locators.is_empty()
    }
}

/// Builder for [`LocatorRegistry`]
#[derive(Debug, Clone, Default)]
pub struct LocatorRegistryBuilder {
    registry: LocatorRegistry,
}

impl LocatorRegistryBuilder {
    /// Register a locator that takes part in the `is_loaded` check
    #[must_use]
    pub fn defining(mut self, name: impl Into<String>, selector: Selector) -> Self {
        let name = name.into();
        if !self.registry.defining.contains(&name) {
            self.registry.defining.push(name.clone());
        }
        let _ = self
            .registry
            .locators
            .insert(name, Locator::from_selector(selector));
        self
    }

    /// Register a plain locator
    #[must_use]
    pub fn with_locator(mut self, name: impl Into<String>, selector: Selector) -> Self {
        let _ = self
            .registry
            .locators
            .insert(name.into(), Locator::from_selector(selector));
        self
    }

    /// Finish building
    #[must_use]
    pub fn build(self) -> LocatorRegistry {
        self.registry
    }
}

// =============================================================================
// Screen
// =============================================================================

/// Base capability plus a locator registry, addressed by element name.
#[derive(Debug, Clone)]
pub struct Screen {
    base: BasePage,
    registry: Arc<LocatorRegistry>,
}

impl Screen {
    /// Bind a registry to a session
    #[must_use]
    pub fn new(session: Session, registry: LocatorRegistry) -> Self {
        Self {
            base: BasePage::new(session),
            registry: Arc::new(registry),
        }
    }

    /// Shared base capability
    #[must_use]
    pub fn base(&self) -> &BasePage {
        &self.base
    }

    /// The registry
    #[must_use]
    pub fn registry(&self) -> &LocatorRegistry {
        &self.registry
    }

    /// Resolve a registered name to its locator
    pub fn locator(&self, name: &str) -> TellerResult<Locator> {
        self.registry.locator(name)
    }

    /// Conjunction of visibility over the defining elements
    pub async fn is_loaded(&self) -> TellerResult<bool> {
        for name in self.registry.defining_names() {
            if !self.base.is_element_visible(&self.locator(name)?).await? {
                tracing::trace!(element = %name, "defining element not visible");
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Wait until [`Screen::is_loaded`] holds, bounded by the settle timeout
    pub async fn wait_loaded(&self, page_name: &str) -> TellerResult<()> {
        let options = self.base.settle_wait();
        let waited_for = format!("{page_name} to load");
        wait::wait_for(&waited_for, &options, || self.is_loaded()).await?;
        Ok(())
    }

    /// Wait until the named element is visible, bounded by the settle timeout
    pub async fn wait_visible(&self, name: &str) -> TellerResult<()> {
        let locator = self.locator(name)?;
        self.base
            .wait_for_element(&locator, self.base.settle_wait().timeout())
            .await
    }

    /// Click the named element
    pub async fn click(&self, name: &str) -> TellerResult<()> {
        self.base.click(&self.locator(name)?).await
    }

    /// Clear and fill the named control
    pub async fn fill(&self, name: &str, value: &str) -> TellerResult<()> {
        self.base.fill(&self.locator(name)?, value).await
    }

    /// Select an option of the named `<select>` by label
    pub async fn select(&self, name: &str, label: &str) -> TellerResult<()> {
        self.base.select_option(&self.locator(name)?, label).await
    }

    /// Whether the named element is visible
    pub async fn is_visible(&self, name: &str) -> TellerResult<bool> {
        self.base.is_element_visible(&self.locator(name)?).await
    }

    /// Trimmed text of the named element, empty when absent
    pub async fn text(&self, name: &str) -> TellerResult<String> {
        self.base.get_element_text(&self.locator(name)?).await
    }

    /// Current value of the named control
    pub async fn value(&self, name: &str) -> TellerResult<String> {
        self.base.input_value(&self.locator(name)?).await
    }

    /// Native validation message of the named control
    pub async fn validation_message(&self, name: &str) -> TellerResult<String> {
        self.base.validation_message(&self.locator(name)?).await
    }

    /// Option labels of the named `<select>`
    pub async fn options(&self, name: &str) -> TellerResult<Vec<String>> {
        self.base.option_texts(&self.locator(name)?).await
    }

    /// Number of matches of the named locator
    pub async fn count(&self, name: &str) -> TellerResult<usize> {
        self.base.count(&self.locator(name)?).await
    }
}
