//! BrowserDriver - Abstract Browser Automation Trait
//!
//! Page objects never talk to an automation engine directly. Everything they
//! need (navigation, element queries, interactions, dialog events) goes
//! through [`BrowserDriver`], which has two implementations:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  BrowserDriver (async trait, object safe)                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌──────────────────────┐     ┌──────────────────────────┐  │
//! │  │  CdpDriver           │     │  BankSimulator           │  │
//! │  │  (`browser` feature) │     │  (always available)      │  │
//! │  │  chromiumoxide / CDP │     │  in-process, offline     │  │
//! │  └──────────────────────┘     └──────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Element operations take a [`Selector`] and resolve it on every call. When
//! several elements match, the first one in document order is used.

use crate::config::{BrowserEngine, SuiteConfig};
use crate::dialog::Dialog;
use crate::locator::{BoundingBox, Selector};
use crate::result::TellerResult;
use crate::wait::LoadState;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::broadcast;

/// PNG file signature
const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

/// Screenshot data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Screenshot {
    /// Raw PNG bytes
    pub data: Vec<u8>,
}

impl Screenshot {
    /// Create a new screenshot
    #[must_use]
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Get size in bytes
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Check if the data carries a PNG signature
    #[must_use]
    pub fn is_png(&self) -> bool {
        self.data.starts_with(&PNG_MAGIC)
    }
}

/// Launch configuration for a driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    /// Rendering engine
    pub engine: BrowserEngine,
    /// Run headless
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to the browser binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Navigation timeout
    pub navigation_timeout: Duration,
    /// Upper bound for any single element operation
    pub action_timeout: Duration,
    /// Disable the sandbox (containers/CI)
    pub sandbox: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            engine: BrowserEngine::Chromium,
            headless: true,
            viewport_width: 1920,
            viewport_height: 1080,
            chromium_path: None,
            navigation_timeout: Duration::from_secs(50),
            action_timeout: Duration::from_secs(40),
            sandbox: true,
        }
    }
}

impl DriverConfig {
    /// Create a new driver config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set headless mode
    #[must_use]
    pub const fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set viewport size
    #[must_use]
    pub const fn viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set navigation timeout
    #[must_use]
    pub const fn navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }

    /// Disable the sandbox
    #[must_use]
    pub const fn no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

impl From<&SuiteConfig> for DriverConfig {
    fn from(config: &SuiteConfig) -> Self {
        Self {
            engine: config.engine,
            headless: config.headless,
            viewport_width: config.viewport_width,
            viewport_height: config.viewport_height,
            chromium_path: config.chromium_path.clone(),
            navigation_timeout: config.navigation_timeout(),
            action_timeout: config.action_timeout(),
            sandbox: true,
        }
    }
}

/// The automation-engine capability set the framework depends on.
///
/// Absent elements are not errors for queries (`count`, `is_visible`,
/// `text_content`, `bounding_box`); interactions and element-property reads
/// on an absent element fail with [`crate::TellerError::LocatorResolution`].
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Engine this driver renders with
    fn engine(&self) -> BrowserEngine;

    /// Navigate to an absolute URL
    async fn navigate(&self, url: &str) -> TellerResult<()>;

    /// Current document URL
    async fn current_url(&self) -> TellerResult<String>;

    /// Whether the given load state currently holds
    async fn load_state_reached(&self, state: LoadState) -> TellerResult<bool>;

    /// Number of matching elements
    async fn count(&self, selector: &Selector) -> TellerResult<usize>;

    /// Whether the first match is rendered and visible
    async fn is_visible(&self, selector: &Selector) -> TellerResult<bool>;

    /// Raw text content of the first match
    async fn text_content(&self, selector: &Selector) -> TellerResult<Option<String>>;

    /// Raw text content of every match, in document order
    async fn all_text_contents(&self, selector: &Selector) -> TellerResult<Vec<String>>;

    /// Click the first match
    async fn click(&self, selector: &Selector) -> TellerResult<()>;

    /// Replace the value of the first matching input
    async fn fill(&self, selector: &Selector, value: &str) -> TellerResult<()>;

    /// Select the option with the given label in the first matching `<select>`
    async fn select_option(&self, selector: &Selector, label: &str) -> TellerResult<()>;

    /// Current value of the first matching form control
    async fn input_value(&self, selector: &Selector) -> TellerResult<String>;

    /// Native constraint-validation message of the first matching control
    async fn validation_message(&self, selector: &Selector) -> TellerResult<String>;

    /// Computed CSS property of the first match
    async fn computed_style(&self, selector: &Selector, property: &str) -> TellerResult<String>;

    /// Layout box of the first match, `None` when absent or not rendered
    async fn bounding_box(&self, selector: &Selector) -> TellerResult<Option<BoundingBox>>;

    /// Full-page PNG screenshot
    async fn screenshot(&self) -> TellerResult<Screenshot>;

    /// Subscribe to native dialog openings.
    ///
    /// Only dialogs opened after this call are delivered.
    fn subscribe_dialogs(&self) -> broadcast::Receiver<Dialog>;

    /// Accept the open dialog, answering a prompt with `prompt_text`
    async fn accept_dialog(&self, prompt_text: Option<String>) -> TellerResult<()>;

    /// Dismiss the open dialog
    async fn dismiss_dialog(&self) -> TellerResult<()>;

    /// Release the tab
    async fn close(&self) -> TellerResult<()>;
}
