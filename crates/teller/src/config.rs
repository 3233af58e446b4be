//! Suite configuration
//!
//! Defaults match the hosted XYZ Bank demo. A YAML file can replace any
//! subset of fields and environment variables override both.

use crate::result::{TellerError, TellerResult};
use crate::wait::WaitOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Base URL of the hosted demo
pub const DEFAULT_BASE_URL: &str = "https://www.globalsqa.com/angularJs-protractor/BankingProject/";

/// Path of a YAML config file to load
pub const ENV_CONFIG: &str = "TELLER_CONFIG";
/// Overrides [`SuiteConfig::base_url`]
pub const ENV_BASE_URL: &str = "TELLER_BASE_URL";
/// Overrides [`SuiteConfig::engine`]
pub const ENV_ENGINE: &str = "TELLER_ENGINE";
/// Overrides [`SuiteConfig::headless`]
pub const ENV_HEADLESS: &str = "TELLER_HEADLESS";
/// Overrides [`SuiteConfig::chromium_path`]
pub const ENV_CHROMIUM_PATH: &str = "CHROMIUM_PATH";
/// Overrides [`SuiteConfig::retries`]
pub const ENV_RETRIES: &str = "TELLER_RETRIES";
/// Overrides [`SuiteConfig::output_dir`]
pub const ENV_OUTPUT_DIR: &str = "TELLER_OUTPUT_DIR";

/// Browser rendering engine
///
/// Native validation messages differ per engine, so the engine is part of
/// the suite configuration even though only Chromium is driven over CDP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserEngine {
    /// Chromium / Chrome
    #[default]
    Chromium,
    /// Gecko
    Firefox,
    /// WebKit / Safari
    Webkit,
}

impl BrowserEngine {
    /// Lowercase engine name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Chromium => "chromium",
            Self::Firefox => "firefox",
            Self::Webkit => "webkit",
        }
    }
}

impl std::fmt::Display for BrowserEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BrowserEngine {
    type Err = TellerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chromium" | "chrome" => Ok(Self::Chromium),
            "firefox" => Ok(Self::Firefox),
            "webkit" | "safari" => Ok(Self::Webkit),
            other => Err(TellerError::config(format!("unknown browser engine {other:?}"))),
        }
    }
}

/// Suite configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Application base URL; relative navigations resolve against it
    pub base_url: String,
    /// Rendering engine
    pub engine: BrowserEngine,
    /// Run the browser headless
    pub headless: bool,
    /// Browser binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Per-action timeout
    pub action_timeout_ms: u64,
    /// Navigation and page-load timeout
    pub navigation_timeout_ms: u64,
    /// Overall timeout of one scenario attempt
    pub test_timeout_ms: u64,
    /// Timeout for settle conditions after an action
    pub settle_timeout_ms: u64,
    /// Bound for change detection on transitions without a readiness signal
    pub fallback_delay_ms: u64,
    /// Poll interval for every condition wait
    pub poll_interval_ms: u64,
    /// Extra attempts after a failed scenario
    pub retries: u32,
    /// Capture a screenshot when an attempt fails
    pub screenshot_on_failure: bool,
    /// Directory for screenshots and other artifacts
    pub output_dir: PathBuf,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            engine: BrowserEngine::Chromium,
            headless: true,
            chromium_path: None,
            viewport_width: 1920,
            viewport_height: 1080,
            action_timeout_ms: 40_000,
            navigation_timeout_ms: 50_000,
            test_timeout_ms: 60_000,
            settle_timeout_ms: 5_000,
            fallback_delay_ms: 500,
            poll_interval_ms: 50,
            retries: 2,
            screenshot_on_failure: true,
            output_dir: PathBuf::from("test-results"),
        }
    }
}

impl SuiteConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults, then `TELLER_CONFIG` (if set), then environment overrides
    pub fn load() -> TellerResult<Self> {
        let base = match std::env::var(ENV_CONFIG) {
            Ok(path) => Self::from_yaml_file(path)?,
            Err(_) => Self::default(),
        };
        base.with_env_overrides()
    }

    /// Parse a YAML document; missing fields keep their defaults
    pub fn from_yaml_str(yaml: &str) -> TellerResult<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Read and parse a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> TellerResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&text)
    }

    /// Apply overrides from the process environment
    pub fn with_env_overrides(self) -> TellerResult<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup
    pub fn with_overrides<F>(mut self, lookup: F) -> TellerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.base_url = url;
        }
        if let Some(engine) = lookup(ENV_ENGINE) {
            self.engine = engine.parse()?;
        }
        if let Some(headless) = lookup(ENV_HEADLESS) {
            self.headless = parse_bool(ENV_HEADLESS, &headless)?;
        }
        if let Some(path) = lookup(ENV_CHROMIUM_PATH) {
            self.chromium_path = Some(path);
        }
        if let Some(retries) = lookup(ENV_RETRIES) {
            self.retries = retries.trim().parse().map_err(|_| {
                TellerError::config(format!(
                    "{ENV_RETRIES} must be a non-negative integer, got {retries:?}"
                ))
            })?;
        }
        if let Some(dir) = lookup(ENV_OUTPUT_DIR) {
            self.output_dir = PathBuf::from(dir);
        }
        Ok(self)
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the engine
    #[must_use]
    pub const fn with_engine(mut self, engine: BrowserEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Set the retry count
    #[must_use]
    pub const fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Set the artifact directory
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Set the overall scenario timeout
    #[must_use]
    pub const fn with_test_timeout_ms(mut self, ms: u64) -> Self {
        self.test_timeout_ms = ms;
        self
    }

    /// Enable or disable failure screenshots
    #[must_use]
    pub const fn with_screenshot_on_failure(mut self, enabled: bool) -> Self {
        self.screenshot_on_failure = enabled;
        self
    }

    /// Per-action timeout
    #[must_use]
    pub const fn action_timeout(&self) -> Duration {
        Duration::from_millis(self.action_timeout_ms)
    }

    /// Navigation timeout
    #[must_use]
    pub const fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    /// Overall scenario timeout
    #[must_use]
    pub const fn test_timeout(&self) -> Duration {
        Duration::from_millis(self.test_timeout_ms)
    }

    /// Wait options bounded by `timeout_ms` and polling at the configured interval
    #[must_use]
    pub const fn wait_options(&self, timeout_ms: u64) -> WaitOptions {
        WaitOptions {
            timeout_ms,
            poll_interval_ms: self.poll_interval_ms,
        }
    }

    /// Wait options for settle conditions
    #[must_use]
    pub const fn settle_wait(&self) -> WaitOptions {
        self.wait_options(self.settle_timeout_ms)
    }

    /// Wait options for change detection
    #[must_use]
    pub const fn fallback_wait(&self) -> WaitOptions {
        self.wait_options(self.fallback_delay_ms)
    }

    /// Resolve a possibly relative URL against the base URL
    #[must_use]
    pub fn resolve_url(&self, url: &str) -> String {
        if url.contains("://") || url.starts_with("about:") {
            return url.to_string();
        }
        let relative = url.trim_start_matches('/');
        if relative.is_empty() {
            return self.base_url.clone();
        }
        format!("{}/{relative}", self.base_url.trim_end_matches('/'))
    }
}

fn parse_bool(key: &str, value: &str) -> TellerResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(TellerError::config(format!("{key} must be a boolean, got {value:?}"))),
    }
}
