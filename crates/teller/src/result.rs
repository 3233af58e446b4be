//! Result and error types for Teller.

use thiserror::Error;

/// Result type for Teller operations
pub type TellerResult<T> = Result<T, TellerError>;

/// Errors that can occur while driving the application under test
#[derive(Debug, Error)]
pub enum TellerError {
    /// Element absent (or not actionable) when an action required it
    #[error("Locator {selector} did not resolve: {message}")]
    LocatorResolution {
        /// Selector that failed to resolve
        selector: String,
        /// Error message
        message: String,
    },

    /// Selector could not be parsed by the engine
    #[error("Invalid selector {selector}: {message}")]
    InvalidSelector {
        /// Offending selector
        selector: String,
        /// Parser message
        message: String,
    },

    /// A bounded wait expired
    #[error("Timed out after {ms}ms waiting for {waited_for}")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
        /// Description of the condition
        waited_for: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Any other failure reported by the automation engine
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// A one-shot dialog capture is already armed on this session
    #[error("A dialog interceptor is already armed on this session")]
    DialogAlreadyArmed,

    /// The dialog listener went away before any dialog fired
    #[error("Dialog interceptor dropped before a dialog fired")]
    DialogDropped,

    /// Displayed text could not be translated to a domain value
    #[error("Could not parse {text:?}: {message}")]
    Parse {
        /// Raw text
        text: String,
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// The session was already closed
    #[error("Session is closed")]
    SessionClosed,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl TellerError {
    /// Create a locator resolution error
    #[must_use]
    pub fn locator(selector: impl Into<String>, message: impl Into<String>) -> Self {
        Self::LocatorResolution {
            selector: selector.into(),
            message: message.into(),
        }
    }

    /// Create a driver error
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Check whether this error is a timeout
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
