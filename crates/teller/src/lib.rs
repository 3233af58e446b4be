//! Teller: page objects and scenario runner for the XYZ Bank demo
//!
//! Teller drives the AngularJS "XYZ Bank" banking demo through a small,
//! async browser abstraction. Tests talk to page objects; page objects talk
//! to a [`BrowserDriver`]; the driver is either Chromium over CDP or an
//! in-process simulator of the same application.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    TELLER Architecture                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────────────┐    │
//! │   │ Scenario   │    │ Pages      │    │ BrowserDriver      │    │
//! │   │ (tokio     │───►│ (page      │───►│  CdpDriver  (CDP)  │    │
//! │   │  test)     │    │  objects)  │    │  BankSimulator     │    │
//! │   └────────────┘    └────────────┘    └────────────────────┘    │
//! │         │                  │                                    │
//! │   run_scenario        Session (one tab, dialog interceptor)     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use teller::{run_simulated, SuiteConfig};
//!
//! run_simulated("deposit", &SuiteConfig::default(), |pages| async move {
//!     pages.home().goto().await?;
//!     pages.home().click_customer_login().await?;
//!     pages.customer_login().login("Hermoine Granger").await?;
//!     pages.account().click_deposit_tab().await?;
//!     pages.deposit().deposit(100).await?;
//!     assert!(pages.deposit().is_deposit_successful().await?);
//!     Ok(())
//! })
//! .await?;
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

mod config;
mod dialog;
#[allow(clippy::missing_errors_doc, clippy::doc_markdown)]
mod driver;
mod harness;
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
mod locator;
mod logging;
mod model;
#[allow(clippy::missing_errors_doc)]
mod page;
#[allow(clippy::missing_errors_doc)]
mod page_object;
#[allow(clippy::missing_errors_doc)]
mod pages;
mod result;
mod session;
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::too_many_lines,
    clippy::format_push_string
)]
mod simulator;
mod table;
mod wait;

#[cfg(feature = "browser")]
#[allow(clippy::missing_errors_doc, clippy::cast_possible_truncation)]
mod browser;

/// Seeded customers, amounts, expected messages and test-data helpers
pub mod data;

#[cfg(feature = "browser")]
pub use browser::CdpDriver;
pub use config::{
    BrowserEngine, SuiteConfig, DEFAULT_BASE_URL, ENV_BASE_URL, ENV_CHROMIUM_PATH, ENV_CONFIG,
    ENV_ENGINE, ENV_HEADLESS, ENV_OUTPUT_DIR, ENV_RETRIES,
};
pub use dialog::{
    extract_trailing_number, Dialog, DialogAction, DialogCapture, DialogInterceptor, DialogLog,
    DialogResponse, DialogType,
};
pub use driver::{BrowserDriver, DriverConfig, Screenshot};
#[cfg(feature = "browser")]
pub use harness::run_in_browser;
pub use harness::{run_scenario, run_simulated, AttemptResult, ScenarioReport};
pub use locator::{BoundingBox, Locator, Selector};
pub use logging::{init_tracing, DEFAULT_FILTER};
pub use model::{parse_amount, Customer, Transaction, TransactionType};
pub use page::{sanitize_file_name, BasePage};
pub use page_object::{LocatorRegistry, LocatorRegistryBuilder, PageObject, Screen};
pub use pages::{
    AccountPage, AddCustomerPage, BankManagerPage, CustomerField, CustomerLoginPage,
    CustomersTablePage, DepositPage, HomePage, OpenAccountPage, Pages, TransactionsPage,
    WithdrawalPage,
};
pub use result::{TellerError, TellerResult};
pub use session::Session;
pub use simulator::BankSimulator;
pub use table::{records_from_rows, scrape_rows, scrape_table, TableRecord};
pub use wait::{
    wait_for, wait_for_change, LoadState, WaitOptions, WaitResult, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_WAIT_TIMEOUT_MS,
};

