//! Manager's Open Account form.

use crate::data::Currency;
use crate::dialog::DialogCapture;
use crate::locator::{Locator, Selector};
use crate::page_object::{LocatorRegistry, PageObject, Screen};
use crate::result::TellerResult;
use crate::session::Session;

const CURRENCY: &str = "#currency";
const CUSTOMER_PLACEHOLDER: &str = "---Customer Name---";
const CURRENCY_PLACEHOLDER: &str = "---Currency---";

pub(crate) fn landmark() -> Locator {
    Locator::new(CURRENCY)
}

fn registry() -> LocatorRegistry {
    LocatorRegistry::builder()
        .defining("customer", Selector::css("#userSelect"))
        .defining("currency", Selector::css(CURRENCY))
        .defining("process", Selector::css_with_text(r#"button[type="submit"]"#, "Process"))
        .build()
}

/// Open Account screen (`#/manager/openAccount`)
#[derive(Debug, Clone)]
pub struct OpenAccountPage {
    screen: Screen,
}

impl OpenAccountPage {
    /// Bind to a session
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self {
            screen: Screen::new(session, registry()),
        }
    }

    /// Pick the account holder by full name
    pub async fn select_customer(&self, name: &str) -> TellerResult<()> {
        self.screen.select("customer", name).await
    }

    /// Pick the account currency
    pub async fn select_currency(&self, currency: Currency) -> TellerResult<()> {
        self.screen.select("currency", currency.label()).await
    }

    /// Submit. Does not wait: the alert is the completion signal.
    pub async fn click_process(&self) -> TellerResult<()> {
        self.screen.click("process").await
    }

    /// Select both values and submit
    pub async fn open_account(&self, name: &str, currency: Currency) -> TellerResult<()> {
        tracing::info!(customer = name, %currency, "open account");
        self.select_customer(name).await?;
        self.select_currency(currency).await?;
        self.click_process().await
    }

    /// Arm a one-shot capture for the alert the next submit raises
    pub fn arm_alert(&self) -> TellerResult<DialogCapture> {
        self.screen.base().session().dialog_interceptor().arm_one_shot()
    }

    /// Customer names offered, placeholder removed
    pub async fn available_customers(&self) -> TellerResult<Vec<String>> {
        let options = self.screen.options("customer").await?;
        Ok(options.into_iter().filter(|o| o != CUSTOMER_PLACEHOLDER).collect())
    }

    /// Currency labels offered, placeholder removed
    pub async fn available_currencies(&self) -> TellerResult<Vec<String>> {
        let options = self.screen.options("currency").await?;
        Ok(options.into_iter().filter(|o| o != CURRENCY_PLACEHOLDER).collect())
    }
}

impl PageObject for OpenAccountPage {
    fn screen(&self) -> &Screen {
        &self.screen
    }

    fn page_name(&self) -> &'static str {
        "open account"
    }
}
