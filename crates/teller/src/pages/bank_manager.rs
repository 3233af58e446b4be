//! Bank manager dashboard: the three manager tabs.

use super::{add_customer, customers_table, home, open_account};
use crate::locator::{Locator, Selector};
use crate::page_object::{LocatorRegistry, PageObject, Screen};
use crate::result::TellerResult;
use crate::session::Session;

const ADD_CUSTOMER_TAB: &str = r#"button[ng-click="addCust()"]"#;

pub(crate) fn landmark() -> Locator {
    Locator::new(ADD_CUSTOMER_TAB)
}

fn registry() -> LocatorRegistry {
    LocatorRegistry::builder()
        .defining("add_customer", Selector::css(ADD_CUSTOMER_TAB))
        .defining("open_account", Selector::css(r#"button[ng-click="openAccount()"]"#))
        .defining("customers", Selector::css(r#"button[ng-click="showCust()"]"#))
        .with_locator("home", Selector::css(r#"button[ng-click="home()"]"#))
        .build()
}

/// Manager screen (`#/manager`)
#[derive(Debug, Clone)]
pub struct BankManagerPage {
    screen: Screen,
}

impl BankManagerPage {
    /// Bind to a session
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self {
            screen: Screen::new(session, registry()),
        }
    }

    /// Open the Add Customer form
    pub async fn click_add_customer(&self) -> TellerResult<()> {
        self.switch_to("add_customer", add_customer::landmark()).await
    }

    /// Open the Open Account form
    pub async fn click_open_account(&self) -> TellerResult<()> {
        self.switch_to("open_account", open_account::landmark()).await
    }

    /// Open the Customers table
    pub async fn click_customers(&self) -> TellerResult<()> {
        self.switch_to("customers", customers_table::landmark()).await
    }

    /// Back to the home screen
    pub async fn click_home(&self) -> TellerResult<()> {
        let base = self.screen.base();
        self.screen.click("home").await?;
        base.wait_for_page_load().await?;
        base.wait_for_element(&home::landmark(), base.settle_wait().timeout())
            .await
    }

    async fn switch_to(&self, tab: &str, lands_on: Locator) -> TellerResult<()> {
        let base = self.screen.base();
        self.screen.click(tab).await?;
        base.wait_for_element(&lands_on, base.settle_wait().timeout()).await
    }
}

impl PageObject for BankManagerPage {
    fn screen(&self) -> &Screen {
        &self.screen
    }

    fn page_name(&self) -> &'static str {
        "bank manager"
    }
}
