//! Customer account overview: header figures, account dropdown, tabs.

use super::{customer_login, deposit, transactions, withdrawal};
use crate::locator::{Locator, Selector};
use crate::model::parse_amount;
use crate::page_object::{LocatorRegistry, PageObject, Screen};
use crate::result::TellerResult;
use crate::session::Session;
use crate::wait;

/// Welcome banner holding the customer's name
const WELCOME: &str = ".fontBig";

/// Element whose visibility signals arrival on this screen
pub(crate) fn landmark() -> Locator {
    Locator::new(WELCOME)
}

fn registry() -> LocatorRegistry {
    LocatorRegistry::builder()
        .defining("welcome", Selector::css(WELCOME))
        .defining("logout", Selector::css(r#"button[ng-click="byebye()"]"#))
        .with_locator("account_select", Selector::css("#accountSelect"))
        // the welcome line's span is also an ng-binding, so pin to <strong>
        .with_locator("account_number", Selector::css(".center strong.ng-binding:nth-of-type(1)"))
        .with_locator("balance", Selector::css(".center strong.ng-binding:nth-of-type(2)"))
        .with_locator("currency", Selector::css(".center strong.ng-binding:nth-of-type(3)"))
        .with_locator("transactions", Selector::css(r#"button[ng-click="transactions()"]"#))
        .with_locator("deposit_tab", Selector::css(r#"button[ng-click="deposit()"]"#))
        .with_locator("withdrawl_tab", Selector::css(r#"button[ng-click="withdrawl()"]"#))
        .build()
}

/// Account screen (`#/account`)
#[derive(Debug, Clone)]
pub struct AccountPage {
    screen: Screen,
}

impl AccountPage {
    /// Bind to a session
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self {
            screen: Screen::new(session, registry()),
        }
    }

    /// Customer name from the welcome banner
    pub async fn welcome_message(&self) -> TellerResult<String> {
        self.screen.text("welcome").await
    }

    /// Displayed account number
    pub async fn account_number(&self) -> TellerResult<String> {
        self.screen.text("account_number").await
    }

    /// Displayed balance, as text
    pub async fn balance(&self) -> TellerResult<String> {
        self.screen.text("balance").await
    }

    /// Displayed balance, parsed
    pub async fn balance_as_number(&self) -> TellerResult<f64> {
        parse_amount(&self.balance().await?)
    }

    /// Displayed currency
    pub async fn currency(&self) -> TellerResult<String> {
        self.screen.text("currency").await
    }

    /// Account numbers offered by the dropdown
    pub async fn available_accounts(&self) -> TellerResult<Vec<String>> {
        self.screen.options("account_select").await
    }

    /// Switch accounts and wait until the header shows the new number
    pub async fn select_account(&self, account_number: &str) -> TellerResult<()> {
        self.screen.select("account_select", account_number).await?;
        let waited_for = format!("account {account_number} to be displayed");
        wait::wait_for(&waited_for, &self.screen.base().settle_wait(), || async {
            self.account_number()
                .await
                .map(|shown| shown == account_number.trim())
        })
        .await?;
        Ok(())
    }

    /// Open the transactions list
    pub async fn click_transactions(&self) -> TellerResult<()> {
        self.switch_to("transactions", transactions::landmark()).await
    }

    /// Open the deposit form
    pub async fn click_deposit_tab(&self) -> TellerResult<()> {
        self.switch_to("deposit_tab", deposit::landmark()).await
    }

    /// Open the withdrawal form (the application spells it "Withdrawl")
    pub async fn click_withdrawl(&self) -> TellerResult<()> {
        self.switch_to("withdrawl_tab", withdrawal::landmark()).await
    }

    /// Log out and wait for the customer login screen
    pub async fn click_logout(&self) -> TellerResult<()> {
        let base = self.screen.base();
        self.screen.click("logout").await?;
        base.wait_for_page_load().await?;
        base.wait_for_element(&customer_login::landmark(), base.settle_wait().timeout())
            .await
    }

    /// Click a tab and wait for the target screen's landmark
    async fn switch_to(&self, tab: &str, lands_on: Locator) -> TellerResult<()> {
        let base = self.screen.base();
        self.screen.click(tab).await?;
        base.wait_for_element(&lands_on, base.settle_wait().timeout()).await
    }
}

impl PageObject for AccountPage {
    fn screen(&self) -> &Screen {
        &self.screen
    }

    fn page_name(&self) -> &'static str {
        "account"
    }
}
