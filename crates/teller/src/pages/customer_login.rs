//! Customer login screen: pick a name, then log in.

use super::account;
use crate::locator::{Locator, Selector};
use crate::page_object::{LocatorRegistry, PageObject, Screen};
use crate::result::TellerResult;
use crate::session::Session;

/// Customer dropdown
const USER_SELECT: &str = "#userSelect";

/// Element whose visibility signals arrival on this screen
pub(crate) fn landmark() -> Locator {
    Locator::new(USER_SELECT)
}

/// Dropdown placeholder, not a customer
const PLACEHOLDER: &str = "---Your Name---";

fn registry() -> LocatorRegistry {
    LocatorRegistry::builder()
        .defining("user_select", Selector::css(USER_SELECT))
        .defining("your_name_label", Selector::css_with_text("label", "Your Name"))
        .with_locator("login", Selector::css(r#"button[type="submit"]"#))
        .build()
}

/// Customer login screen (`#/customer`).
///
/// The Login button only appears once a name is selected, so it is not one
/// of the defining elements.
#[derive(Debug, Clone)]
pub struct CustomerLoginPage {
    screen: Screen,
}

impl CustomerLoginPage {
    /// Bind to a session
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self {
            screen: Screen::new(session, registry()),
        }
    }

    /// Select a customer by the name shown in the dropdown
    pub async fn select_customer(&self, name: &str) -> TellerResult<()> {
        self.screen.select("user_select", name).await?;
        self.screen.wait_visible("login").await
    }

    /// Submit the login form and wait for the account welcome
    pub async fn click_login(&self) -> TellerResult<()> {
        let base = self.screen.base();
        self.screen.click("login").await?;
        base.wait_for_element(&account::landmark(), base.settle_wait().timeout())
            .await
    }

    /// Select `name` and log in
    pub async fn login(&self, name: &str) -> TellerResult<()> {
        tracing::info!(customer = name, "customer login");
        self.select_customer(name).await?;
        self.click_login().await
    }

    /// Names offered by the dropdown, placeholder removed
    pub async fn available_customers(&self) -> TellerResult<Vec<String>> {
        let options = self.screen.options("user_select").await?;
        Ok(options.into_iter().filter(|o| o != PLACEHOLDER).collect())
    }
}

impl PageObject for CustomerLoginPage {
    fn screen(&self) -> &Screen {
        &self.screen
    }

    fn page_name(&self) -> &'static str {
        "customer login"
    }
}
