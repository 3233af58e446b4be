//! Login landing screen with the two role entry points.

use super::{bank_manager, customer_login};
use crate::locator::{Locator, Selector};
use crate::page_object::{LocatorRegistry, PageObject, Screen};
use crate::result::{TellerError, TellerResult};
use crate::session::Session;

const CUSTOMER_LOGIN: &str = r#"button[ng-click="customer()"]"#;

pub(crate) fn landmark() -> Locator {
    Locator::new(CUSTOMER_LOGIN)
}

fn registry() -> LocatorRegistry {
    LocatorRegistry::builder()
        .defining("customer_login", Selector::css(CUSTOMER_LOGIN))
        .defining("bank_manager_login", Selector::css(r#"button[ng-click="manager()"]"#))
        .with_locator("home", Selector::css(r#"button[ng-click="home()"]"#))
        .build()
}

/// Home screen (`#/login`)
#[derive(Debug, Clone)]
pub struct HomePage {
    screen: Screen,
}

impl HomePage {
    /// Bind to a session
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self {
            screen: Screen::new(session, registry()),
        }
    }

    /// Open the application root and wait until it has redirected to the
    /// login route
    pub async fn goto(&self) -> TellerResult<()> {
        let base = self.screen.base();
        base.navigate("").await?;
        base.wait_for_page_load().await?;
        let url = base.current_url().await?;
        if !url.contains("/login") {
            return Err(TellerError::Navigation {
                url,
                message: "expected the login route".to_string(),
            });
        }
        Ok(())
    }

    /// Enter the customer flow
    pub async fn click_customer_login(&self) -> TellerResult<()> {
        self.enter("customer_login", customer_login::landmark()).await
    }

    /// Enter the manager flow
    pub async fn click_bank_manager_login(&self) -> TellerResult<()> {
        self.enter("bank_manager_login", bank_manager::landmark()).await
    }

    /// Click a role button, then wait for the page load and the role
    /// screen's defining element
    async fn enter(&self, button: &str, lands_on: Locator) -> TellerResult<()> {
        let base = self.screen.base();
        self.screen.click(button).await?;
        base.wait_for_page_load().await?;
        base.wait_for_element(&lands_on, base.settle_wait().timeout())
            .await
    }

    /// Header Home button
    pub async fn click_home(&self) -> TellerResult<()> {
        self.screen.click("home").await?;
        self.screen.base().wait_for_page_load().await?;
        self.screen.wait_loaded(self.page_name()).await
    }
}

impl PageObject for HomePage {
    fn screen(&self) -> &Screen {
        &self.screen
    }

    fn page_name(&self) -> &'static str {
        "home"
    }
}
