//! Manager's Add Customer form.

use crate::dialog::DialogCapture;
use crate::locator::{Locator, Selector};
use crate::page_object::{LocatorRegistry, PageObject, Screen};
use crate::result::TellerResult;
use crate::session::Session;

const FIRST_NAME: &str = r#"input[ng-model="fName"]"#;

pub(crate) fn landmark() -> Locator {
    Locator::new(FIRST_NAME)
}

fn registry() -> LocatorRegistry {
    LocatorRegistry::builder()
        .defining("first_name", Selector::css(FIRST_NAME))
        .defining("last_name", Selector::css(r#"input[ng-model="lName"]"#))
        .defining("post_code", Selector::css(r#"input[ng-model="postCd"]"#))
        .defining(
            "add_customer",
            Selector::css_with_text(r#"button[type="submit"]"#, "Add Customer"),
        )
        .build()
}

/// One of the form's text inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerField {
    /// First Name
    FirstName,
    /// Last Name
    LastName,
    /// Post Code
    PostCode,
}

impl CustomerField {
    const fn locator_name(self) -> &'static str {
        match self {
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::PostCode => "post_code",
        }
    }
}

/// Add Customer screen (`#/manager/addCust`).
///
/// Submitting raises a native alert; arm a capture first:
///
/// ```ignore
/// let alert = pages.add_customer().arm_alert()?;
/// pages.add_customer().add_customer("Luna", "Lovegood", "E1 1AA").await?;
/// let message = alert.within(Duration::from_secs(5)).await?.message().to_string();
/// ```
#[derive(Debug, Clone)]
pub struct AddCustomerPage {
    screen: Screen,
}

impl AddCustomerPage {
    /// Bind to a session
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self {
            screen: Screen::new(session, registry()),
        }
    }

    /// Fill First Name
    pub async fn enter_first_name(&self, first_name: &str) -> TellerResult<()> {
        self.screen.fill(CustomerField::FirstName.locator_name(), first_name).await
    }

    /// Fill Last Name
    pub async fn enter_last_name(&self, last_name: &str) -> TellerResult<()> {
        self.screen.fill(CustomerField::LastName.locator_name(), last_name).await
    }

    /// Fill Post Code
    pub async fn enter_post_code(&self, post_code: &str) -> TellerResult<()> {
        self.screen.fill(CustomerField::PostCode.locator_name(), post_code).await
    }

    /// Submit. Does not wait: the alert is the completion signal.
    pub async fn click_add_customer(&self) -> TellerResult<()> {
        self.screen.click("add_customer").await
    }

    /// Fill all three fields and submit
    pub async fn add_customer(
        &self,
        first_name: &str,
        last_name: &str,
        post_code: &str,
    ) -> TellerResult<()> {
        tracing::info!(first_name, last_name, post_code, "add customer");
        self.enter_first_name(first_name).await?;
        self.enter_last_name(last_name).await?;
        self.enter_post_code(post_code).await?;
        self.click_add_customer().await
    }

    /// Arm a one-shot capture for the alert the next submit raises
    pub fn arm_alert(&self) -> TellerResult<DialogCapture> {
        self.screen.base().session().dialog_interceptor().arm_one_shot()
    }

    /// Native validation message of one field
    pub async fn field_validation_message(&self, field: CustomerField) -> TellerResult<String> {
        self.screen.validation_message(field.locator_name()).await
    }
}

impl PageObject for AddCustomerPage {
    fn screen(&self) -> &Screen {
        &self.screen
    }

    fn page_name(&self) -> &'static str {
        "add customer"
    }
}
