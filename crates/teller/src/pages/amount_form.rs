//! The amount form shared by the Deposit and Withdrawl tabs.
//!
//! Both tabs render the same markup: a status message, an amount label, a
//! required `type=number` input and a submit button. They differ only in
//! labels, so one [`AmountForm`] is parameterised by them.

use crate::locator::{Locator, Selector};
use crate::page_object::{LocatorRegistry, Screen};
use crate::result::{TellerError, TellerResult};
use crate::session::Session;
use crate::wait;
use std::fmt::Display;
use std::time::Duration;

/// How long a status message query waits for the message to show up
const MESSAGE_WAIT: Duration = Duration::from_secs(2);

/// Labels that tell the two tabs apart
#[derive(Debug, Clone, Copy)]
pub(crate) struct FormLabels {
    /// Text of the submit button
    pub submit: &'static str,
    /// Text of the amount label
    pub amount: &'static str,
    /// CSS of the status message
    pub message: &'static str,
}

/// Submit button of a tab, the landmark of that tab's screen
pub(crate) fn submit_button(labels: FormLabels) -> Locator {
    Locator::from_selector(Selector::css_with_text(r#"button[type="submit"]"#, labels.submit))
}

fn registry(labels: FormLabels) -> LocatorRegistry {
    LocatorRegistry::builder()
        .defining("amount", Selector::css(r#"input[ng-model="amount"]"#))
        .defining("submit", Selector::css_with_text(r#"button[type="submit"]"#, labels.submit))
        .with_locator("amount_label", Selector::css_with_text("label", labels.amount))
        .with_locator("message", Selector::css(labels.message))
        .build()
}

#[derive(Debug, Clone)]
pub(crate) struct AmountForm {
    screen: Screen,
}

impl AmountForm {
    pub(crate) fn new(session: Session, labels: FormLabels) -> Self {
        Self {
            screen: Screen::new(session, registry(labels)),
        }
    }

    pub(crate) fn screen(&self) -> &Screen {
        &self.screen
    }

    pub(crate) async fn enter_amount(&self, amount: impl Display) -> TellerResult<()> {
        self.screen.fill("amount", &amount.to_string()).await
    }

    /// Submit, then wait until the form has reacted: either native
    /// validation refused the value, or the status message is showing and
    /// has changed or the amount input was cleared.
    pub(crate) async fn submit(&self) -> TellerResult<()> {
        let before = self.screen.text("message").await?;
        self.screen.click("submit").await?;
        let settle = self.screen.base().settle_wait();
        wait::wait_for("amount form to settle", &settle, || self.has_settled(&before)).await?;
        Ok(())
    }

    async fn has_settled(&self, message_before: &str) -> TellerResult<bool> {
        if !self.screen.validation_message("amount").await?.is_empty() {
            return Ok(true);
        }
        if !self.screen.is_visible("message").await? {
            return Ok(false);
        }
        Ok(self.screen.text("message").await? != message_before
            || self.screen.value("amount").await?.is_empty())
    }

    /// Status message, or `""` when none shows up in time
    pub(crate) async fn message(&self) -> TellerResult<String> {
        let locator = self.screen.locator("message")?;
        match self.screen.base().wait_for_element(&locator, MESSAGE_WAIT).await {
            Ok(()) => self.screen.text("message").await,
            Err(TellerError::Timeout { .. }) => Ok(String::new()),
            Err(other) => Err(other),
        }
    }

    pub(crate) async fn is_successful(&self) -> TellerResult<bool> {
        Ok(self.message().await?.to_lowercase().contains("success"))
    }

    pub(crate) async fn field_validation_message(&self) -> TellerResult<String> {
        self.screen.validation_message("amount").await
    }

    pub(crate) async fn message_color(&self) -> TellerResult<String> {
        let locator = self.screen.locator("message")?;
        self.screen.base().computed_style(&locator, "color").await
    }

    /// Whether the status message is laid out above the amount label
    pub(crate) async fn message_is_above_label(&self) -> TellerResult<bool> {
        let base = self.screen.base();
        let message = base.bounding_box(&self.screen.locator("message")?).await?;
        let label = base.bounding_box(&self.screen.locator("amount_label")?).await?;
        Ok(matches!((message, label), (Some(m), Some(l)) if m.is_above(&l)))
    }
}
