//! Deposit tab of the account screen.

use super::amount_form::{self, AmountForm, FormLabels};
use crate::locator::Locator;
use crate::page_object::{PageObject, Screen};
use crate::result::TellerResult;
use crate::session::Session;
use std::fmt::Display;

const LABELS: FormLabels = FormLabels {
    submit: "Deposit",
    amount: "Amount to be Deposited",
    message: r#"span[ng-show="message"]"#,
};

/// Element whose visibility signals arrival on this screen
pub(crate) fn landmark() -> Locator {
    amount_form::submit_button(LABELS)
}

/// Deposit form
#[derive(Debug, Clone)]
pub struct DepositPage {
    form: AmountForm,
}

impl DepositPage {
    /// Bind to a session
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self {
            form: AmountForm::new(session, LABELS),
        }
    }

    /// Type an amount without submitting
    pub async fn enter_amount(&self, amount: impl Display) -> TellerResult<()> {
        self.form.enter_amount(amount).await
    }

    /// Submit the form and wait for it to react
    pub async fn click_deposit(&self) -> TellerResult<()> {
        self.form.submit().await
    }

    /// Enter `amount` and submit
    pub async fn deposit(&self, amount: impl Display) -> TellerResult<()> {
        tracing::info!(%amount, "deposit");
        self.enter_amount(amount).await?;
        self.click_deposit().await
    }

    /// Status message, `""` when none is shown
    pub async fn deposit_message(&self) -> TellerResult<String> {
        self.form.message().await
    }

    /// Whether the status message reports success
    pub async fn is_deposit_successful(&self) -> TellerResult<bool> {
        self.form.is_successful().await
    }

    /// Native validation message of the amount input
    pub async fn field_validation_message(&self) -> TellerResult<String> {
        self.form.field_validation_message().await
    }

    /// Computed color of the status message
    pub async fn message_color(&self) -> TellerResult<String> {
        self.form.message_color().await
    }

    /// Whether the status message sits above the "Amount to be Deposited" label
    pub async fn message_is_above_label(&self) -> TellerResult<bool> {
        self.form.message_is_above_label().await
    }
}

impl PageObject for DepositPage {
    fn screen(&self) -> &Screen {
        self.form.screen()
    }

    fn page_name(&self) -> &'static str {
        "deposit"
    }
}
