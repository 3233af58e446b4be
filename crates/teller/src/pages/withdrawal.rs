//! Withdrawl tab of the account screen.

use super::amount_form::{self, AmountForm, FormLabels};
use crate::locator::Locator;
use crate::page_object::{PageObject, Screen};
use crate::result::TellerResult;
use crate::session::Session;
use std::fmt::Display;

const LABELS: FormLabels = FormLabels {
    submit: "Withdraw",
    amount: "Amount to be Withdrawn",
    message: r#"[ng-show="message"]"#,
};

pub(crate) fn landmark() -> Locator {
    amount_form::submit_button(LABELS)
}

/// Withdrawal form
#[derive(Debug, Clone)]
pub struct WithdrawalPage {
    form: AmountForm,
}

impl WithdrawalPage {
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
    pub async fn click_withdraw(&self) -> TellerResult<()> {
        self.form.submit().await
    }

    /// Enter `amount` and submit
    pub async fn withdraw(&self, amount: impl Display) -> TellerResult<()> {
        tracing::info!(%amount, "withdraw");
        self.enter_amount(amount).await?;
        self.click_withdraw().await
    }

    /// Status message, `""` when none is shown
    pub async fn withdrawal_message(&self) -> TellerResult<String> {
        self.form.message().await
    }

    /// Whether the status message reports success
    pub async fn is_withdrawal_successful(&self) -> TellerResult<bool> {
        self.form.is_successful().await
    }

    /// Native validation message of the amount input
    pub async fn field_validation_message(&self) -> TellerResult<String> {
        self.form.field_validation_message().await
    }
}

impl PageObject for WithdrawalPage {
    fn screen(&self) -> &Screen {
        self.form.screen()
    }

    fn page_name(&self) -> &'static str {
        "withdrawal"
    }
}
