//! Transactions list of the selected account.

use super::account;
use crate::locator::{Locator, Selector};
use crate::model::{Transaction, TransactionType};
use crate::page_object::{LocatorRegistry, PageObject, Screen};
use crate::result::TellerResult;
use crate::session::Session;
use crate::table;
use crate::wait;

const BACK: &str = r#"button[ng-click="back()"]"#;
const ROWS: &str = "table.table tbody tr";

pub(crate) fn landmark() -> Locator {
    Locator::new(BACK)
}

fn registry() -> LocatorRegistry {
    LocatorRegistry::builder()
        .defining("back", Selector::css(BACK))
        .defining("reset", Selector::css(r#"button[ng-click="reset()"]"#))
        .with_locator("table", Selector::css("table.table"))
        .with_locator("rows", Selector::css(ROWS))
        .with_locator("first_row", Selector::css("tr#anchor0"))
        .with_locator("date_time_header", Selector::css_with_text("a", "Date-Time"))
        .with_locator("start", Selector::css("#start"))
        .with_locator("end", Selector::css("#end"))
        .build()
}

/// Transactions screen (`#/listTx`).
///
/// Rows come back in DOM order; sort first, then re-query.
#[derive(Debug, Clone)]
pub struct TransactionsPage {
    screen: Screen,
}

impl TransactionsPage {
    /// Bind to a session
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self {
            screen: Screen::new(session, registry()),
        }
    }

    /// Back to the account screen
    pub async fn click_back(&self) -> TellerResult<()> {
        let base = self.screen.base();
        self.screen.click("back").await?;
        base.wait_for_page_load().await?;
        base.wait_for_element(&account::landmark(), base.settle_wait().timeout())
            .await
    }

    /// Clear the account's transactions
    pub async fn click_reset(&self) -> TellerResult<()> {
        let before = self.snapshot().await?;
        self.screen.click("reset").await?;
        self.settle_table("reset", before).await
    }

    /// Toggle the Date-Time sort order
    pub async fn click_date_time_header(&self) -> TellerResult<()> {
        let before = self.snapshot().await?;
        self.screen.click("date_time_header").await?;
        self.settle_table("sort", before).await
    }

    /// Restrict the list to a `datetime-local` range (`YYYY-MM-DDTHH:MM`)
    pub async fn filter_by_date_range(&self, start: &str, end: &str) -> TellerResult<()> {
        let before = self.snapshot().await?;
        self.screen.fill("start", start).await?;
        self.screen.fill("end", end).await?;
        self.settle_table("date filter", before).await
    }

    /// Every row, in displayed order
    pub async fn all_transactions(&self) -> TellerResult<Vec<Transaction>> {
        table::scrape_table(self.screen.base(), &self.screen.locator("rows")?).await
    }

    /// Number of rows
    pub async fn transaction_count(&self) -> TellerResult<usize> {
        self.screen.count("rows").await
    }

    /// Whether any row is displayed
    pub async fn has_transactions(&self) -> TellerResult<bool> {
        Ok(self.transaction_count().await? > 0)
    }

    /// Rows of one type, in displayed order
    pub async fn transactions_by_type(
        &self,
        kind: TransactionType,
    ) -> TellerResult<Vec<Transaction>> {
        let mut rows = self.all_transactions().await?;
        rows.retain(|tx| tx.is(kind));
        Ok(rows)
    }

    async fn snapshot(&self) -> TellerResult<Vec<Vec<String>>> {
        table::scrape_rows(self.screen.base(), &self.screen.locator("rows")?).await
    }

    /// Wait for the table to re-render; an unchanged table after the
    /// fallback delay is accepted
    async fn settle_table(&self, what: &str, before: Vec<Vec<String>>) -> TellerResult<()> {
        let options = self.screen.base().config().fallback_wait();
        let waited_for = format!("transactions table to change after {what}");
        let result =
            wait::wait_for_change(&waited_for, &before, &options, || self.snapshot()).await?;
        tracing::debug!(what, changed = result.success, "transactions table settled");
        Ok(())
    }
}

impl PageObject for TransactionsPage {
    fn screen(&self) -> &Screen {
        &self.screen
    }

    fn page_name(&self) -> &'static str {
        "transactions"
    }
}
