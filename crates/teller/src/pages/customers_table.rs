//! Manager's Customers table with its search box.

use crate::locator::{Locator, Selector};
use crate::model::Customer;
use crate::page_object::{LocatorRegistry, PageObject, Screen};
use crate::result::TellerResult;
use crate::session::Session;
use crate::table;
use crate::wait;

const SEARCH: &str = r#"input[ng-model="searchCustomer"]"#;

pub(crate) fn landmark() -> Locator {
    Locator::new(SEARCH)
}

fn registry() -> LocatorRegistry {
    LocatorRegistry::builder()
        .defining("table", Selector::css("table.table"))
        .defining("search", Selector::css(SEARCH))
        .with_locator("rows", Selector::css("table.table tbody tr"))
        .build()
}

/// Customers screen (`#/manager/list`)
#[derive(Debug, Clone)]
pub struct CustomersTablePage {
    screen: Screen,
}

impl CustomersTablePage {
    /// Bind to a session
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self {
            screen: Screen::new(session, registry()),
        }
    }

    /// Replace the search term and wait for the table to filter
    pub async fn search_customer(&self, term: &str) -> TellerResult<()> {
        let rows = self.screen.locator("rows")?;
        let before = table::scrape_rows(self.screen.base(), &rows).await?;
        self.screen.fill("search", term).await?;
        let options = self.screen.base().config().fallback_wait();
        let waited_for = format!("customers table to filter on {term:?}");
        wait::wait_for_change(&waited_for, &before, &options, || {
            table::scrape_rows(self.screen.base(), &rows)
        })
        .await?;
        Ok(())
    }

    /// Every displayed customer, in table order
    pub async fn all_customers(&self) -> TellerResult<Vec<Customer>> {
        table::scrape_table(self.screen.base(), &self.screen.locator("rows")?).await
    }

    /// First customer with this first and last name
    pub async fn find_customer_by_name(
        &self,
        first_name: &str,
        last_name: &str,
    ) -> TellerResult<Option<Customer>> {
        let customers = self.all_customers().await?;
        Ok(customers.into_iter().find(|c| c.is_named(first_name, last_name)))
    }

    /// Whether a customer with this name is displayed
    pub async fn customer_exists(&self, first_name: &str, last_name: &str) -> TellerResult<bool> {
        Ok(self.find_customer_by_name(first_name, last_name).await?.is_some())
    }

    /// Number of displayed rows
    pub async fn customer_count(&self) -> TellerResult<usize> {
        self.screen.count("rows").await
    }

    /// Account numbers of the named customer, empty when not listed
    pub async fn customer_account_numbers(
        &self,
        first_name: &str,
        last_name: &str,
    ) -> TellerResult<Vec<String>> {
        Ok(self
            .find_customer_by_name(first_name, last_name)
            .await?
            .map(|c| c.account_number_list())
            .unwrap_or_default())
    }

    /// Search, then return what the table shows
    pub async fn find_customers_by_searching(&self, term: &str) -> TellerResult<Vec<Customer>> {
        self.search_customer(term).await?;
        self.all_customers().await
    }
}

impl PageObject for CustomersTablePage {
    fn screen(&self) -> &Screen {
        &self.screen
    }

    fn page_name(&self) -> &'static str {
        "customers"
    }
}
