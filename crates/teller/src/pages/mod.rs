//! Page objects of the XYZ Bank application and the [`Pages`] aggregator.
//!
//! Every page object holds a clone of the same [`Session`], so all of them
//! observe the one live tab. Actions wait for their own settle condition
//! before returning; queries re-read the DOM on every call.

mod account;
mod add_customer;
mod amount_form;
mod bank_manager;
mod customer_login;
mod customers_table;
mod deposit;
mod home;
mod open_account;
mod transactions;
mod withdrawal;

pub use account::AccountPage;
pub use add_customer::{AddCustomerPage, CustomerField};
pub use bank_manager::BankManagerPage;
pub use customer_login::CustomerLoginPage;
pub use customers_table::CustomersTablePage;
pub use deposit::DepositPage;
pub use home::HomePage;
pub use open_account::OpenAccountPage;
pub use transactions::TransactionsPage;
pub use withdrawal::WithdrawalPage;

use crate::session::Session;

/// Every page object, bound to one session.
///
/// ```ignore
/// let pages = Pages::new(Session::simulated(SuiteConfig::default()));
/// pages.home().goto().await?;
/// pages.home().click_customer_login().await?;
/// pages.customer_login().login("Hermoine Granger").await?;
/// assert_eq!(pages.account().balance().await?, "5096");
/// ```
#[derive(Debug, Clone)]
pub struct Pages {
    session: Session,
    home: HomePage,
    customer_login: CustomerLoginPage,
    account: AccountPage,
    deposit: DepositPage,
    withdrawal: WithdrawalPage,
    transactions: TransactionsPage,
    customers: CustomersTablePage,
    add_customer: AddCustomerPage,
    open_account: OpenAccountPage,
    bank_manager: BankManagerPage,
}

impl Pages {
    /// Build every page object against `session`
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self {
            home: HomePage::new(session.clone()),
            customer_login: CustomerLoginPage::new(session.clone()),
            account: AccountPage::new(session.clone()),
            deposit: DepositPage::new(session.clone()),
            withdrawal: WithdrawalPage::new(session.clone()),
            transactions: TransactionsPage::new(session.clone()),
            customers: CustomersTablePage::new(session.clone()),
            add_customer: AddCustomerPage::new(session.clone()),
            open_account: OpenAccountPage::new(session.clone()),
            bank_manager: BankManagerPage::new(session.clone()),
            session,
        }
    }

    /// The shared session
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Home screen
    #[must_use]
    pub fn home(&self) -> &HomePage {
        &self.home
    }

    /// Customer login screen
    #[must_use]
    pub fn customer_login(&self) -> &CustomerLoginPage {
        &self.customer_login
    }

    /// Account screen
    #[must_use]
    pub fn account(&self) -> &AccountPage {
        &self.account
    }

    /// Deposit tab
    #[must_use]
    pub fn deposit(&self) -> &DepositPage {
        &self.deposit
    }

    /// Withdrawl tab
    #[must_use]
    pub fn withdrawal(&self) -> &WithdrawalPage {
        &self.withdrawal
    }

    /// Transactions screen
    #[must_use]
    pub fn transactions(&self) -> &TransactionsPage {
        &self.transactions
    }

    /// Customers table
    #[must_use]
    pub fn customers(&self) -> &CustomersTablePage {
        &self.customers
    }

    /// Add Customer form
    #[must_use]
    pub fn add_customer(&self) -> &AddCustomerPage {
        &self.add_customer
    }

    /// Open Account form
    #[must_use]
    pub fn open_account(&self) -> &OpenAccountPage {
        &self.open_account
    }

    /// Manager dashboard
    #[must_use]
    pub fn bank_manager(&self) -> &BankManagerPage {
        &self.bank_manager
    }
}
