//! End-to-end scenarios against the hosted demo in Chromium
//!
//! These need a Chromium binary and network access, so they are ignored by
//! default:
//!
//! ```text
//! cargo test -p teller --features browser --test live_site -- --ignored
//! ```
//!
//! `CHROMIUM_PATH`, `TELLER_BASE_URL` and `TELLER_HEADLESS` are honoured.

#![cfg(feature = "browser")]
#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::time::Duration;
use teller::data::{customers, messages, unique_name, Currency, TEST_POST_CODE};
use teller::{init_tracing, run_in_browser, SuiteConfig};

fn config() -> SuiteConfig {
    init_tracing();
    SuiteConfig::load().expect("suite configuration")
}

#[tokio::test]
#[ignore = "requires Chromium and network access"]
async fn test_live_deposit() {
    run_in_browser("live deposit", &config(), |pages| async move {
        pages.home().goto().await?;
        pages.home().click_customer_login().await?;
        pages.customer_login().login(customers::HERMOINE_GRANGER).await?;
        let initial = pages.account().balance_as_number().await?;

        pages.account().click_deposit_tab().await?;
        pages.deposit().deposit(100).await?;
        assert_eq!(pages.deposit().deposit_message().await?, messages::DEPOSIT_SUCCESS);
        assert_eq!(pages.account().balance_as_number().await?, initial + 100.0);
        Ok(())
    })
    .await
    .unwrap();
}

#[tokio::test]
#[ignore = "requires Chromium and network access"]
async fn test_live_add_customer_and_open_account() {
    run_in_browser("live add customer", &config(), |pages| async move {
        let first = unique_name("Live");
        pages.home().goto().await?;
        pages.home().click_bank_manager_login().await?;
        pages.bank_manager().click_add_customer().await?;

        let alert = pages.add_customer().arm_alert()?;
        pages.add_customer().add_customer(&first, "Tester", TEST_POST_CODE).await?;
        let added = alert.within(Duration::from_secs(10)).await?;
        assert!(added.message().contains(messages::CUSTOMER_ADDED));

        pages.bank_manager().click_open_account().await?;
        let alert = pages.open_account().arm_alert()?;
        pages
            .open_account()
            .open_account(&format!("{first} Tester"), Currency::Pound)
            .await?;
        let opened = alert.within(Duration::from_secs(10)).await?;
        let number = opened.trailing_number().expect("account number");

        pages.bank_manager().click_customers().await?;
        let numbers = pages.customers().customer_account_numbers(&first, "Tester").await?;
        assert_eq!(numbers, [number.to_string()]);
        Ok(())
    })
    .await
    .unwrap();
}
