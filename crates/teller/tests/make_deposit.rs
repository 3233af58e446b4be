//! Deposit scenarios against the simulated bank
//!
//! A logged-in customer deposits into an existing account: a red "Deposit
//! Successful" message appears above the amount label, the balance grows by
//! the amount and a Credit row is added to the transactions.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use teller::data::{
    amounts, customers, messages, required_field_message, step_mismatch_message, FieldKind,
};
use teller::{
    init_tracing, run_simulated, BrowserEngine, PageObject, Pages, SuiteConfig, TellerResult,
    TransactionType,
};

fn config() -> SuiteConfig {
    init_tracing();
    SuiteConfig::default().with_retries(0)
}

async fn login(pages: &Pages) -> TellerResult<()> {
    pages.home().goto().await?;
    pages.home().click_customer_login().await?;
    pages.customer_login().login(customers::HERMOINE_GRANGER).await
}

// ============================================================================
// Message and balance
// ============================================================================

#[tokio::test]
async fn test_success_message_red_and_above_label() {
    run_simulated("deposit message", &config(), |pages| async move {
        login(&pages).await?;
        pages.account().click_deposit_tab().await?;
        pages.deposit().deposit(amounts::SMALL_DEPOSIT).await?;

        assert_eq!(pages.deposit().deposit_message().await?, messages::DEPOSIT_SUCCESS);
        assert_eq!(pages.deposit().message_color().await?, "rgb(255, 0, 0)");
        assert!(pages.deposit().message_is_above_label().await?);
        Ok(())
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_balance_updated_after_deposit() {
    run_simulated("deposit balance", &config(), |pages| async move {
        login(&pages).await?;
        let initial = pages.account().balance_as_number().await?;
        pages.account().click_deposit_tab().await?;
        pages.deposit().deposit(amounts::MEDIUM_DEPOSIT).await?;

        let expected = initial + f64::from(amounts::MEDIUM_DEPOSIT);
        assert_eq!(pages.account().balance_as_number().await?, expected);
        Ok(())
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_deposit_listed_as_credit() {
    run_simulated("deposit credit row", &config(), |pages| async move {
        login(&pages).await?;
        pages.account().click_deposit_tab().await?;
        pages.deposit().deposit(250).await?;
        assert!(pages.deposit().is_deposit_successful().await?);

        pages.account().click_transactions().await?;
        pages.transactions().click_date_time_header().await?;
        let rows = pages.transactions().all_transactions().await?;
        assert!(!rows.is_empty());
        assert!(rows[0].amount.contains("250"));
        assert!(rows[0].is(TransactionType::Credit));
        Ok(())
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_multiple_deposits_accumulate() {
    run_simulated("multiple deposits", &config(), |pages| async move {
        login(&pages).await?;
        let initial = pages.account().balance_as_number().await?;
        pages.account().click_deposit_tab().await?;
        let deposits = [100_u32, 200, 150];
        for amount in deposits {
            pages.deposit().deposit(amount).await?;
        }
        let total: u32 = deposits.iter().sum();
        assert_eq!(pages.account().balance_as_number().await?, initial + f64::from(total));
        Ok(())
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_smallest_deposit() {
    run_simulated("deposit of one", &config(), |pages| async move {
        login(&pages).await?;
        let initial = pages.account().balance_as_number().await?;
        pages.account().click_deposit_tab().await?;
        pages.deposit().deposit(1).await?;
        assert_eq!(pages.deposit().deposit_message().await?, messages::DEPOSIT_SUCCESS);
        assert_eq!(pages.account().balance_as_number().await?, initial + 1.0);
        Ok(())
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_currency_unchanged_by_deposit() {
    run_simulated("deposit currency", &config(), |pages| async move {
        login(&pages).await?;
        let currency = pages.account().currency().await?;
        pages.account().click_deposit_tab().await?;
        pages.deposit().deposit(300).await?;
        assert_eq!(pages.account().currency().await?, currency);
        Ok(())
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_input_cleared_after_deposit() {
    run_simulated("deposit clears input", &config(), |pages| async move {
        login(&pages).await?;
        pages.account().click_deposit_tab().await?;
        pages.deposit().deposit(amounts::SMALL_DEPOSIT).await?;
        assert_eq!(pages.deposit().screen().value("amount").await?, "");
        Ok(())
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_every_deposit_recorded() {
    run_simulated("deposits recorded", &config(), |pages| async move {
        login(&pages).await?;
        pages.account().click_transactions().await?;
        pages.transactions().click_reset().await?;
        let initial = pages.transactions().transaction_count().await?;
        pages.transactions().click_back().await?;

        pages.account().click_deposit_tab().await?;
        for amount in [100, 200, 300] {
            pages.deposit().deposit(amount).await?;
        }

        pages.account().click_transactions().await?;
        assert_eq!(pages.transactions().transaction_count().await?, initial + 3);
        let credits = pages.transactions().transactions_by_type(TransactionType::Credit).await?;
        assert!(credits.len() >= 3);
        Ok(())
    })
    .await
    .unwrap();
}

// ============================================================================
// Native validation
// ============================================================================

#[tokio::test]
async fn test_empty_amount_tooltip_per_engine() {
    for engine in [BrowserEngine::Chromium, BrowserEngine::Firefox, BrowserEngine::Webkit] {
        let config = config().with_engine(engine);
        run_simulated("empty deposit", &config, move |pages| async move {
            login(&pages).await?;
            pages.account().click_deposit_tab().await?;
            pages.deposit().click_deposit().await?;
            assert_eq!(
                pages.deposit().field_validation_message().await?,
                required_field_message(engine, FieldKind::Number)
            );
            Ok(())
        })
        .await
        .unwrap();
    }
}

#[tokio::test]
async fn test_decimal_amount_rejected() {
    for engine in [BrowserEngine::Chromium, BrowserEngine::Firefox, BrowserEngine::Webkit] {
        let config = config().with_engine(engine);
        run_simulated("decimal deposit", &config, move |pages| async move {
            login(&pages).await?;
            let initial = pages.account().balance_as_number().await?;
            pages.account().click_deposit_tab().await?;
            pages.deposit().deposit(123.45).await?;
            assert_eq!(
                pages.deposit().field_validation_message().await?,
                step_mismatch_message(engine, 123.45)
            );
            assert_eq!(pages.account().balance_as_number().await?, initial);
            Ok(())
        })
        .await
        .unwrap();
    }
}

// ============================================================================
// Form
// ============================================================================

#[tokio::test]
async fn test_deposit_form_displayed() {
    run_simulated("deposit form", &config(), |pages| async move {
        login(&pages).await?;
        pages.account().click_deposit_tab().await?;
        assert!(pages.deposit().is_loaded().await?);
        assert!(!pages.withdrawal().is_loaded().await?);
        Ok(())
    })
    .await
    .unwrap();
}
