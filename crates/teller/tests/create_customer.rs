//! Add Customer scenarios against the simulated bank
//!
//! A bank manager adds customers through the Add Customer form; the new
//! customer must show up in the Customers table with the exact details
//! entered, and each required field is enforced by native validation.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::time::Duration;
use teller::data::{messages, required_field_message, unique_name, FieldKind, TEST_POST_CODE};
use teller::{
    init_tracing, run_simulated, BrowserEngine, CustomerField, PageObject, Pages, SuiteConfig,
    TellerResult,
};

const ALERT_WAIT: Duration = Duration::from_secs(5);

fn config() -> SuiteConfig {
    init_tracing();
    SuiteConfig::default().with_retries(0)
}

async fn open_add_customer(pages: &Pages) -> TellerResult<()> {
    pages.home().goto().await?;
    pages.home().click_bank_manager_login().await?;
    pages.bank_manager().click_add_customer().await
}

/// Submit the form with every field but `missing`, returning the message
/// the empty field reports
async fn submit_without(pages: &Pages, missing: CustomerField) -> TellerResult<String> {
    open_add_customer(pages).await?;
    let first = if missing == CustomerField::FirstName { "" } else { "Test" };
    let last = if missing == CustomerField::LastName { "" } else { "User" };
    let post = if missing == CustomerField::PostCode { "" } else { TEST_POST_CODE };
    pages.add_customer().add_customer(first, last, post).await?;
    pages.add_customer().field_validation_message(missing).await
}

// ============================================================================
// Required fields
// ============================================================================

#[tokio::test]
async fn test_first_name_is_required() {
    run_simulated("first name required", &config(), |pages| async move {
        let message = submit_without(&pages, CustomerField::FirstName).await?;
        assert_eq!(message, required_field_message(BrowserEngine::Chromium, FieldKind::Text));
        Ok(())
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_last_name_is_required() {
    run_simulated("last name required", &config(), |pages| async move {
        let message = submit_without(&pages, CustomerField::LastName).await?;
        assert_eq!(message, "Please fill out this field.");
        Ok(())
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_post_code_is_required_in_webkit() {
    let config = config().with_engine(BrowserEngine::Webkit);
    run_simulated("post code required", &config, |pages| async move {
        let message = submit_without(&pages, CustomerField::PostCode).await?;
        assert_eq!(message, required_field_message(BrowserEngine::Webkit, FieldKind::Text));
        Ok(())
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_missing_field_adds_nobody() {
    run_simulated("missing field adds nobody", &config(), |pages| async move {
        submit_without(&pages, CustomerField::PostCode).await?;
        pages.bank_manager().click_customers().await?;
        assert!(!pages.customers().customer_exists("Test", "User").await?);
        Ok(())
    })
    .await
    .unwrap();
}

// ============================================================================
// Adding customers
// ============================================================================

#[tokio::test]
async fn test_customer_added_with_valid_details() {
    run_simulated("add customer", &config(), |pages| async move {
        let first = unique_name("Luna");
        open_add_customer(&pages).await?;

        let alert = pages.add_customer().arm_alert()?;
        pages.add_customer().add_customer(&first, "Lovegood", TEST_POST_CODE).await?;
        let dialog = alert.within(ALERT_WAIT).await?;

        assert!(dialog.message().contains(messages::CUSTOMER_ADDED));
        assert!(dialog.trailing_number().is_some());
        Ok(())
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_duplicate_customer_rejected() {
    run_simulated("duplicate customer", &config(), |pages| async move {
        open_add_customer(&pages).await?;

        let alert = pages.add_customer().arm_alert()?;
        pages.add_customer().add_customer("Harry", "Potter", "E725JB").await?;
        let dialog = alert.within(ALERT_WAIT).await?;

        assert_eq!(dialog.message(), messages::DUPLICATE_CUSTOMER);
        assert_eq!(dialog.trailing_number(), None);
        Ok(())
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_new_customer_appears_in_table() {
    run_simulated("customer in table", &config(), |pages| async move {
        pages.home().goto().await?;
        pages.home().click_bank_manager_login().await?;
        pages.bank_manager().click_customers().await?;
        let before = pages.customers().customer_count().await?;

        let first = unique_name("Cho");
        pages.bank_manager().click_add_customer().await?;
        let alert = pages.add_customer().arm_alert()?;
        pages.add_customer().add_customer(&first, "Chang", TEST_POST_CODE).await?;
        alert.within(ALERT_WAIT).await?;

        pages.bank_manager().click_customers().await?;
        assert_eq!(pages.customers().customer_count().await?, before + 1);
        let customer = pages
            .customers()
            .find_customer_by_name(&first, "Chang")
            .await?
            .expect("new customer listed");
        assert_eq!(customer.first_name, first);
        assert_eq!(customer.last_name, "Chang");
        assert_eq!(customer.post_code, TEST_POST_CODE);
        assert!(customer.account_number_list().is_empty());
        Ok(())
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_add_customer_form_displayed() {
    run_simulated("add customer form", &config(), |pages| async move {
        open_add_customer(&pages).await?;
        assert!(pages.add_customer().is_loaded().await?);
        assert!(!pages.open_account().is_loaded().await?);
        Ok(())
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_special_characters_kept_verbatim() {
    run_simulated("special characters", &config(), |pages| async move {
        let first = "Zoë-Anne O'Neil";
        let post = "E1 #7&";
        open_add_customer(&pages).await?;
        let alert = pages.add_customer().arm_alert()?;
        pages.add_customer().add_customer(first, "Smith", post).await?;
        alert.within(ALERT_WAIT).await?;

        pages.bank_manager().click_customers().await?;
        let customer = pages
            .customers()
            .find_customer_by_name(first, "Smith")
            .await?
            .expect("customer with special characters listed");
        assert_eq!(customer.post_code, post);
        Ok(())
    })
    .await
    .unwrap();
}

// ============================================================================
// Search
// ============================================================================

#[tokio::test]
async fn test_search_box_filters_customers() {
    run_simulated("customer search", &config(), |pages| async move {
        pages.home().goto().await?;
        pages.home().click_bank_manager_login().await?;
        pages.bank_manager().click_customers().await?;

        let found = pages.customers().find_customers_by_searching("Hermoine").await?;
        assert_eq!(found.len(), 1);
        assert!(found[0].is_named("Hermoine", "Granger"));

        let none = pages.customers().find_customers_by_searching("Voldemort").await?;
        assert!(none.is_empty());
        Ok(())
    })
    .await
    .unwrap();
}
