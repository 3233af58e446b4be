//! Test data: known customers, currencies, amounts and the literal messages
//! the bank application shows.

use crate::config::BrowserEngine;
use crate::result::TellerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Customers seeded by the application
pub mod customers {
    /// Hermoine Granger
    pub const HERMOINE_GRANGER: &str = "Hermoine Granger";
    /// Harry Potter
    pub const HARRY_POTTER: &str = "Harry Potter";
    /// Ron Weasly (spelled as the application spells it)
    pub const RON_WEASLY: &str = "Ron Weasly";
    /// Albus Dumbledore
    pub const ALBUS_DUMBLEDORE: &str = "Albus Dumbledore";
    /// Neville Longbottom
    pub const NEVILLE_LONGBOTTOM: &str = "Neville Longbottom";

    /// All seeded customers, in dropdown order
    pub const ALL: [&str; 5] = [
        HERMOINE_GRANGER,
        HARRY_POTTER,
        RON_WEASLY,
        ALBUS_DUMBLEDORE,
        NEVILLE_LONGBOTTOM,
    ];
}

/// Amounts used by deposit and withdrawal scenarios
pub mod amounts {
    /// Small deposit
    pub const SMALL_DEPOSIT: u32 = 100;
    /// Medium deposit
    pub const MEDIUM_DEPOSIT: u32 = 500;
    /// Large deposit
    pub const LARGE_DEPOSIT: u32 = 1000;
    /// Small withdrawal
    pub const SMALL_WITHDRAWAL: u32 = 50;
    /// Medium withdrawal
    pub const MEDIUM_WITHDRAWAL: u32 = 200;
    /// Large withdrawal
    pub const LARGE_WITHDRAWAL: u32 = 500;
}

/// Messages shown by the application
pub mod messages {
    /// Deposit success, shown above the amount label
    pub const DEPOSIT_SUCCESS: &str = "Deposit Successful";
    /// Withdrawal success
    pub const WITHDRAWAL_SUCCESS: &str = "Transaction successful";
    /// Withdrawal over the balance
    pub const INSUFFICIENT_FUNDS: &str = "Transaction Failed. You can not withdraw amount more than the balance.";
    /// Alert prefix after adding a customer; the id follows
    pub const CUSTOMER_ADDED: &str = "Customer added successfully with customer id :";
    /// Alert when first name, last name and post code all match an existing customer
    pub const DUPLICATE_CUSTOMER: &str = "Please check the details. Customer may be duplicate.";
    /// Alert prefix after opening an account; the number follows
    pub const ACCOUNT_CREATED: &str = "Account created successfully with account Number :";
}

/// Post code used for new customers
pub const TEST_POST_CODE: &str = "SW1A 1AA";

/// A name that will not collide with existing customers
#[must_use]
pub fn unique_name(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("{prefix}{}", &id[..12])
}

/// Account currencies offered by the Open Account form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    /// Dollar
    Dollar,
    /// Pound
    Pound,
    /// Rupee
    Rupee,
}

impl Currency {
    /// All currencies, in dropdown order
    pub const ALL: [Self; 3] = [Self::Dollar, Self::Pound, Self::Rupee];

    /// Label shown in the dropdown and account header
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Dollar => "Dollar",
            Self::Pound => "Pound",
            Self::Rupee => "Rupee",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Currency {
    type Err = TellerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dollar" | "dollars" => Ok(Self::Dollar),
            "pound" | "pounds" => Ok(Self::Pound),
            "rupee" | "rupees" => Ok(Self::Rupee),
            _ => Err(TellerError::Parse {
                text: s.to_string(),
                message: "unknown currency".to_string(),
            }),
        }
    }
}

// =============================================================================
// Native validation messages
// =============================================================================

/// Kind of form control, as far as native validation wording differs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// `<input type="text">`
    Text,
    /// `<input type="number">`
    Number,
    /// `<select>`
    Select,
}

/// Message for a required control left empty
#[must_use]
pub fn required_field_message(engine: BrowserEngine, kind: FieldKind) -> &'static str {
    match (engine, kind) {
        (BrowserEngine::Webkit, FieldKind::Select) => "Select an item in the list",
        (BrowserEngine::Webkit, _) => "Fill out this field",
        (_, FieldKind::Select) => "Please select an item in the list.",
        (BrowserEngine::Firefox, FieldKind::Number) => "Please enter a number.",
        _ => "Please fill out this field.",
    }
}

/// Message for a number input holding a non-integer with the default step
#[must_use]
pub fn step_mismatch_message(engine: BrowserEngine, value: f64) -> String {
    let low = value.floor();
    let high = low + 1.0;
    match engine {
        BrowserEngine::Chromium => format!(
            "Please enter a valid value. The two nearest valid values are {low} and {high}."
        ),
        BrowserEngine::Firefox => format!(
            "Please select a valid value. The two nearest valid values are {low} and {high}."
        ),
        BrowserEngine::Webkit => "Enter a valid value".to_string(),
    }
}
