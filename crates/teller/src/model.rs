//! Value objects scraped from the bank's tables, and amount parsing.

use crate::result::{TellerError, TellerResult};
use crate::table::TableRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One row of the manager's Customers table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Post code
    pub post_code: String,
    /// Space-separated account numbers as displayed
    pub account_numbers: String,
}

impl Customer {
    /// Account numbers split on whitespace
    #[must_use]
    pub fn account_number_list(&self) -> Vec<String> {
        self.account_numbers
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }

    /// `"First Last"`, as listed in the login and open-account dropdowns
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Whether `first_name` and `last_name` match, ignoring surrounding whitespace
    #[must_use]
    pub fn is_named(&self, first_name: &str, last_name: &str) -> bool {
        self.first_name.trim() == first_name.trim() && self.last_name.trim() == last_name.trim()
    }

    /// Whether any of first name, last name or post code contains `term`,
    /// case-insensitively
    #[must_use]
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        [&self.first_name, &self.last_name, &self.post_code]
            .iter()
            .any(|field| field.to_lowercase().contains(&term))
    }
}

impl TableRecord for Customer {
    const MIN_CELLS: usize = 4;

    fn from_cells(mut cells: Vec<String>) -> Self {
        cells.truncate(Self::MIN_CELLS);
        let mut cells = cells.into_iter();
        let mut next = || cells.next().unwrap_or_default();
        Self {
            first_name: next(),
            last_name: next(),
            post_code: next(),
            account_numbers: next(),
        }
    }
}

/// Credit or debit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    /// Money in
    Credit,
    /// Money out
    Debit,
}

impl TransactionType {
    /// Label shown in the Transactions table
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Credit => "Credit",
            Self::Debit => "Debit",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TransactionType {
    type Err = TellerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "credit" => Ok(Self::Credit),
            "debit" => Ok(Self::Debit),
            _ => Err(TellerError::Parse {
                text: s.to_string(),
                message: "expected Credit or Debit".to_string(),
            }),
        }
    }
}

/// One row of a customer's Transactions table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Date-Time column as displayed
    pub date: String,
    /// Amount column as displayed
    pub amount: String,
    /// Transaction Type column as displayed
    #[serde(rename = "type")]
    pub transaction_type: String,
}

impl Transaction {
    /// Parsed transaction type
    pub fn kind(&self) -> TellerResult<TransactionType> {
        self.transaction_type.parse()
    }

    /// Whether the type column equals `kind`, case-insensitively
    #[must_use]
    pub fn is(&self, kind: TransactionType) -> bool {
        self.transaction_type.trim().eq_ignore_ascii_case(kind.label())
    }

    /// Parsed amount
    pub fn amount_value(&self) -> TellerResult<f64> {
        parse_amount(&self.amount)
    }
}

impl TableRecord for Transaction {
    const MIN_CELLS: usize = 3;

    fn from_cells(mut cells: Vec<String>) -> Self {
        cells.truncate(Self::MIN_CELLS);
        let mut cells = cells.into_iter();
        let mut next = || cells.next().unwrap_or_default();
        Self {
            date: next(),
            amount: next(),
            transaction_type: next(),
        }
    }
}

/// Parse a displayed amount: keep digits, `.` and `-`, then parse.
///
/// `"$ 1,234.50"` is `1234.5`, `"Balance : 900"` is `900.0`.
pub fn parse_amount(text: &str) -> TellerResult<f64> {
    let kept: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    kept.parse::<f64>().map_err(|e| TellerError::Parse {
        text: text.to_string(),
        message: e.to_string(),
    })
}
