//! Transaction model
//!
//! A single recorded money movement. The sign of the amount decides whether
//! a transaction is income (zero or positive) or an expense (negative).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use super::ids::{CategoryId, TransactionId};
use super::money::Money;

/// Income or expense, derived from the amount's sign
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn from_amount(amount: Money) -> Self {
        if amount.is_negative() {
            Self::Expense
        } else {
            Self::Income
        }
    }

    /// Apply this type's sign to an amount regardless of its current sign
    pub fn apply_sign(&self, amount: Money) -> Money {
        match self {
            Self::Income => amount.abs(),
            Self::Expense => -amount.abs(),
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Income => write!(f, "Income"),
            Self::Expense => write!(f, "Expense"),
        }
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" | "in" | "credit" => Ok(Self::Income),
            "expense" | "out" | "debit" => Ok(Self::Expense),
            other => Err(format!("Unknown transaction type: '{}'", other)),
        }
    }
}

/// Where a transaction came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransactionSource {
    #[default]
    Manual,
    Revolut,
    Raiffeisen,
    Generic,
    OpenBanking,
}

impl fmt::Display for TransactionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Manual => write!(f, "Manual"),
            Self::Revolut => write!(f, "Revolut"),
            Self::Raiffeisen => write!(f, "Raiffeisen"),
            Self::Generic => write!(f, "CSV"),
            Self::OpenBanking => write!(f, "Open Banking"),
        }
    }
}

/// A financial transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,

    pub date: NaiveDate,

    pub description: String,

    /// Amount (positive for income, negative for expense)
    pub amount: Money,

    pub category_id: CategoryId,

    #[serde(default)]
    pub source: TransactionSource,

    /// Import ID for duplicate detection across statement imports
    #[serde(default)]
    pub import_id: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(date: NaiveDate, amount: Money, category_id: CategoryId) -> Self {
        let now = Utc::now();
        Self {
            id: TransactionId::new(),
            date,
            description: String::new(),
            amount,
            category_id,
            source: TransactionSource::Manual,
            import_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a transaction with all common fields
    pub fn with_details(
        date: NaiveDate,
        amount: Money,
        description: impl Into<String>,
        category_id: CategoryId,
        source: TransactionSource,
    ) -> Self {
        let mut txn = Self::new(date, amount, category_id);
        txn.description = description.into();
        txn.source = source;
        txn
    }

    pub fn kind(&self) -> TransactionType {
        TransactionType::from_amount(self.amount)
    }

    pub fn is_income(&self) -> bool {
        self.kind() == TransactionType::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind() == TransactionType::Expense
    }

    pub fn set_category(&mut self, category_id: CategoryId) {
        self.category_id = category_id;
        self.updated_at = Utc::now();
    }

    pub fn set_amount(&mut self, amount: Money) {
        self.amount = amount;
        self.updated_at = Utc::now();
    }

    pub fn validate(&self) -> Result<(), TransactionValidationError> {
        if self.amount.is_zero() {
            return Err(TransactionValidationError::ZeroAmount);
        }

        if self.description.trim().is_empty() {
            return Err(TransactionValidationError::EmptyDescription);
        }

        Ok(())
    }

    /// Generate an import ID for duplicate detection
    pub fn generate_import_id(&self) -> String {
        generate_import_id(self.date, self.amount, &self.description)
    }
}

/// Fingerprint of a statement row built from its date, amount and description
///
/// SHA-256 over `YYYY-MM-DD|cents|description`, with the description trimmed
/// and lowercased. Stored ids are compared across runs, so the digest must
/// never change.
pub fn generate_import_id(date: NaiveDate, amount: Money, description: &str) -> String {
    let key = format!(
        "{}|{}|{}",
        date.format("%Y-%m-%d"),
        amount.cents(),
        description.trim().to_lowercase()
    );
    let digest = Sha256::digest(key.as_bytes());
    let hex: String = digest[..8].iter().map(|b| format!("{:02x}", b)).collect();
    format!("imp-{}", hex)
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.date.format("%Y-%m-%d"),
            self.description,
            self.amount
        )
    }
}

/// Validation errors for transactions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionValidationError {
    ZeroAmount,
    EmptyDescription,
}

impl fmt::Display for TransactionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroAmount => write!(f, "Transaction amount cannot be zero"),
            Self::EmptyDescription => write!(f, "Transaction description cannot be empty"),
        }
    }
}

impl std::error::Error for TransactionValidationError {}
