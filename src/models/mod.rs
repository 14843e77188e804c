//! Core data models for Spendwise
//!
//! Transactions, categories and monthly budgets, plus the value types they
//! are built from.

pub mod budget;
pub mod category;
pub mod ids;
pub mod money;
pub mod period;
pub mod transaction;

pub use budget::{Budget, BudgetStatus};
pub use category::{category_name, Category, DefaultCategory, DEFAULT_CATEGORY_NAME};
pub use ids::{CategoryId, TransactionId};
pub use money::Money;
pub use period::BudgetMonth;
pub use transaction::{Transaction, TransactionSource, TransactionType};
