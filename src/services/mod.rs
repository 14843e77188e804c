//! Service layer for Spendwise
//!
//! Business logic on top of the storage layer: validation, categorization,
//! budget computations and statement imports.

pub mod budget;
pub mod categorizer;
pub mod category;
pub mod import;
pub mod period;
pub mod transaction;

pub use budget::{BudgetOverview, BudgetService, CategoryBudgetLine};
pub use categorizer::Categorizer;
pub use category::{CategoryService, CategoryUpdate};
pub use import::{ImportOptions, ImportPreviewEntry, ImportResult, ImportService, ImportStatus};
pub use period::PeriodService;
pub use transaction::{CreateTransactionInput, Totals, TransactionFilter, TransactionService, TransactionUpdate};
