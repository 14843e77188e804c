//! Reports for Spendwise
//!
//! Spending analysis by category and the monthly dashboard summary.

pub mod spending;
pub mod summary;

pub use spending::{SpendingByCategory, SpendingReport};
pub use summary::MonthlySummary;
