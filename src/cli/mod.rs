//! CLI command handlers
//!
//! Each submodule defines a clap `Subcommand` enum and a handler that turns
//! the parsed arguments into service calls and prints the result.

pub mod backup;
pub mod budget;
pub mod category;
pub mod export;
pub mod import;
pub mod summary;
pub mod transaction;

use chrono::{Local, NaiveDate};

use crate::error::{SpendwiseError, SpendwiseResult};
use crate::models::Money;

pub use backup::{handle_backup_command, BackupCommands};
pub use budget::{handle_budget_command, BudgetCommands};
pub use category::{handle_category_command, CategoryCommands};
pub use export::{handle_export_command, ExportCommands, ExportFormat};
pub use import::{handle_import_command, ImportCommands};
pub use summary::handle_summary_command;
pub use transaction::{handle_transaction_command, TransactionCommands};

/// Parse a user-supplied amount such as `12.50`, `-12,50` or `CHF 40`
pub(crate) fn parse_amount(input: &str) -> SpendwiseResult<Money> {
    Money::parse(input)
        .map_err(|e| SpendwiseError::Validation(format!("Invalid amount: {}", e)))
}

/// Parse a date in the configured format, falling back to ISO `YYYY-MM-DD`
///
/// `today` and `yesterday` are accepted as well.
pub(crate) fn parse_date(input: &str, preferred_format: &str) -> SpendwiseResult<NaiveDate> {
    let input = input.trim();
    let today = Local::now().date_naive();

    match input.to_lowercase().as_str() {
        "today" => return Ok(today),
        "yesterday" => return Ok(today.pred_opt().unwrap_or(today)),
        _ => {}
    }

    NaiveDate::parse_from_str(input, preferred_format)
        .or_else(|_| NaiveDate::parse_from_str(input, "%Y-%m-%d"))
        .map_err(|_| {
            SpendwiseError::Validation(format!(
                "Invalid date '{}'. Use YYYY-MM-DD or {}",
                input, preferred_format
            ))
        })
}
