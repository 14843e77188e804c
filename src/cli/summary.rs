//! Monthly summary command

use crate::config::settings::Settings;
use crate::display::{format_monthly_summary, format_spending_report};
use crate::error::SpendwiseResult;
use crate::reports::{MonthlySummary, SpendingReport};
use crate::services::PeriodService;
use crate::storage::Storage;

/// Print income, expenses and top categories for a month
///
/// With `detailed`, every category with spending is listed as well.
pub fn handle_summary_command(
    storage: &Storage,
    settings: &Settings,
    month: Option<&str>,
    top: usize,
    detailed: bool,
) -> SpendwiseResult<()> {
    let month = PeriodService::new().parse_or_current(month)?;
    let symbol = settings.currency_symbol.as_str();

    let summary = MonthlySummary::generate(storage, month, top)?;
    print!("{}", format_monthly_summary(&summary, symbol));

    if detailed && !summary.is_empty() {
        println!();
        let report = SpendingReport::for_month(storage, month)?;
        print!("{}", format_spending_report(&report, symbol));
    }

    Ok(())
}
