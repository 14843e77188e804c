//! Budget overview formatting

use crate::services::BudgetOverview;

use super::{format_bar, render_table};

const BAR_WIDTH: usize = 10;

pub fn format_budget_overview(overview: &BudgetOverview, symbol: &str) -> String {
    let mut output = format!("Budget for {}\n", overview.month.label());

    if overview.lines.is_empty() {
        output.push_str("\nNo budgets set for this month.\n");
        output.push_str("Use 'spendwise budget set <category> <amount>' to add one.\n");
        return output;
    }

    let rows = overview.lines.iter().map(|line| {
        let status = &line.status;
        let flag = if status.is_over_budget() { " OVER" } else { "" };
        let source = if line.explicit { "" } else { " *" };
        vec![
            format!("{}{}", line.category.name, source),
            status.limit.format_with_symbol(symbol),
            status.spent.format_with_symbol(symbol),
            status.remaining.format_with_symbol(symbol),
            format!("{} {:>3}%{}", format_bar(status.progress, BAR_WIDTH), status.percent(), flag),
        ]
    });

    output.push_str(&render_table(
        &["Category", "Limit", "Spent", "Remaining", "Progress"],
        rows,
        &[1, 2, 3],
    ));
    output.push_str(&format!(
        "\nTotal: {} of {} spent, {} remaining\n",
        overview.total_spent.format_with_symbol(symbol),
        overview.total_limit.format_with_symbol(symbol),
        overview.total_remaining.format_with_symbol(symbol),
    ));

    if overview.lines.iter().any(|l| !l.explicit) {
        output.push_str("* default limit of the category\n");
    }

    output
}
