//! Report formatting

use crate::reports::{MonthlySummary, SpendingReport};

use super::{format_bar, format_percentage, render_table};

pub fn format_monthly_summary(summary: &MonthlySummary, symbol: &str) -> String {
    let mut output = format!("Summary for {}\n\n", summary.month.label());

    output.push_str(&format!("  Income:   {:>14}\n", summary.income.format_with_symbol(symbol)));
    output.push_str(&format!("  Expenses: {:>14}\n", summary.expenses.format_with_symbol(symbol)));
    output.push_str(&format!("  Net:      {:>14}\n", summary.net.format_with_symbol(symbol)));
    output.push_str(&format!("  Transactions: {}\n", summary.transaction_count));

    if summary.is_empty() {
        output.push_str("\nNo transactions this month.\n");
        return output;
    }

    if !summary.top_categories.is_empty() {
        output.push_str("\nTop spending:\n");
        let max = summary.top_categories[0].spent;
        for row in &summary.top_categories {
            output.push_str(&format!(
                "  {:<20} {:>14}  {} {}\n",
                row.category_name,
                row.spent.format_with_symbol(symbol),
                format_bar(row.spent.ratio_of(max), 12),
                format_percentage(row.percentage),
            ));
        }
    }

    if !summary.over_budget.is_empty() {
        output.push_str("\nOver budget:\n");
        for line in &summary.over_budget {
            output.push_str(&format!(
                "  {:<20} {} over\n",
                line.category.name,
                (-line.status.remaining).format_with_symbol(symbol)
            ));
        }
    }

    output
}

pub fn format_spending_report(report: &SpendingReport, symbol: &str) -> String {
    let mut output = format!(
        "Spending from {} to {}\n\n",
        report.start_date, report.end_date
    );

    if report.categories.is_empty() {
        output.push_str("No spending in this period.\n");
        return output;
    }

    let rows = report.categories.iter().map(|row| {
        vec![
            row.category_name.clone(),
            row.spent.format_with_symbol(symbol),
            row.transaction_count.to_string(),
            format_percentage(row.percentage),
        ]
    });
    output.push_str(&render_table(&["Category", "Spent", "Txns", "Share"], rows, &[1, 2, 3]));
    output.push_str(&format!(
        "\nTotal spent: {}   Income: {}\n",
        report.total_spent.format_with_symbol(symbol),
        report.total_income.format_with_symbol(symbol)
    ));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BudgetMonth, CategoryId, Money};
    use crate::reports::SpendingByCategory;

    fn summary(top: Vec<SpendingByCategory>, count: usize) -> MonthlySummary {
        MonthlySummary {
            month: BudgetMonth::new(2025, 2).unwrap(),
            income: Money::from_cents(500000),
            expenses: Money::from_cents(12000),
            net: Money::from_cents(488000),
            transaction_count: count,
            top_categories: top,
            over_budget: Vec::new(),
        }
    }

    #[test]
    fn test_summary_with_top_categories() {
        let top = vec![SpendingByCategory {
            category_id: CategoryId::new(),
            category_name: "Groceries".into(),
            spent: Money::from_cents(12000),
            transaction_count: 4,
            percentage: 100.0,
        }];
        let out = format_monthly_summary(&summary(top, 5), "CHF");
        assert!(out.contains("Summary for February 2025"));
        assert!(out.contains("CHF 4880.00"));
        assert!(out.contains("Groceries"));
        assert!(out.contains("100%"));
    }

    #[test]
    fn test_empty_summary() {
        let out = format_monthly_summary(&summary(Vec::new(), 0), "CHF");
        assert!(out.contains("No transactions this month."));
    }
}
