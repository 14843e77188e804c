//! Spending report
//!
//! Expenses broken down by category for a date range.

use std::collections::HashMap;
use std::io::Write;

use chrono::NaiveDate;

use crate::error::{SpendwiseError, SpendwiseResult};
use crate::models::{category_name, BudgetMonth, CategoryId, Money};
use crate::storage::Storage;

/// Spending in one category
#[derive(Debug, Clone)]
pub struct SpendingByCategory {
    pub category_id: CategoryId,
    pub category_name: String,
    /// Absolute amount spent
    pub spent: Money,
    pub transaction_count: usize,
    /// Share of total spending, 0 to 100
    pub percentage: f64,
}

#[derive(Debug, Clone)]
pub struct SpendingReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Categories with spending, largest first
    pub categories: Vec<SpendingByCategory>,
    pub total_spent: Money,
    pub total_income: Money,
    pub total_transactions: usize,
}

impl SpendingReport {
    pub fn generate(storage: &Storage, start_date: NaiveDate, end_date: NaiveDate) -> SpendwiseResult<Self> {
        let categories = storage.categories.get_all_categories()?;
        let transactions = storage.transactions.get_by_date_range(start_date, end_date)?;

        let mut by_category: HashMap<CategoryId, (Money, usize)> = HashMap::new();
        let mut total_spent = Money::zero();
        let mut total_income = Money::zero();

        for txn in &transactions {
            if txn.is_expense() {
                let entry = by_category.entry(txn.category_id).or_insert((Money::zero(), 0));
                entry.0 += txn.amount.abs();
                entry.1 += 1;
                total_spent += txn.amount.abs();
            } else {
                total_income += txn.amount;
            }
        }

        let mut rows: Vec<SpendingByCategory> = by_category
            .into_iter()
            .map(|(category_id, (spent, transaction_count))| SpendingByCategory {
                category_id,
                category_name: category_name(&categories, category_id),
                spent,
                transaction_count,
                percentage: spent.ratio_of(total_spent) * 100.0,
            })
            .collect();
        rows.sort_by(|a, b| {
            b.spent
                .cmp(&a.spent)
                .then_with(|| a.category_name.cmp(&b.category_name))
        });

        Ok(Self {
            start_date,
            end_date,
            categories: rows,
            total_spent,
            total_income,
            total_transactions: transactions.len(),
        })
    }

    pub fn for_month(storage: &Storage, month: BudgetMonth) -> SpendwiseResult<Self> {
        Self::generate(storage, month.start_date(), month.end_date())
    }

    /// The `limit` categories with the most spending
    pub fn top_categories(&self, limit: usize) -> &[SpendingByCategory] {
        &self.categories[..limit.min(self.categories.len())]
    }

    /// Write the report as CSV
    pub fn export_csv<W: Write>(&self, writer: W) -> SpendwiseResult<()> {
        let export_err = |e: csv::Error| SpendwiseError::Export(e.to_string());
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer
            .write_record(["Start Date", "End Date", "Category", "Spent", "Transactions", "Percentage"])
            .map_err(export_err)?;

        let start = self.start_date.to_string();
        let end = self.end_date.to_string();
        for row in &self.categories {
            csv_writer
                .write_record([
                    start.clone(),
                    end.clone(),
                    row.category_name.clone(),
                    row.spent.to_string(),
                    row.transaction_count.to_string(),
                    format!("{:.2}", row.percentage),
                ])
                .map_err(export_err)?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}
