//! CSV export of transactions and budgets

use std::io::Write;

use crate::error::{SpendwiseError, SpendwiseResult};
use crate::models::{category_name, BudgetMonth, BudgetStatus};
use crate::services::BudgetService;
use crate::storage::Storage;

fn export_err(e: csv::Error) -> SpendwiseError {
    SpendwiseError::Export(e.to_string())
}

/// Export all transactions, newest first
///
/// Columns: `Date,Description,Amount,Type,Category`. Returns the number of
/// rows written.
pub fn export_transactions_csv<W: Write>(storage: &Storage, writer: W) -> SpendwiseResult<usize> {
    let categories = storage.categories.get_all_categories()?;
    let transactions = storage.transactions.get_all()?;

    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record(["Date", "Description", "Amount", "Type", "Category"])
        .map_err(export_err)?;

    for txn in &transactions {
        csv_writer
            .write_record([
                txn.date.format("%Y-%m-%d").to_string(),
                txn.description.clone(),
                txn.amount.to_string(),
                txn.kind().to_string(),
                category_name(&categories, txn.category_id),
            ])
            .map_err(export_err)?;
    }

    csv_writer.flush()?;
    Ok(transactions.len())
}

/// Export budgets with their spending
///
/// With a month, every category with a limit in that month is written,
/// including category defaults. Without one, every stored monthly budget.
/// Columns: `Month,Category,Limit,Spent,Remaining`.
pub fn export_budgets_csv<W: Write>(
    storage: &Storage,
    writer: W,
    month: Option<BudgetMonth>,
) -> SpendwiseResult<usize> {
    let categories = storage.categories.get_all_categories()?;
    let service = BudgetService::new(storage);

    let statuses: Vec<BudgetStatus> = match month {
        Some(month) => service
            .overview(month)?
            .lines
            .into_iter()
            .map(|line| line.status)
            .collect(),
        None => storage
            .budgets
            .get_all()?
            .into_iter()
            .map(|b| {
                let spent = service.spent_for_category(b.category_id, Some(b.month))?;
                Ok(BudgetStatus::new(b.category_id, b.month, b.limit, spent))
            })
            .collect::<SpendwiseResult<_>>()?,
    };

    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record(["Month", "Category", "Limit", "Spent", "Remaining"])
        .map_err(export_err)?;

    for status in &statuses {
        csv_writer
            .write_record([
                status.month.to_string(),
                category_name(&categories, status.category_id),
                status.limit.to_string(),
                status.spent.to_string(),
                status.remaining.to_string(),
            ])
            .map_err(export_err)?;
    }

    csv_writer.flush()?;
    Ok(statuses.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::SpendwisePaths;
    use crate::models::{Budget, Category, CategoryId, Money, Transaction, TransactionSource};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = SpendwisePaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths).unwrap();
        (temp_dir, storage)
    }

    fn add(storage: &Storage, date: (i32, u32, u32), cents: i64, description: &str, category: CategoryId) {
        let date = NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap();
        storage
            .transactions
            .upsert(Transaction::with_details(
                date,
                Money::from_cents(cents),
                description,
                category,
                TransactionSource::Manual,
            ))
            .unwrap();
    }

    #[test]
    fn test_export_transactions() {
        let (_temp_dir, storage) = create_test_storage();
        let food = Category::new("Food");
        storage.categories.upsert(food.clone()).unwrap();

        add(&storage, (2025, 1, 5), -1250, "Coop, Bern", food.id);
        add(&storage, (2025, 1, 9), 300000, "Salary", CategoryId::new());

        let mut out = Vec::new();
        let count = export_transactions_csv(&storage, &mut out).unwrap();
        assert_eq!(count, 2);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "Date,Description,Amount,Type,Category");
        assert_eq!(lines[1], "2025-01-09,Salary,3000.00,Income,Unknown");
        assert_eq!(lines[2], "2025-01-05,\"Coop, Bern\",-12.50,Expense,Food");
    }

    #[test]
    fn test_export_budgets_for_month() {
        let (_temp_dir, storage) = create_test_storage();
        let mut food = Category::new("Food");
        food.set_budget_limit(Money::from_cents(20000));
        let fun = Category::new("Fun");
        storage.categories.upsert(food.clone()).unwrap();
        storage.categories.upsert(fun.clone()).unwrap();

        let month = BudgetMonth::new(2025, 1).unwrap();
        storage
            .budgets
            .upsert(Budget::new(fun.id, month, Money::from_cents(5000)))
            .unwrap();
        add(&storage, (2025, 1, 5), -7000, "Cinema", fun.id);

        let mut out = Vec::new();
        assert_eq!(export_budgets_csv(&storage, &mut out, Some(month)).unwrap(), 2);

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Month,Category,Limit,Spent,Remaining\n"));
        assert!(text.contains("2025-01,Food,200.00,0.00,200.00"));
        assert!(text.contains("2025-01,Fun,50.00,70.00,-20.00"));
    }

    #[test]
    fn test_export_all_stored_budgets() {
        let (_temp_dir, storage) = create_test_storage();
        let fun = Category::new("Fun");
        storage.categories.upsert(fun.clone()).unwrap();
        for m in [1, 2] {
            storage
                .budgets
                .upsert(Budget::new(fun.id, BudgetMonth::new(2025, m).unwrap(), Money::from_cents(1000)))
                .unwrap();
        }

        let mut out = Vec::new();
        assert_eq!(export_budgets_csv(&storage, &mut out, None).unwrap(), 2);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("2025-02,Fun,10.00,0.00,10.00"));
    }
}
