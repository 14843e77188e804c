//! Import preview and result formatting

use crate::models::{category_name, Category};
use crate::services::{ImportPreviewEntry, ImportResult, ImportStatus};

use super::{render_table, truncate};

pub fn format_import_preview(preview: &[ImportPreviewEntry], categories: &[Category], symbol: &str) -> String {
    if preview.is_empty() {
        return "No transactions found in the statement.\n".to_string();
    }

    let rows = preview.iter().map(|entry| {
        let status = match &entry.status {
            ImportStatus::New => "new".to_string(),
            ImportStatus::Duplicate => "duplicate".to_string(),
            ImportStatus::Error(message) => format!("error: {}", truncate(message, 40)),
        };
        let category = entry
            .category_id
            .map(|id| category_name(categories, id))
            .unwrap_or_default();

        match &entry.transaction {
            Some(txn) => vec![
                entry.row_number.to_string(),
                txn.date.format("%Y-%m-%d").to_string(),
                truncate(&txn.description, 32),
                txn.amount.format_with_symbol(symbol),
                category,
                status,
            ],
            None => vec![
                entry.row_number.to_string(),
                String::new(),
                String::new(),
                String::new(),
                category,
                status,
            ],
        }
    });

    let new = preview.iter().filter(|e| e.status == ImportStatus::New).count();
    let duplicates = preview
        .iter()
        .filter(|e| e.status == ImportStatus::Duplicate)
        .count();
    let errors = preview.len() - new - duplicates;

    let mut output = render_table(
        &["Row", "Date", "Description", "Amount", "Category", "Status"],
        rows,
        &[0, 3],
    );
    output.push_str(&format!(
        "\n{} new, {} duplicate(s), {} error(s)\n",
        new, duplicates, errors
    ));
    output
}

pub fn format_import_result(result: &ImportResult) -> String {
    let mut output = format!("Imported {} transaction(s)\n", result.imported);

    if result.duplicates_skipped > 0 {
        output.push_str(&format!("Skipped {} duplicate(s)\n", result.duplicates_skipped));
    }

    if !result.by_category.is_empty() {
        output.push_str("\nBy category:\n");
        for (name, count) in &result.by_category {
            output.push_str(&format!("  {:<24} {:>4}\n", name, count));
        }
    }

    if result.errors > 0 {
        output.push_str(&format!("\n{} row(s) could not be imported:\n", result.errors));
        for (row, message) in &result.error_messages {
            output.push_str(&format!("  row {}: {}\n", row, message));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::ParsedTransaction;
    use crate::models::{Money, TransactionSource};
    use chrono::NaiveDate;

    #[test]
    fn test_preview_counts() {
        let food = Category::new("Food");
        let parsed = ParsedTransaction::new(
            2,
            NaiveDate::from_ymd_opt(2025, 1, 3).unwrap(),
            "Coop",
            Money::from_cents(-500),
            TransactionSource::Revolut,
        );
        let preview = vec![
            ImportPreviewEntry {
                row_number: 2,
                transaction: Some(parsed.clone()),
                category_id: Some(food.id),
                status: ImportStatus::New,
                existing_id: None,
            },
            ImportPreviewEntry {
                row_number: 3,
                transaction: Some(parsed),
                category_id: Some(food.id),
                status: ImportStatus::Duplicate,
                existing_id: None,
            },
            ImportPreviewEntry {
                row_number: 4,
                transaction: None,
                category_id: None,
                status: ImportStatus::Error("Could not parse date: 'x'".into()),
                existing_id: None,
            },
        ];

        let out = format_import_preview(&preview, &[food], "CHF");
        assert!(out.contains("Coop"));
        assert!(out.contains("duplicate"));
        assert!(out.contains("error: Could not parse date"));
        assert!(out.contains("1 new, 1 duplicate(s), 1 error(s)"));
    }

    #[test]
    fn test_result_lists_errors() {
        let mut result = ImportResult {
            imported: 2,
            duplicates_skipped: 1,
            errors: 1,
            ..ImportResult::default()
        };
        result.by_category.insert("Groceries".into(), 2);
        result.error_messages.insert(7, "bad amount".into());

        let out = format_import_result(&result);
        assert!(out.contains("Imported 2 transaction(s)"));
        assert!(out.contains("Skipped 1 duplicate(s)"));
        assert!(out.contains("Groceries"));
        assert!(out.contains("row 7: bad amount"));
    }
}
