//! Transaction display formatting

use crate::models::{category_name, Category, Transaction};

use super::{render_table, truncate};

const DESCRIPTION_WIDTH: usize = 36;

/// Format transactions as a table, newest first as given
pub fn format_transaction_table(transactions: &[Transaction], categories: &[Category], symbol: &str) -> String {
    if transactions.is_empty() {
        return "No transactions found.\n".to_string();
    }

    let rows = transactions.iter().map(|txn| {
        vec![
            txn.id.short(),
            txn.date.format("%Y-%m-%d").to_string(),
            truncate(&txn.description, DESCRIPTION_WIDTH),
            txn.amount.format_with_symbol(symbol),
            category_name(categories, txn.category_id),
            txn.source.to_string(),
        ]
    });

    let mut output = render_table(
        &["ID", "Date", "Description", "Amount", "Category", "Source"],
        rows,
        &[3],
    );
    output.push_str(&format!("\n{} transaction(s)\n", transactions.len()));
    output
}

/// Format one transaction's details
pub fn format_transaction_details(txn: &Transaction, category: &str, symbol: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("Transaction: {}\n", txn.id));
    output.push_str(&format!("Date:        {}\n", txn.date.format("%Y-%m-%d")));
    output.push_str(&format!("Description: {}\n", txn.description));
    output.push_str(&format!("Amount:      {}\n", txn.amount.format_with_symbol(symbol)));
    output.push_str(&format!("Type:        {}\n", txn.kind()));
    output.push_str(&format!("Category:    {}\n", category));
    output.push_str(&format!("Source:      {}\n", txn.source));
    if let Some(import_id) = &txn.import_id {
        output.push_str(&format!("Import ID:   {}\n", import_id));
    }
    output.push_str(&format!(
        "Created:     {}\n",
        txn.created_at.format("%Y-%m-%d %H:%M")
    ));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Money, TransactionSource};
    use chrono::NaiveDate;

    #[test]
    fn test_table_lists_transactions() {
        let food = Category::new("Food");
        let txn = Transaction::with_details(
            NaiveDate::from_ymd_opt(2025, 5, 2).unwrap(),
            Money::from_cents(-1990),
            "Migros",
            food.id,
            TransactionSource::Raiffeisen,
        );

        let out = format_transaction_table(&[txn], &[food], "CHF");
        assert!(out.contains("2025-05-02"));
        assert!(out.contains("Migros"));
        assert!(out.contains("CHF -19.90"));
        assert!(out.contains("Food"));
        assert!(out.contains("1 transaction(s)"));
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(format_transaction_table(&[], &[], "CHF"), "No transactions found.\n");
    }

    #[test]
    fn test_details() {
        let mut txn = Transaction::with_details(
            NaiveDate::from_ymd_opt(2025, 5, 2).unwrap(),
            Money::from_cents(5000),
            "Refund",
            Category::new("Misc").id,
            TransactionSource::OpenBanking,
        );
        txn.import_id = Some("nextgen-7".into());

        let out = format_transaction_details(&txn, "Misc", "CHF");
        assert!(out.contains("Type:        Income"));
        assert!(out.contains("Source:      Open Banking"));
        assert!(out.contains("Import ID:   nextgen-7"));
    }
}
