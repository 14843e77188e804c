//! Category display formatting

use crate::models::Category;

use super::{render_table, truncate};

/// Format categories as a table
///
/// `counts` holds the number of transactions for each category, in the same
/// order as `categories`.
pub fn format_category_table(categories: &[Category], counts: &[usize], symbol: &str) -> String {
    if categories.is_empty() {
        return "No categories found.\n\nRun 'spendwise init' to create the default categories.\n"
            .to_string();
    }

    let rows = categories.iter().zip(counts.iter().chain(std::iter::repeat(&0))).map(|(c, count)| {
        vec![
            c.id.short(),
            c.name.clone(),
            c.budget_limit
                .map(|limit| limit.format_with_symbol(symbol))
                .unwrap_or_else(|| "-".to_string()),
            count.to_string(),
            truncate(&c.keywords.join(", "), 40),
        ]
    });

    render_table(&["ID", "Name", "Default Limit", "Txns", "Keywords"], rows, &[2, 3])
}

pub fn format_category_details(category: &Category, transaction_count: usize, symbol: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("Category: {}\n", category.name));
    output.push_str(&format!("  ID:            {}\n", category.id));
    output.push_str(&format!(
        "  Default limit: {}\n",
        category
            .budget_limit
            .map(|l| l.format_with_symbol(symbol))
            .unwrap_or_else(|| "none".to_string())
    ));
    output.push_str(&format!("  Transactions:  {}\n", transaction_count));
    output.push_str(&format!("  Sort order:    {}\n", category.sort_order));

    if category.keywords.is_empty() {
        output.push_str("  Keywords:      (none)\n");
    } else {
        output.push_str("  Keywords:\n");
        for keyword in &category.keywords {
            output.push_str(&format!("    - {}\n", keyword));
        }
    }

    output
}
