//! Display formatting for terminal output
//!
//! Tables are built with `tabled`; everything returns a `String` so the CLI
//! decides where it goes.

pub mod budget;
pub mod category;
pub mod import;
pub mod report;
pub mod transaction;

use tabled::builder::Builder;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Style};

pub use budget::format_budget_overview;
pub use category::{format_category_details, format_category_table};
pub use import::{format_import_preview, format_import_result};
pub use report::{format_monthly_summary, format_spending_report};
pub use transaction::{format_transaction_details, format_transaction_table};

/// Render rows as a table with the given columns right-aligned
pub(crate) fn render_table<I>(header: &[&str], rows: I, right_aligned: &[usize]) -> String
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut builder = Builder::default();
    builder.push_record(header.iter().map(|h| h.to_string()));
    for row in rows {
        builder.push_record(row);
    }

    let mut table = builder.build();
    table.with(Style::sharp());
    for &col in right_aligned {
        table.modify(Columns::single(col), Alignment::right());
    }
    table.to_string()
}

/// Format a percentage with appropriate precision
pub fn format_percentage(pct: f64) -> String {
    if pct > 0.0 && pct < 0.1 {
        format!("{:.2}%", pct)
    } else if pct < 10.0 {
        format!("{:.1}%", pct)
    } else {
        format!("{:.0}%", pct)
    }
}

/// A fixed-width progress bar for a 0..=1 fraction
pub fn format_bar(fraction: f64, width: usize) -> String {
    let filled = ((fraction.clamp(0.0, 1.0)) * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled.min(width)))
}

/// Truncate to `max_chars` characters with an ellipsis
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else if max_chars <= 3 {
        ".".repeat(max_chars)
    } else {
        let kept: String = s.chars().take(max_chars - 3).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(0.05), "0.05%");
        assert_eq!(format_percentage(5.26), "5.3%");
        assert_eq!(format_percentage(42.4), "42%");
    }

    #[test]
    fn test_format_bar() {
        assert_eq!(format_bar(0.5, 4), "██░░");
        assert_eq!(format_bar(1.7, 3), "███");
        assert_eq!(format_bar(-1.0, 2), "░░");
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate("Zürich Hauptbahnhof", 9), "Zürich...");
        assert_eq!(truncate("short", 10), "short");
    }

    #[test]
    fn test_render_table_contains_cells() {
        let out = render_table(&["Name", "Amount"], vec![vec!["Coop".into(), "-1.00".into()]], &[1]);
        assert!(out.contains("Name"));
        assert!(out.contains("Coop"));
        assert!(out.contains("-1.00"));
    }
}
