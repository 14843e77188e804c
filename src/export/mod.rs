//! Data export
//!
//! - CSV: transactions and budgets, for spreadsheets
//! - JSON and YAML: the full data set with schema versioning

pub mod csv;
pub mod json;
pub mod yaml;

pub use self::csv::{export_budgets_csv, export_transactions_csv};
pub use json::{export_full_json, import_from_json, FullExport, EXPORT_SCHEMA_VERSION};
pub use yaml::{export_full_yaml, import_from_yaml};
