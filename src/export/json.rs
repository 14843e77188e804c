//! Full JSON export with schema versioning

use std::collections::HashSet;
use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{SpendwiseError, SpendwiseResult};
use crate::models::{Budget, Category, Transaction};
use crate::storage::Storage;

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Everything Spendwise stores, in one document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullExport {
    pub schema_version: String,
    pub exported_at: DateTime<Utc>,
    pub app_version: String,
    pub categories: Vec<Category>,
    pub transactions: Vec<Transaction>,
    pub budgets: Vec<Budget>,
    pub metadata: ExportMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub transaction_count: usize,
    pub category_count: usize,
    pub budget_count: usize,
    pub earliest_transaction: Option<String>,
    pub latest_transaction: Option<String>,
}

impl FullExport {
    pub fn from_storage(storage: &Storage) -> SpendwiseResult<Self> {
        let categories = storage.categories.get_all_categories()?;
        let transactions = storage.transactions.get_all()?;
        let budgets = storage.budgets.get_all()?;

        let metadata = ExportMetadata {
            transaction_count: transactions.len(),
            category_count: categories.len(),
            budget_count: budgets.len(),
            earliest_transaction: transactions.iter().map(|t| t.date).min().map(|d| d.to_string()),
            latest_transaction: transactions.iter().map(|t| t.date).max().map(|d| d.to_string()),
        };

        Ok(Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            categories,
            transactions,
            budgets,
            metadata,
        })
    }

    /// Check the schema version and that every reference resolves
    pub fn validate(&self) -> Result<(), String> {
        if self.schema_version != EXPORT_SCHEMA_VERSION {
            return Err(format!(
                "Schema version mismatch: expected {}, got {}",
                EXPORT_SCHEMA_VERSION, self.schema_version
            ));
        }

        let category_ids: HashSet<_> = self.categories.iter().map(|c| c.id).collect();

        if let Some(txn) = self
            .transactions
            .iter()
            .find(|t| !category_ids.contains(&t.category_id))
        {
            return Err(format!(
                "Transaction {} references unknown category {}",
                txn.id, txn.category_id
            ));
        }

        if let Some(budget) = self
            .budgets
            .iter()
            .find(|b| !category_ids.contains(&b.category_id))
        {
            return Err(format!(
                "Budget for {} references unknown category {}",
                budget.month, budget.category_id
            ));
        }

        Ok(())
    }
}

/// Export everything as JSON
pub fn export_full_json<W: Write>(storage: &Storage, writer: W, pretty: bool) -> SpendwiseResult<()> {
    let export = FullExport::from_storage(storage)?;

    if pretty {
        serde_json::to_writer_pretty(writer, &export)
    } else {
        serde_json::to_writer(writer, &export)
    }
    .map_err(|e| SpendwiseError::Export(e.to_string()))
}

/// Parse and validate a JSON export
pub fn import_from_json(json: &str) -> SpendwiseResult<FullExport> {
    let export: FullExport =
        serde_json::from_str(json).map_err(|e| SpendwiseError::Import(e.to_string()))?;
    export.validate().map_err(SpendwiseError::Import)?;
    Ok(export)
}
