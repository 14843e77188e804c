//! Restoring data files from a backup archive

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use tracing::info;

use crate::config::paths::SpendwisePaths;
use crate::error::{SpendwiseError, SpendwiseResult};
use crate::storage::file_io::write_json_atomic;
use crate::storage::{BudgetData, CategoryData, TransactionData};

use super::manager::{BackupArchive, BACKUP_SCHEMA_VERSION};

pub struct RestoreManager {
    paths: SpendwisePaths,
}

fn read_archive(path: &Path) -> SpendwiseResult<BackupArchive> {
    let contents = fs::read_to_string(path)
        .map_err(|e| SpendwiseError::Io(format!("Failed to read backup file: {}", e)))?;
    serde_json::from_str(&contents)
        .map_err(|e| SpendwiseError::Json(format!("Failed to parse backup file: {}", e)))
}

/// Decode one archive section into the layout of its data file
fn decode_section<T: DeserializeOwned>(value: &serde_json::Value, name: &str) -> SpendwiseResult<T> {
    if !value.is_object() {
        return Err(SpendwiseError::Validation(format!(
            "Backup section '{}' is missing or not an object",
            name
        )));
    }
    serde_json::from_value(value.clone()).map_err(|e| {
        SpendwiseError::Validation(format!("Backup section '{}' is malformed: {}", name, e))
    })
}

/// The three data files of an archive, all decoded
struct DecodedArchive {
    transactions: TransactionData,
    categories: CategoryData,
    budgets: BudgetData,
}

impl DecodedArchive {
    fn decode(archive: &BackupArchive) -> SpendwiseResult<Self> {
        Ok(Self {
            transactions: decode_section(&archive.transactions, "transactions")?,
            categories: decode_section(&archive.categories, "categories")?,
            budgets: decode_section(&archive.budgets, "budgets")?,
        })
    }
}

impl RestoreManager {
    pub fn new(paths: SpendwisePaths) -> Self {
        Self { paths }
    }

    /// Replace the current data files with the contents of a backup file
    ///
    /// Callers are expected to take a fresh backup first; nothing here keeps
    /// the overwritten data.
    pub fn restore_from_file(&self, backup_path: &Path) -> SpendwiseResult<RestoreResult> {
        let archive = read_archive(backup_path)?;
        let result = self.restore_from_archive(&archive)?;
        info!(path = %backup_path.display(), "{}", result.summary());
        Ok(result)
    }

    /// Restore all three data files, or none of them
    ///
    /// Every section is decoded before the first file is written, so a bad
    /// archive leaves the data directory untouched.
    pub fn restore_from_archive(&self, archive: &BackupArchive) -> SpendwiseResult<RestoreResult> {
        if archive.schema_version > BACKUP_SCHEMA_VERSION {
            return Err(SpendwiseError::Validation(format!(
                "Backup schema version {} is newer than supported version {}",
                archive.schema_version, BACKUP_SCHEMA_VERSION
            )));
        }

        let decoded = DecodedArchive::decode(archive)?;

        self.paths.ensure_directories()?;
        write_json_atomic(self.paths.transactions_file(), &decoded.transactions)?;
        write_json_atomic(self.paths.categories_file(), &decoded.categories)?;
        write_json_atomic(self.paths.budgets_file(), &decoded.budgets)?;

        Ok(RestoreResult {
            schema_version: archive.schema_version,
            backup_date: archive.created_at,
            transactions: decoded.transactions.transactions.len(),
            categories: decoded.categories.categories.len(),
            budgets: decoded.budgets.budgets.len(),
        })
    }

    /// Inspect a backup file without touching the data directory
    pub fn validate_backup(&self, backup_path: &Path) -> SpendwiseResult<ValidationResult> {
        let archive = read_archive(backup_path)?;

        let problem = if archive.schema_version > BACKUP_SCHEMA_VERSION {
            Some(format!(
                "schema version {} is not supported by this version of spendwise",
                archive.schema_version
            ))
        } else {
            DecodedArchive::decode(&archive).err().map(|e| e.to_string())
        };

        Ok(ValidationResult {
            schema_version: archive.schema_version,
            backup_date: archive.created_at,
            problem,
        })
    }
}

#[derive(Debug)]
pub struct RestoreResult {
    pub schema_version: u32,
    pub backup_date: DateTime<Utc>,
    pub transactions: usize,
    pub categories: usize,
    pub budgets: usize,
}

impl RestoreResult {
    pub fn summary(&self) -> String {
        format!(
            "Restored {} transaction(s), {} category(ies), {} budget(s)",
            self.transactions, self.categories, self.budgets
        )
    }
}

/// What a backup file contains
#[derive(Debug)]
pub struct ValidationResult {
    pub schema_version: u32,
    pub backup_date: DateTime<Utc>,
    /// Why the backup cannot be restored
    pub problem: Option<String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.problem.is_none()
    }

    pub fn summary(&self) -> String {
        match &self.problem {
            None => format!("Valid backup (v{})", self.schema_version),
            Some(problem) => format!("Invalid backup (v{}): {}", self.schema_version, problem),
        }
    }
}
