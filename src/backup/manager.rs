//! Backup creation and retention
//!
//! Backups are JSON archives named `backup-YYYYMMDD-HHMMSS-mmm.json` in the
//! backup directory. The oldest backup of each calendar month counts as that
//! month's monthly backup and is kept under the monthly quota.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::paths::SpendwisePaths;
use crate::config::settings::BackupRetention;
use crate::error::{SpendwiseError, SpendwiseResult};
use crate::storage::file_io::write_json_atomic;
use crate::storage::{BudgetData, CategoryData, TransactionData};

/// Archive format version
pub const BACKUP_SCHEMA_VERSION: u32 = 1;

const FILE_PREFIX: &str = "backup-";
const FILE_SUFFIX: &str = ".json";
const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S-%3f";
const LEGACY_TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// A backup file found on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupInfo {
    pub filename: String,
    pub path: PathBuf,
    pub created_at: DateTime<Utc>,
    pub size_bytes: u64,
    /// Oldest backup of its month
    pub is_monthly: bool,
}

/// Contents of a backup file
///
/// Each data file is stored as raw JSON so archives survive model changes.
#[derive(Debug, Serialize, Deserialize)]
pub struct BackupArchive {
    pub schema_version: u32,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub app_version: String,
    pub transactions: serde_json::Value,
    pub categories: serde_json::Value,
    pub budgets: serde_json::Value,
}

pub struct BackupManager {
    backup_dir: PathBuf,
    paths: SpendwisePaths,
    retention: BackupRetention,
}

impl BackupManager {
    pub fn new(paths: SpendwisePaths, retention: BackupRetention) -> Self {
        Self {
            backup_dir: paths.backup_dir(),
            paths,
            retention,
        }
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Write a timestamped backup into the backup directory
    pub fn create_backup(&self) -> SpendwiseResult<PathBuf> {
        fs::create_dir_all(&self.backup_dir).map_err(|e| {
            SpendwiseError::Io(format!("Failed to create backup directory: {}", e))
        })?;

        // Bump the timestamp until the name is free
        let mut timestamp = Utc::now();
        let mut path = self.backup_dir.join(backup_filename(timestamp));
        while path.exists() {
            timestamp += Duration::milliseconds(1);
            path = self.backup_dir.join(backup_filename(timestamp));
        }

        self.write_archive(&path, timestamp)?;
        info!(path = %path.display(), "created backup");
        Ok(path)
    }

    /// Write a backup to an explicit path
    pub fn create_backup_to(&self, path: &Path) -> SpendwiseResult<PathBuf> {
        self.write_archive(path, Utc::now())?;
        info!(path = %path.display(), "created backup");
        Ok(path.to_path_buf())
    }

    fn write_archive(&self, path: &Path, timestamp: DateTime<Utc>) -> SpendwiseResult<()> {
        let archive = BackupArchive {
            schema_version: BACKUP_SCHEMA_VERSION,
            created_at: timestamp,
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            transactions: read_json_value::<TransactionData>(&self.paths.transactions_file())?,
            categories: read_json_value::<CategoryData>(&self.paths.categories_file())?,
            budgets: read_json_value::<BudgetData>(&self.paths.budgets_file())?,
        };
        write_json_atomic(path, &archive)
    }

    /// All backups in the backup directory, newest first
    pub fn list_backups(&self) -> SpendwiseResult<Vec<BackupInfo>> {
        if !self.backup_dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.backup_dir).map_err(|e| {
            SpendwiseError::Io(format!("Failed to read backup directory: {}", e))
        })?;

        let mut backups = Vec::new();
        for entry in entries {
            let entry = entry
                .map_err(|e| SpendwiseError::Io(format!("Failed to read directory entry: {}", e)))?;
            if let Some(info) = parse_backup_info(&entry.path()) {
                backups.push(info);
            }
        }

        backups.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        mark_monthly(&mut backups);
        Ok(backups)
    }

    pub fn get_latest_backup(&self) -> SpendwiseResult<Option<BackupInfo>> {
        Ok(self.list_backups()?.into_iter().next())
    }

    /// Look up a backup by file name
    pub fn get_backup(&self, filename: &str) -> SpendwiseResult<Option<BackupInfo>> {
        Ok(self
            .list_backups()?
            .into_iter()
            .find(|b| b.filename == filename))
    }

    /// Delete backups outside the retention policy
    ///
    /// The newest `daily_count` backups are kept, plus the monthly backups of
    /// the newest `monthly_count` months. Returns the deleted paths.
    pub fn enforce_retention(&self) -> SpendwiseResult<Vec<PathBuf>> {
        let backups = self.list_backups()?;

        let mut keep: HashSet<PathBuf> = backups
            .iter()
            .take(self.retention.daily_count as usize)
            .map(|b| b.path.clone())
            .collect();
        keep.extend(
            backups
                .iter()
                .filter(|b| b.is_monthly)
                .take(self.retention.monthly_count as usize)
                .map(|b| b.path.clone()),
        );

        let mut deleted = Vec::new();
        for backup in backups.into_iter().filter(|b| !keep.contains(&b.path)) {
            fs::remove_file(&backup.path)
                .map_err(|e| SpendwiseError::Io(format!("Failed to delete old backup: {}", e)))?;
            debug!(path = %backup.path.display(), "deleted old backup");
            deleted.push(backup.path);
        }

        if !deleted.is_empty() {
            info!(deleted = deleted.len(), "pruned backups");
        }
        Ok(deleted)
    }

    pub fn create_backup_with_retention(&self) -> SpendwiseResult<(PathBuf, Vec<PathBuf>)> {
        let path = self.create_backup()?;
        let deleted = self.enforce_retention()?;
        Ok((path, deleted))
    }
}

fn backup_filename(timestamp: DateTime<Utc>) -> String {
    format!("{}{}{}", FILE_PREFIX, timestamp.format(TIMESTAMP_FORMAT), FILE_SUFFIX)
}

fn parse_backup_info(path: &Path) -> Option<BackupInfo> {
    let filename = path.file_name()?.to_string_lossy().to_string();
    let stamp = filename.strip_prefix(FILE_PREFIX)?.strip_suffix(FILE_SUFFIX)?;
    let created_at = parse_backup_timestamp(stamp)?;
    let size_bytes = fs::metadata(path).ok()?.len();

    Some(BackupInfo {
        filename,
        path: path.to_path_buf(),
        created_at,
        size_bytes,
        is_monthly: false,
    })
}

/// Parse a file name timestamp, accepting the older form without millis
fn parse_backup_timestamp(stamp: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(stamp, LEGACY_TIMESTAMP_FORMAT))
        .ok()
        .map(|naive| naive.and_utc())
}

/// Flag the oldest backup of each month; expects newest-first order
fn mark_monthly(backups: &mut [BackupInfo]) {
    let mut seen = HashSet::new();
    for backup in backups.iter_mut().rev() {
        let key = (backup.created_at.year(), backup.created_at.month());
        backup.is_monthly = seen.insert(key);
    }
}

/// Read a data file as raw JSON, or the empty file layout `T` when missing
fn read_json_value<T: Default + Serialize>(path: &Path) -> SpendwiseResult<serde_json::Value> {
    if !path.exists() {
        return Ok(serde_json::to_value(T::default())?);
    }

    let contents = fs::read_to_string(path)
        .map_err(|e| SpendwiseError::Io(format!("Failed to read file for backup: {}", e)))?;
    serde_json::from_str(&contents)
        .map_err(|e| SpendwiseError::Json(format!("Failed to parse JSON for backup: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_manager(daily_count: u32, monthly_count: u32) -> (BackupManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let paths = SpendwisePaths::with_base_dir(temp_dir.path().to_path_buf());
        paths.ensure_directories().unwrap();

        let retention = BackupRetention {
            daily_count,
            monthly_count,
        };
        (BackupManager::new(paths, retention), temp_dir)
    }

    fn touch_backup(manager: &BackupManager, stamp: &str) -> PathBuf {
        let path = manager.backup_dir().join(format!("backup-{}.json", stamp));
        fs::write(&path, "{}").unwrap();
        path
    }

    #[test]
    fn test_create_backup() {
        let (manager, _temp) = create_test_manager(3, 2);
        let path = manager.create_backup().unwrap();

        assert!(path.exists());
        let archive: BackupArchive =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(archive.schema_version, BACKUP_SCHEMA_VERSION);
        assert_eq!(archive.transactions, serde_json::json!({ "transactions": [] }));
        assert_eq!(archive.categories, serde_json::json!({ "categories": [] }));
        assert_eq!(archive.budgets, serde_json::json!({ "budgets": [] }));
    }

    #[test]
    fn test_rapid_backups_get_unique_names() {
        let (manager, _temp) = create_test_manager(10, 2);
        let first = manager.create_backup().unwrap();
        let second = manager.create_backup().unwrap();
        assert_ne!(first, second);
        assert_eq!(manager.list_backups().unwrap().len(), 2);
    }

    #[test]
    fn test_list_ignores_other_files() {
        let (manager, _temp) = create_test_manager(3, 2);
        touch_backup(&manager, "20250101-120000-000");
        fs::write(manager.backup_dir().join("notes.txt"), "x").unwrap();
        fs::write(manager.backup_dir().join("backup-garbage.json"), "{}").unwrap();

        assert_eq!(manager.list_backups().unwrap().len(), 1);
    }

    #[test]
    fn test_monthly_flags_oldest_of_month() {
        let (manager, _temp) = create_test_manager(3, 2);
        touch_backup(&manager, "20250103-080000-000");
        touch_backup(&manager, "20250110-080000-000");
        touch_backup(&manager, "20250205-080000-000");

        let backups = manager.list_backups().unwrap();
        let monthly: Vec<_> = backups
            .iter()
            .filter(|b| b.is_monthly)
            .map(|b| b.filename.as_str())
            .collect();
        assert_eq!(
            monthly,
            vec!["backup-20250205-080000-000.json", "backup-20250103-080000-000.json"]
        );
    }

    #[test]
    fn test_retention_keeps_recent_and_monthly() {
        let (manager, _temp) = create_test_manager(2, 1);
        let oldest_month = touch_backup(&manager, "20241201-080000-000");
        let jan_first = touch_backup(&manager, "20250102-080000-000");
        let jan_mid = touch_backup(&manager, "20250115-080000-000");
        let jan_late = touch_backup(&manager, "20250120-080000-000");
        let jan_last = touch_backup(&manager, "20250125-080000-000");

        let deleted = manager.enforce_retention().unwrap();

        // Only January's monthly backup fits the quota; jan_mid is neither recent nor monthly
        assert_eq!(deleted.len(), 2);
        assert!(deleted.contains(&oldest_month));
        assert!(deleted.contains(&jan_mid));
        assert!(jan_first.exists());
        assert!(jan_late.exists());
        assert!(jan_last.exists());
    }

    #[test]
    fn test_get_latest_backup() {
        let (manager, _temp) = create_test_manager(3, 2);
        assert!(manager.get_latest_backup().unwrap().is_none());

        touch_backup(&manager, "20250101-120000-000");
        let newest = touch_backup(&manager, "20250301-120000-000");
        assert_eq!(manager.get_latest_backup().unwrap().unwrap().path, newest);
        assert!(manager
            .get_backup("backup-20250101-120000-000.json")
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_parse_backup_timestamp() {
        let with_millis = parse_backup_timestamp("20251127-143022-456").unwrap();
        assert_eq!((with_millis.year(), with_millis.month(), with_millis.day()), (2025, 11, 27));
        assert_eq!(with_millis.timestamp_subsec_millis(), 456);

        assert!(parse_backup_timestamp("20251127-143022").is_some());
        assert!(parse_backup_timestamp("garbage").is_none());
        assert!(parse_backup_timestamp("20251127-143022-45").is_none());
    }

    #[test]
    fn test_filename_timestamp_matches_creation_time() {
        let created = "2025-06-30T23:59:58.007Z".parse::<DateTime<Utc>>().unwrap();
        let filename = backup_filename(created);
        assert_eq!(filename, "backup-20250630-235958-007.json");

        let stamp = filename
            .strip_prefix(FILE_PREFIX)
            .and_then(|s| s.strip_suffix(FILE_SUFFIX))
            .unwrap();
        assert_eq!(parse_backup_timestamp(stamp), Some(created));
    }

    #[test]
    fn test_create_backup_to_explicit_path() {
        let (manager, temp) = create_test_manager(3, 2);
        let target = temp.path().join("exports").join("manual.json");
        let path = manager.create_backup_to(&target).unwrap();
        assert!(path.exists());
        // Not in the backup directory, so not listed
        assert!(manager.list_backups().unwrap().is_empty());
    }
}
