//! Rolling backups of the data directory
//!
//! `BackupManager` writes timestamped archives and prunes them according to
//! the configured retention. `RestoreManager` validates an archive and writes
//! its sections back over the data files.
//!
//! An archive is a single JSON document holding the raw contents of
//! `transactions.json`, `categories.json` and `budgets.json` together with a
//! schema version and creation time.
//!
//! ```rust,ignore
//! use spendwise::backup::{BackupManager, RestoreManager};
//! use spendwise::config::{paths::SpendwisePaths, settings::BackupRetention};
//!
//! let paths = SpendwisePaths::new()?;
//! let manager = BackupManager::new(paths.clone(), BackupRetention::default());
//! let (backup_path, _pruned) = manager.create_backup_with_retention()?;
//!
//! let result = RestoreManager::new(paths).restore_from_file(&backup_path)?;
//! println!("{}", result.summary());
//! ```

mod manager;
mod restore;

pub use manager::{BackupArchive, BackupInfo, BackupManager, BACKUP_SCHEMA_VERSION};
pub use restore::{RestoreManager, RestoreResult, ValidationResult};
