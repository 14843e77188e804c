//! Path management for Spendwise
//!
//! ## Path Resolution Order
//!
//! 1. `SPENDWISE_DATA_DIR` environment variable (if set)
//! 2. The platform config directory reported by `directories::ProjectDirs`
//!    (`~/.config/spendwise` on Linux, `%APPDATA%\spendwise` on Windows)

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::SpendwiseError;

/// Environment variable that overrides the base directory
pub const DATA_DIR_ENV: &str = "SPENDWISE_DATA_DIR";

/// Manages all paths used by Spendwise
#[derive(Debug, Clone)]
pub struct SpendwisePaths {
    base_dir: PathBuf,
}

impl SpendwisePaths {
    /// Resolve paths from the environment or the platform defaults
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> Result<Self, SpendwiseError> {
        let base_dir = match std::env::var(DATA_DIR_ENV) {
            Ok(custom) if !custom.trim().is_empty() => PathBuf::from(custom),
            _ => resolve_default_path()?,
        };

        Ok(Self { base_dir })
    }

    /// Create paths rooted at a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the data directory (`<base>/data/`)
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Get the backup directory (`<base>/backups/`)
    pub fn backup_dir(&self) -> PathBuf {
        self.base_dir.join("backups")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    pub fn transactions_file(&self) -> PathBuf {
        self.data_dir().join("transactions.json")
    }

    pub fn categories_file(&self) -> PathBuf {
        self.data_dir().join("categories.json")
    }

    pub fn budgets_file(&self) -> PathBuf {
        self.data_dir().join("budgets.json")
    }

    /// Ensure the base, data and backup directories exist
    pub fn ensure_directories(&self) -> Result<(), SpendwiseError> {
        for dir in [self.base_dir.clone(), self.data_dir(), self.backup_dir()] {
            std::fs::create_dir_all(&dir).map_err(|e| {
                SpendwiseError::Io(format!(
                    "Failed to create directory {}: {}",
                    dir.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Check if Spendwise has been initialized (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

fn resolve_default_path() -> Result<PathBuf, SpendwiseError> {
    ProjectDirs::from("", "", "spendwise")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| SpendwiseError::Config("Could not determine home directory".into()))
}
