//! User settings for Spendwise
//!
//! Persisted as `config.json` in the base directory. Every field carries a
//! serde default so older or hand-edited files keep loading.

use serde::{Deserialize, Serialize};

use super::paths::SpendwisePaths;
use crate::error::SpendwiseError;

/// Backup retention settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupRetention {
    /// Number of daily backups to keep
    pub daily_count: u32,
    /// Number of monthly backups to keep
    pub monthly_count: u32,
}

impl Default for BackupRetention {
    fn default() -> Self {
        Self {
            daily_count: 30,
            monthly_count: 12,
        }
    }
}

/// Connection settings for the open banking API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenBankingSettings {
    /// Base URL the account and transaction links are resolved against
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for OpenBankingSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// User settings for Spendwise
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Currency code or symbol shown next to amounts
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Category that receives income and unmatched transactions
    #[serde(default = "default_category")]
    pub default_category: String,

    #[serde(default)]
    pub backup_retention: BackupRetention,

    #[serde(default)]
    pub open_banking: OpenBankingSettings,

    /// Whether `init` has been run
    #[serde(default)]
    pub setup_completed: bool,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "CHF".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_category() -> String {
    "Miscellaneous".to_string()
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            currency_symbol: default_currency(),
            date_format: default_date_format(),
            default_category: default_category(),
            backup_retention: BackupRetention::default(),
            open_banking: OpenBankingSettings::default(),
            setup_completed: false,
        }
    }
}

impl Settings {
    /// Load settings from disk, or return defaults if the file doesn't exist
    ///
    /// Defaults are not written; callers decide when to persist.
    pub fn load_or_create(paths: &SpendwisePaths) -> Result<Self, SpendwiseError> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| SpendwiseError::Io(format!("Failed to read settings file: {}", e)))?;

        serde_json::from_str(&contents)
            .map_err(|e| SpendwiseError::Config(format!("Failed to parse settings file: {}", e)))
    }

    /// Save settings to disk
    pub fn save(&self, paths: &SpendwisePaths) -> Result<(), SpendwiseError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            SpendwiseError::Config(format!("Failed to serialize settings: {}", e))
        })?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| SpendwiseError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }
}
