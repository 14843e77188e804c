//! Storage layer for Spendwise
//!
//! One JSON file per entity under `<base>/data/`, each owned by a repository
//! that keeps an in-memory copy behind an `RwLock`. Writes are atomic.

pub mod budget;
pub mod categories;
pub mod file_io;
pub mod init;
pub mod transactions;

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

pub use budget::{BudgetData, BudgetRepository};
pub use categories::{CategoryData, CategoryRepository};
pub use file_io::{read_json, write_json_atomic};
pub use init::initialize_storage;
pub use transactions::{TransactionData, TransactionRepository};

use crate::config::paths::SpendwisePaths;
use crate::error::SpendwiseError;

pub(crate) fn read_guard<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, SpendwiseError> {
    lock.read()
        .map_err(|e| SpendwiseError::Storage(format!("Failed to acquire read lock: {}", e)))
}

pub(crate) fn write_guard<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, SpendwiseError> {
    lock.write()
        .map_err(|e| SpendwiseError::Storage(format!("Failed to acquire write lock: {}", e)))
}

/// Storage coordinator that owns every repository
pub struct Storage {
    paths: SpendwisePaths,
    pub transactions: TransactionRepository,
    pub categories: CategoryRepository,
    pub budgets: BudgetRepository,
}

impl Storage {
    /// Create a Storage rooted at `paths`, creating directories as needed
    pub fn new(paths: SpendwisePaths) -> Result<Self, SpendwiseError> {
        paths.ensure_directories()?;

        Ok(Self {
            transactions: TransactionRepository::new(paths.transactions_file()),
            categories: CategoryRepository::new(paths.categories_file()),
            budgets: BudgetRepository::new(paths.budgets_file()),
            paths,
        })
    }

    /// Create and load in one step
    pub fn open(paths: SpendwisePaths) -> Result<Self, SpendwiseError> {
        let storage = Self::new(paths)?;
        storage.load_all()?;
        Ok(storage)
    }

    pub fn paths(&self) -> &SpendwisePaths {
        &self.paths
    }

    pub fn load_all(&self) -> Result<(), SpendwiseError> {
        self.transactions.load()?;
        self.categories.load()?;
        self.budgets.load()?;
        Ok(())
    }

    pub fn save_all(&self) -> Result<(), SpendwiseError> {
        self.transactions.save()?;
        self.categories.save()?;
        self.budgets.save()?;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.paths.is_initialized()
    }
}
