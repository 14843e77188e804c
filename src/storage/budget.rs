//! Monthly budget repository backed by `budgets.json`
//!
//! Budgets are keyed by (category, month); inserting a second budget for the
//! same pair replaces the first.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::SpendwiseError;
use crate::models::{Budget, BudgetMonth, CategoryId};

use super::file_io::{read_json, write_json_atomic};
use super::{read_guard, write_guard};

/// On-disk layout of `budgets.json`
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct BudgetData {
    #[serde(default)]
    pub budgets: Vec<Budget>,
}

type BudgetKey = (CategoryId, BudgetMonth);

pub struct BudgetRepository {
    path: PathBuf,
    budgets: RwLock<HashMap<BudgetKey, Budget>>,
}

impl BudgetRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            budgets: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(&self) -> Result<(), SpendwiseError> {
        let file_data: BudgetData = read_json(&self.path)?;

        let mut budgets = write_guard(&self.budgets)?;
        budgets.clear();
        for budget in file_data.budgets {
            budgets.insert(budget.key(), budget);
        }

        Ok(())
    }

    pub fn save(&self) -> Result<(), SpendwiseError> {
        let budgets = self.get_all()?;
        write_json_atomic(&self.path, &BudgetData { budgets })
    }

    pub fn get(
        &self,
        category_id: CategoryId,
        month: BudgetMonth,
    ) -> Result<Option<Budget>, SpendwiseError> {
        Ok(read_guard(&self.budgets)?
            .get(&(category_id, month))
            .cloned())
    }

    /// All budgets ordered by month, then category
    pub fn get_all(&self) -> Result<Vec<Budget>, SpendwiseError> {
        let mut list: Vec<_> = read_guard(&self.budgets)?.values().cloned().collect();
        list.sort_by_key(|b| (b.month, b.category_id));
        Ok(list)
    }

    pub fn get_for_month(&self, month: BudgetMonth) -> Result<Vec<Budget>, SpendwiseError> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|b| b.month == month)
            .collect())
    }

    pub fn get_for_category(&self, category_id: CategoryId) -> Result<Vec<Budget>, SpendwiseError> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|b| b.category_id == category_id)
            .collect())
    }

    /// Insert or replace the budget for its (category, month)
    pub fn upsert(&self, budget: Budget) -> Result<(), SpendwiseError> {
        write_guard(&self.budgets)?.insert(budget.key(), budget);
        Ok(())
    }

    pub fn delete(
        &self,
        category_id: CategoryId,
        month: BudgetMonth,
    ) -> Result<bool, SpendwiseError> {
        Ok(write_guard(&self.budgets)?
            .remove(&(category_id, month))
            .is_some())
    }

    /// Remove every budget of a category, returning how many were removed
    pub fn delete_for_category(&self, category_id: CategoryId) -> Result<usize, SpendwiseError> {
        let mut budgets = write_guard(&self.budgets)?;
        let before = budgets.len();
        budgets.retain(|(cat, _), _| *cat != category_id);
        Ok(before - budgets.len())
    }

    pub fn count(&self) -> Result<usize, SpendwiseError> {
        Ok(read_guard(&self.budgets)?.len())
    }
}
