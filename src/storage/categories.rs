//! Category repository backed by `categories.json`

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::SpendwiseError;
use crate::models::{Category, CategoryId, Money};

use super::file_io::{read_json, write_json_atomic};
use super::{read_guard, write_guard};

/// On-disk layout of `categories.json`
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct CategoryData {
    #[serde(default)]
    pub categories: Vec<Category>,
}

pub struct CategoryRepository {
    path: PathBuf,
    categories: RwLock<HashMap<CategoryId, Category>>,
}

fn sorted(categories: &HashMap<CategoryId, Category>) -> Vec<Category> {
    let mut list: Vec<_> = categories.values().cloned().collect();
    list.sort_by(|a, b| {
        a.sort_order
            .cmp(&b.sort_order)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
    list
}

impl CategoryRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            categories: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(&self) -> Result<(), SpendwiseError> {
        let file_data: CategoryData = read_json(&self.path)?;

        let mut categories = write_guard(&self.categories)?;
        categories.clear();
        for category in file_data.categories {
            categories.insert(category.id, category);
        }

        Ok(())
    }

    pub fn save(&self) -> Result<(), SpendwiseError> {
        let categories = read_guard(&self.categories)?;
        write_json_atomic(
            &self.path,
            &CategoryData {
                categories: sorted(&categories),
            },
        )
    }

    pub fn get_category(&self, id: CategoryId) -> Result<Option<Category>, SpendwiseError> {
        Ok(read_guard(&self.categories)?.get(&id).cloned())
    }

    /// All categories ordered by sort order, then name
    pub fn get_all_categories(&self) -> Result<Vec<Category>, SpendwiseError> {
        Ok(sorted(&*read_guard(&self.categories)?))
    }

    /// Case-insensitive lookup by name
    pub fn get_by_name(&self, name: &str) -> Result<Option<Category>, SpendwiseError> {
        let name_lower = name.trim().to_lowercase();
        Ok(read_guard(&self.categories)?
            .values()
            .find(|c| c.name.to_lowercase() == name_lower)
            .cloned())
    }

    pub fn count_by_name(&self, name: &str) -> Result<usize, SpendwiseError> {
        let name_lower = name.trim().to_lowercase();
        Ok(read_guard(&self.categories)?
            .values()
            .filter(|c| c.name.to_lowercase() == name_lower)
            .count())
    }

    /// Highest sort order in use, for appending new categories
    pub fn max_sort_order(&self) -> Result<Option<i32>, SpendwiseError> {
        Ok(read_guard(&self.categories)?
            .values()
            .map(|c| c.sort_order)
            .max())
    }

    pub fn upsert(&self, category: Category) -> Result<(), SpendwiseError> {
        write_guard(&self.categories)?.insert(category.id, category);
        Ok(())
    }

    pub fn update_budget_limit(
        &self,
        id: CategoryId,
        limit: Option<Money>,
    ) -> Result<bool, SpendwiseError> {
        let mut categories = write_guard(&self.categories)?;
        match categories.get_mut(&id) {
            Some(category) => {
                match limit {
                    Some(limit) => category.set_budget_limit(limit),
                    None => category.clear_budget_limit(),
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn delete(&self, id: CategoryId) -> Result<bool, SpendwiseError> {
        Ok(write_guard(&self.categories)?.remove(&id).is_some())
    }

    pub fn count(&self) -> Result<usize, SpendwiseError> {
        Ok(read_guard(&self.categories)?.len())
    }
}
