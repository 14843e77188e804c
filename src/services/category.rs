//! Category service
//!
//! CRUD for categories, keyword maintenance and the referential rules around
//! deletion: a category still referenced by transactions is only removed when
//! those transactions are moved elsewhere, and its budgets go with it.

use tracing::info;

use crate::error::{SpendwiseError, SpendwiseResult};
use crate::models::{Category, CategoryId, Money, DEFAULT_CATEGORY_NAME};
use crate::storage::Storage;

/// Service for category management
pub struct CategoryService<'a> {
    storage: &'a Storage,
}

/// Fields to change on an existing category
#[derive(Debug, Clone, Default)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub budget_limit: Option<Money>,
    pub clear_budget_limit: bool,
}

impl<'a> CategoryService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a category, appended after the existing ones
    pub fn create(
        &self,
        name: &str,
        keywords: &[String],
        budget_limit: Option<Money>,
    ) -> SpendwiseResult<Category> {
        let name = name.trim();

        if self.storage.categories.count_by_name(name)? > 0 {
            return Err(SpendwiseError::Duplicate {
                entity_type: "Category",
                identifier: name.to_string(),
            });
        }

        let mut category = Category::with_keywords(name, keywords);
        category.budget_limit = budget_limit;
        category.sort_order = self
            .storage
            .categories
            .max_sort_order()?
            .map_or(0, |max| max + 1);

        category
            .validate()
            .map_err(|e| SpendwiseError::Validation(e.to_string()))?;

        self.storage.categories.upsert(category.clone())?;
        self.storage.categories.save()?;

        info!(category = %category.name, id = %category.id, "created category");
        Ok(category)
    }

    pub fn get(&self, id: CategoryId) -> SpendwiseResult<Option<Category>> {
        self.storage.categories.get_category(id)
    }

    pub fn get_by_name(&self, name: &str) -> SpendwiseResult<Option<Category>> {
        self.storage.categories.get_by_name(name)
    }

    pub fn count_by_name(&self, name: &str) -> SpendwiseResult<usize> {
        self.storage.categories.count_by_name(name)
    }

    /// Find a category by name or ID string
    pub fn find(&self, identifier: &str) -> SpendwiseResult<Option<Category>> {
        if let Some(category) = self.storage.categories.get_by_name(identifier)? {
            return Ok(Some(category));
        }

        if let Ok(id) = identifier.parse::<CategoryId>() {
            return self.storage.categories.get_category(id);
        }

        let matches: Vec<_> = self
            .storage
            .categories
            .get_all_categories()?
            .into_iter()
            .filter(|c| c.id.matches_prefix(identifier))
            .collect();
        Ok(if matches.len() == 1 {
            matches.into_iter().next()
        } else {
            None
        })
    }

    /// Like [`find`](Self::find) but a miss is an error
    pub fn require(&self, identifier: &str) -> SpendwiseResult<Category> {
        self.find(identifier)?
            .ok_or_else(|| SpendwiseError::category_not_found(identifier))
    }

    /// All categories in display/matching order
    pub fn list(&self) -> SpendwiseResult<Vec<Category>> {
        self.storage.categories.get_all_categories()
    }

    pub fn update(&self, id: CategoryId, update: CategoryUpdate) -> SpendwiseResult<Category> {
        let mut category = self
            .storage
            .categories
            .get_category(id)?
            .ok_or_else(|| SpendwiseError::category_not_found(id.to_string()))?;

        if let Some(new_name) = update.name {
            let new_name = new_name.trim();
            if let Some(existing) = self.storage.categories.get_by_name(new_name)? {
                if existing.id != id {
                    return Err(SpendwiseError::Duplicate {
                        entity_type: "Category",
                        identifier: new_name.to_string(),
                    });
                }
            }
            category.name = new_name.to_string();
        }

        if update.clear_budget_limit {
            category.clear_budget_limit();
        } else if let Some(limit) = update.budget_limit {
            category.set_budget_limit(limit);
        }

        category.updated_at = chrono::Utc::now();
        category
            .validate()
            .map_err(|e| SpendwiseError::Validation(e.to_string()))?;

        self.storage.categories.upsert(category.clone())?;
        self.storage.categories.save()?;

        info!(category = %category.name, "updated category");
        Ok(category)
    }

    /// Set or clear the category's default monthly limit
    pub fn update_budget_limit(
        &self,
        id: CategoryId,
        limit: Option<Money>,
    ) -> SpendwiseResult<Category> {
        if limit.is_some_and(|l| l.is_negative()) {
            return Err(SpendwiseError::Validation(
                "Budget limit cannot be negative".into(),
            ));
        }
        if !self.storage.categories.update_budget_limit(id, limit)? {
            return Err(SpendwiseError::category_not_found(id.to_string()));
        }
        self.storage.categories.save()?;
        self.get(id)?
            .ok_or_else(|| SpendwiseError::category_not_found(id.to_string()))
    }

    pub fn add_keyword(&self, id: CategoryId, keyword: &str) -> SpendwiseResult<bool> {
        self.modify_keywords(id, |c| c.add_keyword(keyword))
    }

    pub fn remove_keyword(&self, id: CategoryId, keyword: &str) -> SpendwiseResult<bool> {
        self.modify_keywords(id, |c| c.remove_keyword(keyword))
    }

    fn modify_keywords<F>(&self, id: CategoryId, change: F) -> SpendwiseResult<bool>
    where
        F: FnOnce(&mut Category) -> bool,
    {
        let mut category = self
            .storage
            .categories
            .get_category(id)?
            .ok_or_else(|| SpendwiseError::category_not_found(id.to_string()))?;

        let changed = change(&mut category);
        if changed {
            self.storage.categories.upsert(category)?;
            self.storage.categories.save()?;
        }
        Ok(changed)
    }

    /// Make sure the catch-all category exists, creating it if needed
    pub fn ensure_default_category(&self) -> SpendwiseResult<Category> {
        self.ensure_named(DEFAULT_CATEGORY_NAME)
    }

    /// Look up a category by name, creating an empty one if it is missing
    pub fn ensure_named(&self, name: &str) -> SpendwiseResult<Category> {
        match self.storage.categories.get_by_name(name)? {
            Some(category) => Ok(category),
            None => self.create(name, &[], None),
        }
    }

    /// Number of transactions referencing the category
    pub fn transaction_count(&self, id: CategoryId) -> SpendwiseResult<usize> {
        self.storage.transactions.count_for_category(id)
    }

    /// Delete a category unless transactions still use it
    ///
    /// Returns `Ok(false)` without changing anything when the category is in
    /// use. Budgets for the category are removed with it.
    pub fn delete_if_unused(&self, id: CategoryId) -> SpendwiseResult<bool> {
        let category = self
            .storage
            .categories
            .get_category(id)?
            .ok_or_else(|| SpendwiseError::category_not_found(id.to_string()))?;

        if self.storage.transactions.count_for_category(id)? > 0 {
            return Ok(false);
        }

        self.remove_with_budgets(&category)?;
        Ok(true)
    }

    /// Move the category's transactions to `target`, then delete it
    ///
    /// Returns how many transactions were moved.
    pub fn delete_reassigning(&self, id: CategoryId, target: CategoryId) -> SpendwiseResult<usize> {
        if id == target {
            return Err(SpendwiseError::Validation(
                "Cannot reassign transactions to the category being deleted".into(),
            ));
        }

        let category = self
            .storage
            .categories
            .get_category(id)?
            .ok_or_else(|| SpendwiseError::category_not_found(id.to_string()))?;
        if self.storage.categories.get_category(target)?.is_none() {
            return Err(SpendwiseError::category_not_found(target.to_string()));
        }

        let moved = self.storage.transactions.reassign_category(id, target)?;
        self.storage.transactions.save()?;
        self.remove_with_budgets(&category)?;

        info!(category = %category.name, moved, "reassigned transactions");
        Ok(moved)
    }

    fn remove_with_budgets(&self, category: &Category) -> SpendwiseResult<()> {
        let budgets = self.storage.budgets.delete_for_category(category.id)?;
        self.storage.categories.delete(category.id)?;
        self.storage.budgets.save()?;
        self.storage.categories.save()?;

        info!(category = %category.name, budgets, "deleted category");
        Ok(())
    }
}
