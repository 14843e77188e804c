//! Budget service
//!
//! Monthly per-category limits and how spending tracks against them. A month
//! without an explicit budget falls back to the category's default
//! `budget_limit`.

use tracing::info;

use crate::error::{SpendwiseError, SpendwiseResult};
use crate::models::{Budget, BudgetMonth, BudgetStatus, Category, CategoryId, Money};
use crate::storage::Storage;

pub struct BudgetService<'a> {
    storage: &'a Storage,
}

/// One category's line in the budget overview
#[derive(Debug, Clone)]
pub struct CategoryBudgetLine {
    pub category: Category,
    pub status: BudgetStatus,
    /// Whether the limit comes from a month-specific budget
    pub explicit: bool,
}

/// Budget overview for a month
#[derive(Debug, Clone)]
pub struct BudgetOverview {
    pub month: BudgetMonth,
    pub total_limit: Money,
    pub total_spent: Money,
    pub total_remaining: Money,
    pub lines: Vec<CategoryBudgetLine>,
}

impl BudgetOverview {
    pub fn over_budget(&self) -> impl Iterator<Item = &CategoryBudgetLine> {
        self.lines.iter().filter(|l| l.status.is_over_budget())
    }
}

impl<'a> BudgetService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    fn require_category(&self, category_id: CategoryId) -> SpendwiseResult<Category> {
        self.storage
            .categories
            .get_category(category_id)?
            .ok_or_else(|| SpendwiseError::category_not_found(category_id.to_string()))
    }

    /// The month-specific budget amount, or zero when none is set
    pub fn get_budget_for_category(
        &self,
        category_id: CategoryId,
        month: BudgetMonth,
    ) -> SpendwiseResult<Money> {
        Ok(self
            .storage
            .budgets
            .get(category_id, month)?
            .map(|b| b.limit)
            .unwrap_or_default())
    }

    /// Set the category's budget for a month, replacing any existing one
    ///
    /// A zero amount removes the budget instead. Returns the stored budget,
    /// or `None` when it was removed.
    pub fn set_budget_for_category(
        &self,
        category_id: CategoryId,
        month: BudgetMonth,
        amount: Money,
    ) -> SpendwiseResult<Option<Budget>> {
        let category = self.require_category(category_id)?;

        if amount.is_zero() {
            self.delete_budget(category_id, month)?;
            return Ok(None);
        }

        let budget = match self.storage.budgets.get(category_id, month)? {
            Some(mut existing) => {
                existing.set_limit(amount);
                existing
            }
            None => Budget::new(category_id, month, amount),
        };

        budget
            .validate()
            .map_err(|e| SpendwiseError::Budget(e.to_string()))?;

        self.storage.budgets.upsert(budget.clone())?;
        self.storage.budgets.save()?;

        info!(category = %category.name, %month, limit = %amount, "set budget");
        Ok(Some(budget))
    }

    pub fn delete_budget(&self, category_id: CategoryId, month: BudgetMonth) -> SpendwiseResult<bool> {
        let removed = self.storage.budgets.delete(category_id, month)?;
        if removed {
            self.storage.budgets.save()?;
            info!(%category_id, %month, "removed budget");
        }
        Ok(removed)
    }

    pub fn get_budgets_for_month(&self, month: BudgetMonth) -> SpendwiseResult<Vec<Budget>> {
        self.storage.budgets.get_for_month(month)
    }

    /// Month-specific budget if set, otherwise the category default
    pub fn effective_limit(&self, category: &Category, month: BudgetMonth) -> SpendwiseResult<Money> {
        Ok(self
            .storage
            .budgets
            .get(category.id, month)?
            .map(|b| b.limit)
            .or(category.budget_limit)
            .unwrap_or_default())
    }

    /// Expenses in the category as a positive amount
    pub fn spent_for_category(
        &self,
        category_id: CategoryId,
        month: Option<BudgetMonth>,
    ) -> SpendwiseResult<Money> {
        Ok(self
            .storage
            .transactions
            .spent_for_category(category_id, month)?
            .abs())
    }

    pub fn status(&self, category_id: CategoryId, month: BudgetMonth) -> SpendwiseResult<BudgetStatus> {
        let category = self.require_category(category_id)?;
        let limit = self.effective_limit(&category, month)?;
        let spent = self.spent_for_category(category_id, Some(month))?;
        Ok(BudgetStatus::new(category_id, month, limit, spent))
    }

    /// Status of every category with a positive limit in the month
    pub fn overview(&self, month: BudgetMonth) -> SpendwiseResult<BudgetOverview> {
        let mut lines = Vec::new();
        let mut total_limit = Money::zero();
        let mut total_spent = Money::zero();

        for category in self.storage.categories.get_all_categories()? {
            let explicit = self.storage.budgets.get(category.id, month)?.is_some();
            let limit = self.effective_limit(&category, month)?;
            if !limit.is_positive() {
                continue;
            }

            let spent = self.spent_for_category(category.id, Some(month))?;
            total_limit += limit;
            total_spent += spent;
            lines.push(CategoryBudgetLine {
                status: BudgetStatus::new(category.id, month, limit, spent),
                category,
                explicit,
            });
        }

        Ok(BudgetOverview {
            month,
            total_limit,
            total_spent,
            total_remaining: total_limit - total_spent,
            lines,
        })
    }

    pub fn over_budget(&self, month: BudgetMonth) -> SpendwiseResult<Vec<CategoryBudgetLine>> {
        Ok(self.overview(month)?.over_budget().cloned().collect())
    }

    /// Copy month-specific budgets from one month to another
    ///
    /// Budgets already present in the target month are kept. Returns how
    /// many budgets were copied.
    pub fn copy_month(&self, from: BudgetMonth, to: BudgetMonth) -> SpendwiseResult<usize> {
        if from == to {
            return Err(SpendwiseError::Budget(
                "Source and target month are the same".into(),
            ));
        }

        let mut copied = 0;
        for budget in self.storage.budgets.get_for_month(from)? {
            if self.storage.budgets.get(budget.category_id, to)?.is_some() {
                continue;
            }
            self.storage
                .budgets
                .upsert(Budget::new(budget.category_id, to, budget.limit))?;
            copied += 1;
        }

        if copied > 0 {
            self.storage.budgets.save()?;
        }
        info!(%from, %to, copied, "copied budgets");
        Ok(copied)
    }
}
