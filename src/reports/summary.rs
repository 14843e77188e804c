//! Monthly dashboard summary

use crate::error::SpendwiseResult;
use crate::models::{BudgetMonth, Money};
use crate::services::{BudgetService, CategoryBudgetLine};
use crate::storage::Storage;

use super::spending::{SpendingByCategory, SpendingReport};

/// Income, expenses and the biggest spending categories of one month
#[derive(Debug, Clone)]
pub struct MonthlySummary {
    pub month: BudgetMonth,
    pub income: Money,
    /// Absolute amount spent
    pub expenses: Money,
    pub net: Money,
    pub transaction_count: usize,
    pub top_categories: Vec<SpendingByCategory>,
    /// Categories that went past their limit this month
    pub over_budget: Vec<CategoryBudgetLine>,
}

impl MonthlySummary {
    pub fn generate(storage: &Storage, month: BudgetMonth, top: usize) -> SpendwiseResult<Self> {
        let spending = SpendingReport::for_month(storage, month)?;
        let over_budget = BudgetService::new(storage).over_budget(month)?;

        Ok(Self {
            month,
            income: spending.total_income,
            expenses: spending.total_spent,
            net: spending.total_income - spending.total_spent,
            transaction_count: spending.total_transactions,
            top_categories: spending.top_categories(top).to_vec(),
            over_budget,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.transaction_count == 0
    }
}
