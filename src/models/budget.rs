//! Monthly budget model
//!
//! A budget caps spending for one category in one calendar month. There is
//! at most one budget per (category, month) pair.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::CategoryId;
use super::money::Money;
use super::period::BudgetMonth;

/// A spending limit for a category in a specific month
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub category_id: CategoryId,

    pub month: BudgetMonth,

    pub limit: Money,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Budget {
    pub fn new(category_id: CategoryId, month: BudgetMonth, limit: Money) -> Self {
        let now = Utc::now();
        Self {
            category_id,
            month,
            limit,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn set_limit(&mut self, limit: Money) {
        self.limit = limit;
        self.updated_at = Utc::now();
    }

    /// Repository key
    pub fn key(&self) -> (CategoryId, BudgetMonth) {
        (self.category_id, self.month)
    }

    pub fn validate(&self) -> Result<(), BudgetValidationError> {
        if self.limit.is_negative() {
            return Err(BudgetValidationError::NegativeLimit);
        }
        Ok(())
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} limit: {}", self.month, self.limit)
    }
}

/// How a category is tracking against its limit in a month
#[derive(Debug, Clone)]
pub struct BudgetStatus {
    pub category_id: CategoryId,

    pub month: BudgetMonth,

    pub limit: Money,

    /// Total expenses as a positive amount
    pub spent: Money,

    /// `limit - spent`; negative when overspent
    pub remaining: Money,

    /// `spent / limit` clamped to 0..=1, or 0 without a limit
    pub progress: f64,
}

impl BudgetStatus {
    pub fn new(category_id: CategoryId, month: BudgetMonth, limit: Money, spent: Money) -> Self {
        let progress = spent.ratio_of(limit).clamp(0.0, 1.0);
        Self {
            category_id,
            month,
            limit,
            spent,
            remaining: limit - spent,
            progress,
        }
    }

    pub fn is_over_budget(&self) -> bool {
        self.remaining.is_negative()
    }

    /// Progress as a whole percentage (0-100)
    pub fn percent(&self) -> u32 {
        (self.progress * 100.0).round() as u32
    }
}

impl fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Spent: {} of {} | Remaining: {}",
            self.spent, self.limit, self.remaining
        )
    }
}

/// Validation errors for budgets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BudgetValidationError {
    NegativeLimit,
}

impl fmt::Display for BudgetValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativeLimit => write!(f, "Budget limit cannot be negative"),
        }
    }
}

impl std::error::Error for BudgetValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn month() -> BudgetMonth {
        BudgetMonth::new(2025, 1).unwrap()
    }

    #[test]
    fn test_new_budget() {
        let category_id = CategoryId::new();
        let mut budget = Budget::new(category_id, month(), Money::from_cents(50000));
        assert_eq!(budget.key(), (category_id, month()));
        assert!(budget.validate().is_ok());

        budget.set_limit(Money::from_cents(-1));
        assert_eq!(budget.validate(), Err(BudgetValidationError::NegativeLimit));
    }

    #[test]
    fn test_status_under_budget() {
        let status = BudgetStatus::new(
            CategoryId::new(),
            month(),
            Money::from_cents(40000),
            Money::from_cents(10000),
        );
        assert_eq!(status.remaining.cents(), 30000);
        assert_eq!(status.progress, 0.25);
        assert_eq!(status.percent(), 25);
        assert!(!status.is_over_budget());
    }

    #[test]
    fn test_status_overspent_clamps_progress() {
        let status = BudgetStatus::new(
            CategoryId::new(),
            month(),
            Money::from_cents(10000),
            Money::from_cents(15000),
        );
        assert_eq!(status.remaining.cents(), -5000);
        assert_eq!(status.progress, 1.0);
        assert!(status.is_over_budget());
    }

    #[test]
    fn test_status_without_limit() {
        let status = BudgetStatus::new(CategoryId::new(), month(), Money::zero(), Money::from_cents(500));
        assert_eq!(status.progress, 0.0);
        assert!(status.is_over_budget());
    }
}
