//! Transaction service
//!
//! CRUD for transactions. New transactions without an explicit category are
//! run through the keyword categorizer; the kind (income/expense) always
//! follows the amount's sign.

use chrono::{NaiveDate, Utc};
use tracing::info;

use crate::error::{SpendwiseError, SpendwiseResult};
use crate::models::{
    BudgetMonth, CategoryId, Money, Transaction, TransactionId, TransactionSource,
    TransactionType, DEFAULT_CATEGORY_NAME,
};
use crate::storage::Storage;

use super::categorizer::Categorizer;
use super::category::CategoryService;

pub struct TransactionService<'a> {
    storage: &'a Storage,
    default_category: String,
}

/// Options for filtering transactions
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub category_id: Option<CategoryId>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub kind: Option<TransactionType>,
    pub limit: Option<usize>,
}

impl TransactionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    /// Restrict to one calendar month
    pub fn month(self, month: BudgetMonth) -> Self {
        self.date_range(month.start_date(), month.end_date())
    }

    pub fn kind(mut self, kind: TransactionType) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Input for creating a new transaction
#[derive(Debug, Clone)]
pub struct CreateTransactionInput {
    pub date: NaiveDate,
    pub amount: Money,
    pub description: String,
    /// Explicit category; auto-detected from the description when `None`
    pub category_id: Option<CategoryId>,
    /// Forces the sign of `amount` when set
    pub kind: Option<TransactionType>,
}

/// Fields to change on an existing transaction
#[derive(Debug, Clone, Default)]
pub struct TransactionUpdate {
    pub date: Option<NaiveDate>,
    pub amount: Option<Money>,
    pub description: Option<String>,
    pub category_id: Option<CategoryId>,
    pub kind: Option<TransactionType>,
}

/// Income and expense sums over some set of transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub income: Money,
    /// Negative sum of expenses
    pub expenses: Money,
}

impl Totals {
    pub fn net(&self) -> Money {
        self.income + self.expenses
    }
}

impl<'a> TransactionService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self::with_default_category(storage, DEFAULT_CATEGORY_NAME)
    }

    /// Use a different catch-all category for unmatched transactions
    pub fn with_default_category(storage: &'a Storage, default_category: &str) -> Self {
        Self {
            storage,
            default_category: default_category.to_string(),
        }
    }

    pub fn create(&self, input: CreateTransactionInput) -> SpendwiseResult<Transaction> {
        let amount = match input.kind {
            Some(kind) => kind.apply_sign(input.amount),
            None => input.amount,
        };

        let category_id = match input.category_id {
            Some(cat_id) => {
                self.require_category(cat_id)?;
                cat_id
            }
            None => self.detect_category(&input.description, amount)?,
        };

        let txn = Transaction::with_details(
            input.date,
            amount,
            input.description.trim(),
            category_id,
            TransactionSource::Manual,
        );

        txn.validate()
            .map_err(|e| SpendwiseError::Validation(e.to_string()))?;

        self.storage.transactions.upsert(txn.clone())?;
        self.storage.transactions.save()?;

        info!(id = %txn.id, amount = %txn.amount, "created transaction");
        Ok(txn)
    }

    fn require_category(&self, id: CategoryId) -> SpendwiseResult<()> {
        self.storage
            .categories
            .get_category(id)?
            .map(|_| ())
            .ok_or_else(|| SpendwiseError::category_not_found(id.to_string()))
    }

    fn detect_category(&self, description: &str, amount: Money) -> SpendwiseResult<CategoryId> {
        let default = CategoryService::new(self.storage).ensure_named(&self.default_category)?;
        let categorizer = Categorizer::with_default_name(
            self.storage.categories.get_all_categories()?,
            &self.default_category,
        );
        Ok(categorizer.detect_category_id(
            description,
            TransactionType::from_amount(amount),
            default.id,
        ))
    }

    pub fn get(&self, id: TransactionId) -> SpendwiseResult<Option<Transaction>> {
        self.storage.transactions.get(id)
    }

    /// Find a transaction by full ID or a unique ID prefix (`txn-1a2b`)
    pub fn find(&self, identifier: &str) -> SpendwiseResult<Option<Transaction>> {
        if let Ok(id) = identifier.parse::<TransactionId>() {
            return self.storage.transactions.get(id);
        }

        let matches: Vec<_> = self
            .storage
            .transactions
            .get_all()?
            .into_iter()
            .filter(|t| t.id.matches_prefix(identifier))
            .collect();
        Ok(if matches.len() == 1 {
            matches.into_iter().next()
        } else {
            None
        })
    }

    pub fn require(&self, identifier: &str) -> SpendwiseResult<Transaction> {
        self.find(identifier)?
            .ok_or_else(|| SpendwiseError::transaction_not_found(identifier))
    }

    /// List transactions, newest first
    pub fn list(&self, filter: TransactionFilter) -> SpendwiseResult<Vec<Transaction>> {
        let mut transactions = if let Some(category_id) = filter.category_id {
            self.storage.transactions.get_by_category(category_id)?
        } else if let (Some(start), Some(end)) = (filter.start_date, filter.end_date) {
            self.storage.transactions.get_by_date_range(start, end)?
        } else {
            self.storage.transactions.get_all()?
        };

        if let Some(start) = filter.start_date {
            transactions.retain(|t| t.date >= start);
        }
        if let Some(end) = filter.end_date {
            transactions.retain(|t| t.date <= end);
        }
        if let Some(kind) = filter.kind {
            transactions.retain(|t| t.kind() == kind);
        }
        if let Some(limit) = filter.limit {
            transactions.truncate(limit);
        }

        Ok(transactions)
    }

    pub fn update(&self, id: TransactionId, update: TransactionUpdate) -> SpendwiseResult<Transaction> {
        let mut txn = self
            .storage
            .transactions
            .get(id)?
            .ok_or_else(|| SpendwiseError::transaction_not_found(id.to_string()))?;

        if let Some(date) = update.date {
            txn.date = date;
        }
        if let Some(amount) = update.amount {
            txn.amount = amount;
        }
        if let Some(kind) = update.kind {
            txn.amount = kind.apply_sign(txn.amount);
        }
        if let Some(description) = update.description {
            txn.description = description.trim().to_string();
        }
        if let Some(category_id) = update.category_id {
            self.require_category(category_id)?;
            txn.category_id = category_id;
        }
        txn.updated_at = Utc::now();

        txn.validate()
            .map_err(|e| SpendwiseError::Validation(e.to_string()))?;

        self.storage.transactions.upsert(txn.clone())?;
        self.storage.transactions.save()?;

        info!(id = %txn.id, "updated transaction");
        Ok(txn)
    }

    pub fn update_category(
        &self,
        id: TransactionId,
        category_id: CategoryId,
    ) -> SpendwiseResult<Transaction> {
        self.update(
            id,
            TransactionUpdate {
                category_id: Some(category_id),
                ..Default::default()
            },
        )
    }

    pub fn delete(&self, id: TransactionId) -> SpendwiseResult<Transaction> {
        let txn = self
            .storage
            .transactions
            .get(id)?
            .ok_or_else(|| SpendwiseError::transaction_not_found(id.to_string()))?;

        self.storage.transactions.delete(id)?;
        self.storage.transactions.save()?;

        info!(id = %txn.id, "deleted transaction");
        Ok(txn)
    }

    /// Delete the most recently entered transaction, if any
    pub fn delete_last(&self) -> SpendwiseResult<Option<Transaction>> {
        match self.storage.transactions.get_last_created()? {
            Some(txn) => self.delete(txn.id).map(Some),
            None => Ok(None),
        }
    }

    /// Delete every transaction, returning how many were removed
    pub fn delete_all(&self) -> SpendwiseResult<usize> {
        let count = self.storage.transactions.delete_all()?;
        self.storage.transactions.save()?;
        info!(count, "deleted all transactions");
        Ok(count)
    }

    /// Income and expense totals, over everything or a single month
    pub fn totals(&self, month: Option<BudgetMonth>) -> SpendwiseResult<Totals> {
        Ok(Totals {
            income: self.storage.transactions.total_income(month)?,
            expenses: self.storage.transactions.total_expenses(month)?,
        })
    }

    pub fn count(&self) -> SpendwiseResult<usize> {
        self.storage.transactions.count()
    }
}
