//! Transaction repository backed by `transactions.json`
//!
//! Keeps an in-memory map plus a category index so per-category queries and
//! the "is this category still used" check don't scan every transaction.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use chrono::NaiveDate;

use crate::error::SpendwiseError;
use crate::models::{BudgetMonth, CategoryId, Money, Transaction, TransactionId};

use super::file_io::{read_json, write_json_atomic};
use super::{read_guard, write_guard};

/// On-disk layout of `transactions.json`
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct TransactionData {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

/// Newest first: by date, then by creation time
fn newest_first(a: &Transaction, b: &Transaction) -> std::cmp::Ordering {
    b.date
        .cmp(&a.date)
        .then(b.created_at.cmp(&a.created_at))
}

pub struct TransactionRepository {
    path: PathBuf,
    data: RwLock<HashMap<TransactionId, Transaction>>,
    /// category_id -> transaction_ids
    by_category: RwLock<HashMap<CategoryId, Vec<TransactionId>>>,
}

impl TransactionRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
            by_category: RwLock::new(HashMap::new()),
        }
    }

    /// Load transactions from disk and rebuild the category index
    pub fn load(&self) -> Result<(), SpendwiseError> {
        let file_data: TransactionData = read_json(&self.path)?;

        let mut data = write_guard(&self.data)?;
        let mut by_category = write_guard(&self.by_category)?;
        data.clear();
        by_category.clear();

        for txn in file_data.transactions {
            by_category.entry(txn.category_id).or_default().push(txn.id);
            data.insert(txn.id, txn);
        }

        Ok(())
    }

    pub fn save(&self) -> Result<(), SpendwiseError> {
        let data = read_guard(&self.data)?;

        let mut transactions: Vec<_> = data.values().cloned().collect();
        transactions.sort_by(newest_first);

        write_json_atomic(&self.path, &TransactionData { transactions })
    }

    pub fn get(&self, id: TransactionId) -> Result<Option<Transaction>, SpendwiseError> {
        Ok(read_guard(&self.data)?.get(&id).cloned())
    }

    /// All transactions, newest first
    pub fn get_all(&self) -> Result<Vec<Transaction>, SpendwiseError> {
        let mut transactions: Vec<_> = read_guard(&self.data)?.values().cloned().collect();
        transactions.sort_by(newest_first);
        Ok(transactions)
    }

    pub fn get_by_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<Transaction>, SpendwiseError> {
        let data = read_guard(&self.data)?;
        let by_category = read_guard(&self.by_category)?;

        let mut transactions: Vec<_> = by_category
            .get(&category_id)
            .map(|ids| ids.iter().filter_map(|id| data.get(id).cloned()).collect())
            .unwrap_or_default();
        transactions.sort_by(newest_first);
        Ok(transactions)
    }

    /// Transactions between `start` and `end`, both inclusive
    pub fn get_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Transaction>, SpendwiseError> {
        let mut transactions: Vec<_> = read_guard(&self.data)?
            .values()
            .filter(|t| t.date >= start && t.date <= end)
            .cloned()
            .collect();
        transactions.sort_by(newest_first);
        Ok(transactions)
    }

    pub fn get_by_month(&self, month: BudgetMonth) -> Result<Vec<Transaction>, SpendwiseError> {
        self.get_by_date_range(month.start_date(), month.end_date())
    }

    /// The transaction that was entered most recently
    pub fn get_last_created(&self) -> Result<Option<Transaction>, SpendwiseError> {
        Ok(read_guard(&self.data)?
            .values()
            .max_by_key(|t| t.created_at)
            .cloned())
    }

    pub fn find_by_import_id(
        &self,
        import_id: &str,
    ) -> Result<Option<Transaction>, SpendwiseError> {
        Ok(read_guard(&self.data)?
            .values()
            .find(|t| t.import_id.as_deref() == Some(import_id))
            .cloned())
    }

    /// Insert or replace a transaction
    pub fn upsert(&self, txn: Transaction) -> Result<(), SpendwiseError> {
        let mut data = write_guard(&self.data)?;
        let mut by_category = write_guard(&self.by_category)?;
        Self::insert_indexed(&mut data, &mut by_category, txn);
        Ok(())
    }

    /// Insert many transactions under a single lock
    pub fn upsert_batch(&self, txns: Vec<Transaction>) -> Result<usize, SpendwiseError> {
        let mut data = write_guard(&self.data)?;
        let mut by_category = write_guard(&self.by_category)?;
        let count = txns.len();
        for txn in txns {
            Self::insert_indexed(&mut data, &mut by_category, txn);
        }
        Ok(count)
    }

    fn insert_indexed(
        data: &mut HashMap<TransactionId, Transaction>,
        by_category: &mut HashMap<CategoryId, Vec<TransactionId>>,
        txn: Transaction,
    ) {
        if let Some(old) = data.get(&txn.id) {
            if let Some(ids) = by_category.get_mut(&old.category_id) {
                ids.retain(|&id| id != txn.id);
            }
        }
        by_category.entry(txn.category_id).or_default().push(txn.id);
        data.insert(txn.id, txn);
    }

    pub fn delete(&self, id: TransactionId) -> Result<bool, SpendwiseError> {
        let mut data = write_guard(&self.data)?;
        let mut by_category = write_guard(&self.by_category)?;

        match data.remove(&id) {
            Some(txn) => {
                if let Some(ids) = by_category.get_mut(&txn.category_id) {
                    ids.retain(|&tid| tid != id);
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Remove every transaction, returning how many were removed
    pub fn delete_all(&self) -> Result<usize, SpendwiseError> {
        let mut data = write_guard(&self.data)?;
        let mut by_category = write_guard(&self.by_category)?;
        let count = data.len();
        data.clear();
        by_category.clear();
        Ok(count)
    }

    /// Move every transaction in `from` to `to`, returning how many moved
    pub fn reassign_category(
        &self,
        from: CategoryId,
        to: CategoryId,
    ) -> Result<usize, SpendwiseError> {
        let mut data = write_guard(&self.data)?;
        let mut by_category = write_guard(&self.by_category)?;

        let ids = by_category.remove(&from).unwrap_or_default();
        for id in &ids {
            if let Some(txn) = data.get_mut(id) {
                txn.set_category(to);
            }
        }
        let moved = ids.len();
        by_category.entry(to).or_default().extend(ids);
        Ok(moved)
    }

    pub fn count(&self) -> Result<usize, SpendwiseError> {
        Ok(read_guard(&self.data)?.len())
    }

    pub fn count_for_category(&self, category_id: CategoryId) -> Result<usize, SpendwiseError> {
        Ok(read_guard(&self.by_category)?
            .get(&category_id)
            .map(Vec::len)
            .unwrap_or(0))
    }

    /// Sum of positive amounts, optionally restricted to one month
    pub fn total_income(&self, month: Option<BudgetMonth>) -> Result<Money, SpendwiseError> {
        self.sum_where(|t| t.amount.is_positive() && month.map_or(true, |m| m.contains(t.date)))
    }

    /// Sum of negative amounts (a negative number), optionally within a month
    pub fn total_expenses(&self, month: Option<BudgetMonth>) -> Result<Money, SpendwiseError> {
        self.sum_where(|t| t.amount.is_negative() && month.map_or(true, |m| m.contains(t.date)))
    }

    /// Sum of a category's negative amounts (a negative number)
    pub fn spent_for_category(
        &self,
        category_id: CategoryId,
        month: Option<BudgetMonth>,
    ) -> Result<Money, SpendwiseError> {
        let data = read_guard(&self.data)?;
        let by_category = read_guard(&self.by_category)?;

        Ok(by_category
            .get(&category_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| data.get(id))
                    .filter(|t| t.amount.is_negative())
                    .filter(|t| month.map_or(true, |m| m.contains(t.date)))
                    .map(|t| t.amount)
                    .sum()
            })
            .unwrap_or_default())
    }

    fn sum_where<F>(&self, keep: F) -> Result<Money, SpendwiseError>
    where
        F: Fn(&Transaction) -> bool,
    {
        Ok(read_guard(&self.data)?
            .values()
            .filter(|t| keep(t))
            .map(|t| t.amount)
            .sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionSource;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, TransactionRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = TransactionRepository::new(temp_dir.path().join("transactions.json"));
        repo.load().unwrap();
        (temp_dir, repo)
    }

    fn txn(day: u32, cents: i64, category: CategoryId) -> Transaction {
        Transaction::with_details(
            NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
            Money::from_cents(cents),
            format!("txn {}", day),
            category,
            TransactionSource::Manual,
        )
    }

    #[test]
    fn test_empty_load() {
        let (_temp_dir, repo) = create_test_repo();
        assert_eq!(repo.count().unwrap(), 0);
        assert!(repo.get_last_created().unwrap().is_none());
    }

    #[test]
    fn test_load_object_without_list() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("transactions.json");
        std::fs::write(&path, "{}").unwrap();

        let repo = TransactionRepository::new(path);
        repo.load().unwrap();
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_get_all_newest_first() {
        let (_temp_dir, repo) = create_test_repo();
        let cat = CategoryId::new();
        repo.upsert(txn(3, -100, cat)).unwrap();
        repo.upsert(txn(20, -200, cat)).unwrap();
        repo.upsert(txn(10, -300, cat)).unwrap();

        let days: Vec<u32> = repo
            .get_all()
            .unwrap()
            .iter()
            .map(|t| chrono::Datelike::day(&t.date))
            .collect();
        assert_eq!(days, vec![20, 10, 3]);
    }

    #[test]
    fn test_category_index_follows_updates() {
        let (_temp_dir, repo) = create_test_repo();
        let groceries = CategoryId::new();
        let dining = CategoryId::new();

        let mut t = txn(5, -1000, groceries);
        repo.upsert(t.clone()).unwrap();
        assert_eq!(repo.count_for_category(groceries).unwrap(), 1);

        t.set_category(dining);
        repo.upsert(t).unwrap();
        assert_eq!(repo.count_for_category(groceries).unwrap(), 0);
        assert_eq!(repo.get_by_category(dining).unwrap().len(), 1);
    }

    #[test]
    fn test_reassign_and_delete_all() {
        let (_temp_dir, repo) = create_test_repo();
        let from = CategoryId::new();
        let to = CategoryId::new();
        repo.upsert_batch(vec![txn(1, -100, from), txn(2, -200, from), txn(3, -300, to)])
            .unwrap();

        assert_eq!(repo.reassign_category(from, to).unwrap(), 2);
        assert_eq!(repo.count_for_category(from).unwrap(), 0);
        assert_eq!(repo.count_for_category(to).unwrap(), 3);

        assert_eq!(repo.delete_all().unwrap(), 3);
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_totals_and_spent() {
        let (_temp_dir, repo) = create_test_repo();
        let groceries = CategoryId::new();
        let salary = CategoryId::new();
        repo.upsert(txn(2, -4500, groceries)).unwrap();
        repo.upsert(txn(9, -1500, groceries)).unwrap();
        repo.upsert(txn(9, 300, groceries)).unwrap();
        repo.upsert(txn(25, 500000, salary)).unwrap();

        let mut february = txn(1, -999, groceries);
        february.date = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        repo.upsert(february).unwrap();

        let january = BudgetMonth::new(2025, 1).unwrap();
        assert_eq!(repo.total_income(Some(january)).unwrap().cents(), 500300);
        assert_eq!(repo.total_expenses(Some(january)).unwrap().cents(), -6000);
        assert_eq!(repo.total_expenses(None).unwrap().cents(), -6999);
        assert_eq!(
            repo.spent_for_category(groceries, Some(january)).unwrap().cents(),
            -6000
        );
        assert_eq!(repo.spent_for_category(salary, None).unwrap().cents(), 0);
        assert_eq!(repo.get_by_month(january).unwrap().len(), 4);
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        let mut t = txn(15, -5000, CategoryId::new());
        t.import_id = Some("nextgen-42".into());
        let id = t.id;
        repo.upsert(t).unwrap();
        repo.save().unwrap();

        let repo2 = TransactionRepository::new(temp_dir.path().join("transactions.json"));
        repo2.load().unwrap();
        assert_eq!(repo2.get(id).unwrap().unwrap().amount.cents(), -5000);
        assert!(repo2.find_by_import_id("nextgen-42").unwrap().is_some());
        assert!(repo2.delete(id).unwrap());
        assert!(!repo2.delete(id).unwrap());
    }
}
