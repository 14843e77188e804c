//! Statement import service
//!
//! Runs parsed statement rows through categorization and duplicate
//! detection, shows them as a preview, and stores the new ones.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use tracing::{info, warn};

use crate::error::{SpendwiseError, SpendwiseResult};
use crate::import::open_banking::{self, OpenBankingApi};
use crate::import::{BankFormat, ParsedRow, ParsedTransaction};
use crate::models::{
    category_name, CategoryId, Transaction, TransactionId, TransactionType, DEFAULT_CATEGORY_NAME,
};
use crate::services::{Categorizer, CategoryService};
use crate::storage::Storage;

/// Status of a row in the import preview
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportStatus {
    /// Will be imported
    New,
    /// Already stored, or repeated earlier in the same statement
    Duplicate,
    /// Cannot be imported
    Error(String),
}

/// One row of the import preview
#[derive(Debug, Clone)]
pub struct ImportPreviewEntry {
    pub row_number: usize,
    /// The parsed row, absent when parsing failed
    pub transaction: Option<ParsedTransaction>,
    /// Category the row will be filed under
    pub category_id: Option<CategoryId>,
    pub status: ImportStatus,
    /// Stored transaction with the same import ID
    pub existing_id: Option<TransactionId>,
}

/// Outcome of a completed import
#[derive(Debug, Clone, Default)]
pub struct ImportResult {
    pub imported: usize,
    pub duplicates_skipped: usize,
    pub errors: usize,
    pub imported_ids: Vec<TransactionId>,
    /// Error messages by row number
    pub error_messages: BTreeMap<usize, String>,
    /// Number of imported transactions per category name
    pub by_category: BTreeMap<String, usize>,
}

/// What to import and how
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Skip detection and use this format
    pub format: Option<BankFormat>,
    /// File every row under this category instead of auto-categorizing
    pub category_id: Option<CategoryId>,
}

/// Service for statement and bank imports
pub struct ImportService<'a> {
    storage: &'a Storage,
    default_category: String,
}

impl<'a> ImportService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self::with_default_category(storage, DEFAULT_CATEGORY_NAME)
    }

    pub fn with_default_category(storage: &'a Storage, default_category: &str) -> Self {
        Self {
            storage,
            default_category: default_category.to_string(),
        }
    }

    /// The forced format, or the one detected from the header
    pub fn detect_format(&self, content: &str, forced: Option<BankFormat>) -> SpendwiseResult<BankFormat> {
        if let Some(format) = forced {
            return Ok(format);
        }
        BankFormat::detect_content(content).ok_or_else(|| {
            SpendwiseError::Import(
                "Unrecognized statement format. Use --format revolut, raiffeisen or generic".into(),
            )
        })
    }

    /// Detect the format and parse every row
    pub fn parse_statement(
        &self,
        content: &str,
        forced: Option<BankFormat>,
    ) -> SpendwiseResult<(BankFormat, Vec<ParsedRow>)> {
        let format = self.detect_format(content, forced)?;
        let rows = format.parser().parse(content);
        info!(%format, rows = rows.len(), "parsed statement");
        Ok((format, rows))
    }

    /// Categorize rows and mark duplicates and errors
    pub fn generate_preview(
        &self,
        rows: &[ParsedRow],
        forced_category: Option<CategoryId>,
    ) -> SpendwiseResult<Vec<ImportPreviewEntry>> {
        if let Some(id) = forced_category {
            if self.storage.categories.get_category(id)?.is_none() {
                return Err(SpendwiseError::category_not_found(id.to_string()));
            }
        }

        let default = CategoryService::new(self.storage).ensure_named(&self.default_category)?;
        let categorizer = Categorizer::with_default_name(
            self.storage.categories.get_all_categories()?,
            &self.default_category,
        );

        let existing: HashMap<String, TransactionId> = self
            .storage
            .transactions
            .get_all()?
            .into_iter()
            .filter_map(|t| t.import_id.map(|import_id| (import_id, t.id)))
            .collect();
        let mut seen = HashSet::new();

        let preview = rows
            .iter()
            .map(|row| match row {
                Ok(txn) => {
                    let existing_id = existing.get(&txn.import_id).copied();
                    let status = if existing_id.is_some() || !seen.insert(txn.import_id.clone()) {
                        ImportStatus::Duplicate
                    } else {
                        ImportStatus::New
                    };
                    let category_id = forced_category.unwrap_or_else(|| {
                        categorizer.detect_category_id(
                            &txn.description,
                            TransactionType::from_amount(txn.amount),
                            default.id,
                        )
                    });

                    ImportPreviewEntry {
                        row_number: txn.row_number,
                        transaction: Some(txn.clone()),
                        category_id: Some(category_id),
                        status,
                        existing_id,
                    }
                }
                Err(e) => ImportPreviewEntry {
                    row_number: e.row_number,
                    transaction: None,
                    category_id: None,
                    status: ImportStatus::Error(e.message.clone()),
                    existing_id: None,
                },
            })
            .collect();

        Ok(preview)
    }

    /// Store every `New` row of a preview
    pub fn import_from_preview(&self, preview: &[ImportPreviewEntry]) -> SpendwiseResult<ImportResult> {
        let mut result = ImportResult::default();
        let mut to_store = Vec::new();

        for entry in preview {
            match (&entry.status, &entry.transaction, entry.category_id) {
                (ImportStatus::New, Some(parsed), Some(category_id)) => {
                    let mut txn = Transaction::with_details(
                        parsed.date,
                        parsed.amount,
                        parsed.description.clone(),
                        category_id,
                        parsed.source,
                    );
                    txn.import_id = Some(parsed.import_id.clone());

                    match txn.validate() {
                        Ok(()) => to_store.push(txn),
                        Err(e) => {
                            result.errors += 1;
                            result.error_messages.insert(entry.row_number, e.to_string());
                        }
                    }
                }
                (ImportStatus::Duplicate, _, _) => result.duplicates_skipped += 1,
                (ImportStatus::Error(message), _, _) => {
                    result.errors += 1;
                    result.error_messages.insert(entry.row_number, message.clone());
                }
                (ImportStatus::New, _, _) => {
                    result.errors += 1;
                    result
                        .error_messages
                        .insert(entry.row_number, "Row has no transaction data".into());
                }
            }
        }

        if !to_store.is_empty() {
            let categories = self.storage.categories.get_all_categories()?;
            for txn in &to_store {
                *result
                    .by_category
                    .entry(category_name(&categories, txn.category_id))
                    .or_insert(0) += 1;
            }
            result.imported_ids = to_store.iter().map(|t| t.id).collect();
            result.imported = self.storage.transactions.upsert_batch(to_store)?;
            self.storage.transactions.save()?;
        }

        if result.errors > 0 {
            warn!(errors = result.errors, "some statement rows were not imported");
        }
        info!(
            imported = result.imported,
            duplicates = result.duplicates_skipped,
            errors = result.errors,
            "import finished"
        );
        Ok(result)
    }

    /// Parse, preview and import statement content in one go
    pub fn import_statement(
        &self,
        content: &str,
        options: &ImportOptions,
    ) -> SpendwiseResult<(BankFormat, ImportResult)> {
        let (format, rows) = self.parse_statement(content, options.format)?;
        let preview = self.generate_preview(&rows, options.category_id)?;
        Ok((format, self.import_from_preview(&preview)?))
    }

    /// Read a statement file from disk
    pub fn read_statement(path: &Path) -> SpendwiseResult<String> {
        let bytes = std::fs::read(path).map_err(|e| {
            SpendwiseError::Import(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    pub fn import_file(
        &self,
        path: &Path,
        options: &ImportOptions,
    ) -> SpendwiseResult<(BankFormat, ImportResult)> {
        let content = Self::read_statement(path)?;
        self.import_statement(&content, options)
    }

    /// Preview the booked transactions of a bank account
    pub fn preview_open_banking(
        &self,
        api: &dyn OpenBankingApi,
        iban: Option<&str>,
    ) -> SpendwiseResult<(open_banking::Account, Vec<ImportPreviewEntry>)> {
        let (account, rows) = open_banking::fetch_transactions(api, iban)?;
        info!(iban = %account.iban, rows = rows.len(), "fetched bank transactions");
        let preview = self.generate_preview(&rows, None)?;
        Ok((account, preview))
    }

    /// Pull booked transactions from a bank account and import the new ones
    pub fn sync_open_banking(
        &self,
        api: &dyn OpenBankingApi,
        iban: Option<&str>,
    ) -> SpendwiseResult<ImportResult> {
        let (_, preview) = self.preview_open_banking(api, iban)?;
        self.import_from_preview(&preview)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::SpendwisePaths;
    use crate::import::open_banking::{AccountsResponse, TransactionsResponse};
    use crate::models::{Category, Money, TransactionSource};
    use tempfile::TempDir;

    const REVOLUT: &str = "Type,Product,Started Date,Completed Date,Description,Amount,Fee,Currency,State,Balance\n\
        CARD_PAYMENT,Current,2025-02-01 10:00:00,2025-02-01 10:00:05,Coop Pronto,-15.20,0,CHF,COMPLETED,100\n\
        CARD_PAYMENT,Current,2025-02-02 10:00:00,2025-02-02 10:00:05,Kino Rex,-18.00,0,CHF,COMPLETED,82\n\
        TOPUP,Current,2025-02-03 10:00:00,2025-02-03 10:00:05,Salary,2500.00,0,CHF,COMPLETED,2582\n\
        CARD_PAYMENT,Current,2025-02-04 10:00:00,,Pending,-1.00,0,CHF,PENDING,2581\n";

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = SpendwisePaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths).unwrap();

        let mut groceries = Category::with_keywords("Groceries", ["coop", "migros"]);
        groceries.sort_order = 0;
        storage.categories.upsert(groceries).unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        let (_temp, storage) = create_test_storage();
        let service = ImportService::new(&storage);

        let err = service.detect_format("Date,Payee,Amount\n", None).unwrap_err();
        assert!(matches!(err, SpendwiseError::Import(_)));
        assert_eq!(
            service.detect_format("Date,Payee,Amount\n", Some(BankFormat::Generic)).unwrap(),
            BankFormat::Generic
        );
    }

    #[test]
    fn test_import_statement() {
        let (_temp, storage) = create_test_storage();
        let service = ImportService::new(&storage);

        let (format, result) = service
            .import_statement(REVOLUT, &ImportOptions::default())
            .unwrap();

        assert_eq!(format, BankFormat::Revolut);
        assert_eq!(result.imported, 3);
        assert_eq!(result.errors, 1);
        assert!(result.error_messages.contains_key(&5));
        assert_eq!(result.by_category["Groceries"], 1);
        assert_eq!(result.by_category[DEFAULT_CATEGORY_NAME], 2);

        let stored = storage.transactions.get_all().unwrap();
        assert_eq!(stored.len(), 3);
        assert!(stored.iter().all(|t| t.source == TransactionSource::Revolut));
        assert!(stored.iter().all(|t| t.import_id.is_some()));
    }

    #[test]
    fn test_reimport_skips_duplicates() {
        let (_temp, storage) = create_test_storage();
        let service = ImportService::new(&storage);

        service.import_statement(REVOLUT, &ImportOptions::default()).unwrap();
        let (_, second) = service
            .import_statement(REVOLUT, &ImportOptions::default())
            .unwrap();

        assert_eq!(second.imported, 0);
        assert_eq!(second.duplicates_skipped, 3);
        assert_eq!(storage.transactions.count().unwrap(), 3);
    }

    #[test]
    fn test_repeated_row_within_file_is_duplicate() {
        let (_temp, storage) = create_test_storage();
        let service = ImportService::new(&storage);

        let line = "CARD_PAYMENT,Current,2025-02-01 10:00:00,2025-02-01 10:00:05,Coop,-5.00,0,CHF,COMPLETED,0";
        let content = format!("Type,Product,Started,Completed,Description,Amount\n{}\n{}\n", line, line);
        let (_, rows) = service.parse_statement(&content, None).unwrap();
        let preview = service.generate_preview(&rows, None).unwrap();

        assert_eq!(preview[0].status, ImportStatus::New);
        assert_eq!(preview[1].status, ImportStatus::Duplicate);
        assert_eq!(preview[1].existing_id, None);
    }

    #[test]
    fn test_preview_marks_stored_duplicate_with_existing_id() {
        let (_temp, storage) = create_test_storage();
        let service = ImportService::new(&storage);

        let (_, result) = service.import_statement(REVOLUT, &ImportOptions::default()).unwrap();
        let (_, rows) = service.parse_statement(REVOLUT, None).unwrap();
        let preview = service.generate_preview(&rows, None).unwrap();

        assert_eq!(preview[0].status, ImportStatus::Duplicate);
        assert!(result.imported_ids.contains(&preview[0].existing_id.unwrap()));
    }

    #[test]
    fn test_forced_category() {
        let (_temp, storage) = create_test_storage();
        let travel = CategoryService::new(&storage).create("Travel", &[], None).unwrap();
        let service = ImportService::new(&storage);

        let options = ImportOptions {
            format: None,
            category_id: Some(travel.id),
        };
        let (_, result) = service.import_statement(REVOLUT, &options).unwrap();
        assert_eq!(result.by_category["Travel"], 3);

        let missing = ImportOptions {
            format: None,
            category_id: Some(CategoryId::new()),
        };
        assert!(service.import_statement(REVOLUT, &missing).unwrap_err().is_not_found());
    }

    #[test]
    fn test_income_goes_to_default_category() {
        let (_temp, storage) = create_test_storage();
        let service = ImportService::new(&storage);
        let content = "Type,Product,Started,Completed,Description,Amount\n\
            REFUND,Current,2025-02-01 10:00:00,2025-02-01 10:00:05,Coop refund,5.00\n";

        let (_, rows) = service.parse_statement(content, None).unwrap();
        let preview = service.generate_preview(&rows, None).unwrap();
        let default = storage.categories.get_by_name(DEFAULT_CATEGORY_NAME).unwrap().unwrap();
        assert_eq!(preview[0].category_id, Some(default.id));
    }

    #[test]
    fn test_zero_amount_row_is_error() {
        let (_temp, storage) = create_test_storage();
        let service = ImportService::new(&storage);
        let content = "Type,Product,Started,Completed,Description,Amount\n\
            CARD_CHECK,Current,2025-02-01 10:00:00,2025-02-01 10:00:05,Card check,0.00\n";

        let (_, result) = service.import_statement(content, &ImportOptions::default()).unwrap();
        assert_eq!(result.imported, 0);
        assert_eq!(result.errors, 1);
    }

    struct MockApi;

    impl OpenBankingApi for MockApi {
        fn get_accounts(&self) -> SpendwiseResult<AccountsResponse> {
            Ok(serde_json::from_str(
                r#"{"accounts":[{"iban":"CH93","currency":"CHF",
                    "_links":{"transactions":{"href":"/v1/accounts/1/transactions"}}}]}"#,
            )?)
        }

        fn get_transactions(&self, _href: &str) -> SpendwiseResult<TransactionsResponse> {
            Ok(serde_json::from_str(
                r#"{"transactions":{"booked":[
                    {"transactionId":"a1","bookingDate":"2025-03-01",
                     "transactionAmount":{"amount":"-20.00","currency":"CHF"},
                     "creditorName":"Migros"},
                    {"transactionId":"a2","bookingDate":"2025-03-02",
                     "transactionAmount":{"amount":"100.00","currency":"CHF"}}
                ]}}"#,
            )?)
        }
    }

    #[test]
    fn test_sync_open_banking() {
        let (_temp, storage) = create_test_storage();
        let service = ImportService::new(&storage);

        let result = service.sync_open_banking(&MockApi, None).unwrap();
        assert_eq!(result.imported, 2);
        assert_eq!(result.by_category["Groceries"], 1);

        let stored = storage
            .transactions
            .find_by_import_id("nextgen-a1")
            .unwrap()
            .unwrap();
        assert_eq!(stored.amount, Money::from_cents(-2000));
        assert_eq!(stored.source, TransactionSource::OpenBanking);

        let again = service.sync_open_banking(&MockApi, None).unwrap();
        assert_eq!(again.imported, 0);
        assert_eq!(again.duplicates_skipped, 2);
    }
}
