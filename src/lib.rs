//! Spendwise - a command-line personal finance tracker
//!
//! Transactions are filed into categories by keyword, tracked against
//! monthly budgets, and imported from bank statements (Revolut, Raiffeisen,
//! generic CSV) or an open banking API.
//!
//! # Architecture
//!
//! - `config`: path resolution and user settings
//! - `error`: the crate-wide error type
//! - `models`: transactions, categories, budgets and their value types
//! - `storage`: JSON file repositories behind a `Storage` coordinator
//! - `services`: business rules on top of storage
//! - `import`: statement parsers and the open banking client
//! - `reports`, `display`: aggregation and terminal formatting
//! - `export`, `backup`: CSV/JSON/YAML export and rolling backups
//! - `cli`: clap command handlers used by the binary
//!
//! # Example
//!
//! ```rust,ignore
//! use spendwise::config::paths::SpendwisePaths;
//! use spendwise::services::{ImportOptions, ImportService};
//! use spendwise::storage::Storage;
//!
//! let storage = Storage::open(SpendwisePaths::new()?)?;
//! let (format, result) = ImportService::new(&storage)
//!     .import_file("statement.csv".as_ref(), &ImportOptions::default())?;
//! println!("{}: imported {}", format, result.imported);
//! ```

pub mod backup;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod import;
pub mod models;
pub mod reports;
pub mod services;
pub mod storage;

pub use error::{SpendwiseError, SpendwiseResult};
