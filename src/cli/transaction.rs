//! Transaction CLI commands

use chrono::Local;
use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::{format_transaction_details, format_transaction_table};
use crate::error::SpendwiseResult;
use crate::models::{category_name, TransactionType};
use crate::services::{
    CategoryService, CreateTransactionInput, PeriodService, TransactionFilter,
    TransactionService, TransactionUpdate,
};
use crate::storage::Storage;

use super::{parse_amount, parse_date};

/// Transaction subcommands
#[derive(Subcommand)]
pub enum TransactionCommands {
    /// Record a transaction
    Add {
        /// Amount, negative for expenses (e.g. "-12.50" or "-12,50")
        #[arg(allow_hyphen_values = true)]
        amount: String,
        /// Description, also used for auto-categorization
        description: String,
        /// Date (YYYY-MM-DD, "today", "yesterday"), defaults to today
        #[arg(short, long)]
        date: Option<String>,
        /// Category name or ID; detected from the description when omitted
        #[arg(short, long)]
        category: Option<String>,
        /// Force income or expense regardless of the amount's sign
        #[arg(short = 't', long = "type")]
        kind: Option<TransactionType>,
    },

    /// List transactions, newest first
    List {
        /// Month ("2025-01", "January", "last", ...)
        #[arg(short, long)]
        month: Option<String>,
        /// Category name or ID
        #[arg(short, long)]
        category: Option<String>,
        /// Only income or only expenses
        #[arg(short = 't', long = "type")]
        kind: Option<TransactionType>,
        /// Maximum number of rows
        #[arg(short, long, default_value = "50")]
        limit: usize,
    },

    /// Show transaction details
    Show {
        /// Transaction ID or unique prefix
        id: String,
    },

    /// Edit a transaction
    Edit {
        /// Transaction ID or unique prefix
        id: String,
        #[arg(short, long, allow_hyphen_values = true)]
        amount: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(short, long)]
        date: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short = 't', long = "type")]
        kind: Option<TransactionType>,
    },

    /// Move a transaction to another category
    Categorize {
        /// Transaction ID or unique prefix
        id: String,
        /// Category name or ID
        category: String,
    },

    /// Delete a transaction
    Delete {
        /// Transaction ID or unique prefix
        id: String,
    },

    /// Delete the most recently entered transaction
    #[command(name = "delete-last")]
    DeleteLast,

    /// Delete every transaction
    #[command(name = "delete-all")]
    DeleteAll {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

/// Handle a transaction command
pub fn handle_transaction_command(
    storage: &Storage,
    settings: &Settings,
    cmd: TransactionCommands,
) -> SpendwiseResult<()> {
    let service = TransactionService::with_default_category(storage, &settings.default_category);
    let category_service = CategoryService::new(storage);
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        TransactionCommands::Add {
            amount,
            description,
            date,
            category,
            kind,
        } => {
            let date = match date {
                Some(d) => parse_date(&d, &settings.date_format)?,
                None => Local::now().date_naive(),
            };
            let category_id = match category {
                Some(c) => Some(category_service.require(&c)?.id),
                None => None,
            };

            let txn = service.create(CreateTransactionInput {
                date,
                amount: parse_amount(&amount)?,
                description,
                category_id,
                kind,
            })?;

            let category = category_name(&category_service.list()?, txn.category_id);
            println!("Added {}: {} {}", txn.kind(), txn.amount.format_with_symbol(symbol), txn.description);
            println!("  Category: {}", category);
            println!("  ID: {}", txn.id);
        }

        TransactionCommands::List {
            month,
            category,
            kind,
            limit,
        } => {
            let mut filter = TransactionFilter::new().limit(limit);
            if let Some(m) = month {
                filter = filter.month(PeriodService::new().parse(&m)?);
            }
            if let Some(c) = category {
                filter = filter.category(category_service.require(&c)?.id);
            }
            if let Some(k) = kind {
                filter = filter.kind(k);
            }

            let transactions = service.list(filter)?;
            print!(
                "{}",
                format_transaction_table(&transactions, &category_service.list()?, symbol)
            );
        }

        TransactionCommands::Show { id } => {
            let txn = service.require(&id)?;
            let category = category_name(&category_service.list()?, txn.category_id);
            print!("{}", format_transaction_details(&txn, &category, symbol));
        }

        TransactionCommands::Edit {
            id,
            amount,
            description,
            date,
            category,
            kind,
        } => {
            let txn = service.require(&id)?;

            if amount.is_none()
                && description.is_none()
                && date.is_none()
                && category.is_none()
                && kind.is_none()
            {
                println!("No changes specified. Use --amount, --description, --date, --category or --type.");
                return Ok(());
            }

            let update = TransactionUpdate {
                date: date
                    .map(|d| parse_date(&d, &settings.date_format))
                    .transpose()?,
                amount: amount.map(|a| parse_amount(&a)).transpose()?,
                description,
                category_id: category
                    .map(|c| category_service.require(&c).map(|cat| cat.id))
                    .transpose()?,
                kind,
            };

            let updated = service.update(txn.id, update)?;
            println!("Updated transaction {}", updated.id);
        }

        TransactionCommands::Categorize { id, category } => {
            let txn = service.require(&id)?;
            let category = category_service.require(&category)?;
            service.update_category(txn.id, category.id)?;
            println!("Moved '{}' to {}", txn.description, category.name);
        }

        TransactionCommands::Delete { id } => {
            let txn = service.require(&id)?;
            service.delete(txn.id)?;
            println!("Deleted transaction: {}", txn);
        }

        TransactionCommands::DeleteLast => match service.delete_last()? {
            Some(txn) => println!("Deleted transaction: {}", txn),
            None => println!("No transactions to delete."),
        },

        TransactionCommands::DeleteAll { yes } => {
            if !yes {
                let count = service.count()?;
                println!("WARNING: This will delete all {} transaction(s)!", count);
                println!("To proceed, run again with --yes:");
                println!("  spendwise transaction delete-all --yes");
                return Ok(());
            }

            let count = service.delete_all()?;
            println!("Deleted {} transaction(s).", count);
        }
    }

    Ok(())
}
