//! Import CLI commands
//!
//! Both bank statement files and the open banking API go through the same
//! preview step, so `--dry-run` shows exactly what an import would do.

use std::path::PathBuf;

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::{format_import_preview, format_import_result};
use crate::error::SpendwiseResult;
use crate::import::open_banking::HttpOpenBankingClient;
use crate::import::BankFormat;
use crate::services::{CategoryService, ImportPreviewEntry, ImportService};
use crate::storage::Storage;

/// Import subcommands
#[derive(Subcommand)]
pub enum ImportCommands {
    /// Import a bank statement CSV file
    Csv {
        /// Path to the statement
        file: PathBuf,
        /// Statement format (revolut, raiffeisen, generic); detected when omitted
        #[arg(short, long)]
        format: Option<BankFormat>,
        /// File every imported transaction under this category
        #[arg(short, long)]
        category: Option<String>,
        /// Show the preview without importing
        #[arg(long)]
        dry_run: bool,
    },

    /// Fetch booked transactions from the open banking API
    Bank {
        /// Account IBAN; the first account is used when omitted
        #[arg(long)]
        iban: Option<String>,
        /// API base URL, overriding the configured one
        #[arg(long, env = "SPENDWISE_BANK_URL")]
        url: Option<String>,
        /// Show the preview without importing
        #[arg(long)]
        dry_run: bool,
    },
}

/// Handle an import command
pub fn handle_import_command(
    storage: &Storage,
    settings: &Settings,
    cmd: ImportCommands,
) -> SpendwiseResult<()> {
    let service = ImportService::with_default_category(storage, &settings.default_category);

    match cmd {
        ImportCommands::Csv {
            file,
            format,
            category,
            dry_run,
        } => {
            let category_id = match category {
                Some(c) => Some(CategoryService::new(storage).require(&c)?.id),
                None => None,
            };

            let content = ImportService::read_statement(&file)?;
            let (format, rows) = service.parse_statement(&content, format)?;
            println!("Importing {} ({})", file.display(), format);

            if rows.is_empty() {
                println!("No transactions found in the statement.");
                return Ok(());
            }

            let preview = service.generate_preview(&rows, category_id)?;
            finish_import(storage, settings, &service, &preview, dry_run)
        }

        ImportCommands::Bank { iban, url, dry_run } => {
            let mut bank_settings = settings.open_banking.clone();
            if let Some(url) = url {
                bank_settings.base_url = url;
            }
            let client = HttpOpenBankingClient::from_settings(&bank_settings);

            let (account, preview) = service.preview_open_banking(&client, iban.as_deref())?;
            match &account.name {
                Some(name) => println!("Account: {} {} ({})", name, account.iban, account.currency),
                None => println!("Account: {} ({})", account.iban, account.currency),
            }

            if preview.is_empty() {
                println!("No booked transactions.");
                return Ok(());
            }

            finish_import(storage, settings, &service, &preview, dry_run)
        }
    }
}

fn finish_import(
    storage: &Storage,
    settings: &Settings,
    service: &ImportService<'_>,
    preview: &[ImportPreviewEntry],
    dry_run: bool,
) -> SpendwiseResult<()> {
    let categories = storage.categories.get_all_categories()?;
    print!(
        "{}",
        format_import_preview(preview, &categories, &settings.currency_symbol)
    );

    if dry_run {
        println!("\nDry run: nothing was imported.");
        return Ok(());
    }

    let result = service.import_from_preview(preview)?;
    println!();
    print!("{}", format_import_result(&result));
    Ok(())
}
