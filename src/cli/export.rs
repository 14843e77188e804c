//! Export CLI commands

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{Subcommand, ValueEnum};

use crate::error::{SpendwiseError, SpendwiseResult};
use crate::export::{export_budgets_csv, export_full_json, export_full_yaml, export_transactions_csv};
use crate::reports::SpendingReport;
use crate::services::PeriodService;
use crate::storage::Storage;

/// Format of a full export
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExportFormat {
    Json,
    /// Human-readable, with a comment header
    Yaml,
}

/// Export subcommands
#[derive(Subcommand, Debug)]
pub enum ExportCommands {
    /// Export all transactions to CSV
    Transactions {
        output: PathBuf,
    },

    /// Export budgets and their spending to CSV
    Budgets {
        output: PathBuf,
        /// Only this month, including category default limits
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Export a month's spending by category to CSV
    Spending {
        output: PathBuf,
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Export everything to a single file
    All {
        output: PathBuf,
        #[arg(short, long, value_enum, default_value = "json")]
        format: ExportFormat,
        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
}

fn create_output(path: &Path) -> SpendwiseResult<BufWriter<File>> {
    let file = File::create(path).map_err(|e| {
        SpendwiseError::Export(format!("Failed to create file {}: {}", path.display(), e))
    })?;
    Ok(BufWriter::new(file))
}

/// Handle an export command
pub fn handle_export_command(storage: &Storage, cmd: ExportCommands) -> SpendwiseResult<()> {
    match cmd {
        ExportCommands::Transactions { output } => {
            let mut writer = create_output(&output)?;
            let count = export_transactions_csv(storage, &mut writer)?;
            writer.flush()?;
            println!("Exported {} transaction(s) to {}", count, output.display());
        }

        ExportCommands::Budgets { output, month } => {
            let month = month.map(|m| PeriodService::new().parse(&m)).transpose()?;
            let mut writer = create_output(&output)?;
            let count = export_budgets_csv(storage, &mut writer, month)?;
            writer.flush()?;
            println!("Exported {} budget(s) to {}", count, output.display());
        }

        ExportCommands::Spending { output, month } => {
            let month = PeriodService::new().parse_or_current(month.as_deref())?;
            let report = SpendingReport::for_month(storage, month)?;
            let mut writer = create_output(&output)?;
            report.export_csv(&mut writer)?;
            writer.flush()?;
            println!(
                "Exported spending for {} ({} categories) to {}",
                month.label(),
                report.categories.len(),
                output.display()
            );
        }

        ExportCommands::All {
            output,
            format,
            pretty,
        } => {
            let mut writer = create_output(&output)?;
            match format {
                ExportFormat::Json => export_full_json(storage, &mut writer, pretty)?,
                ExportFormat::Yaml => export_full_yaml(storage, &mut writer)?,
            }
            writer.flush()?;
            println!(
                "Exported {} transaction(s), {} categories and {} budget(s) to {}",
                storage.transactions.count()?,
                storage.categories.count()?,
                storage.budgets.count()?,
                output.display()
            );
        }
    }

    Ok(())
}
