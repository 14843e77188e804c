use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use spendwise::cli::{
    handle_backup_command, handle_budget_command, handle_category_command, handle_export_command,
    handle_import_command, handle_summary_command, handle_transaction_command, BackupCommands,
    BudgetCommands, CategoryCommands, ExportCommands, ImportCommands, TransactionCommands,
};
use spendwise::config::{paths::SpendwisePaths, settings::Settings};
use spendwise::storage::{init::initialize_storage, Storage};

#[derive(Parser)]
#[command(
    name = "spendwise",
    version,
    about = "Personal finance tracker for the command line",
    long_about = "Spendwise records income and expenses, files them into categories \
                  by keyword, tracks monthly budgets and imports bank statements \
                  from Revolut, Raiffeisen, generic CSV files or an open banking API."
)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directory, settings and starter categories
    Init,

    /// Show paths and settings
    Config,

    /// Transaction management
    #[command(subcommand, alias = "txn")]
    Transaction(TransactionCommands),

    /// Category management
    #[command(subcommand)]
    Category(CategoryCommands),

    /// Monthly budgets
    #[command(subcommand)]
    Budget(BudgetCommands),

    /// Import bank statements
    #[command(subcommand)]
    Import(ImportCommands),

    /// Export data to CSV, JSON or YAML
    #[command(subcommand)]
    Export(ExportCommands),

    /// Create, list and restore backups
    #[command(subcommand)]
    Backup(BackupCommands),

    /// Income, expenses and top spending for a month
    Summary {
        /// Month ("2025-01", "January", "last", ...), defaults to the current one
        #[arg(short, long)]
        month: Option<String>,
        /// Number of top spending categories to show
        #[arg(short, long, default_value = "5")]
        top: usize,
        /// Also list spending for every category
        #[arg(short, long)]
        detailed: bool,
    },
}

fn setup_logging(verbose: bool) {
    let default = if verbose { "spendwise=debug" } else { "spendwise=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let paths = SpendwisePaths::new()?;
    let mut settings = Settings::load_or_create(&paths)?;

    let Some(command) = cli.command else {
        println!("Spendwise - personal finance tracker");
        println!();
        println!("Run 'spendwise init' to get started.");
        println!("Run 'spendwise --help' for usage information.");
        return Ok(());
    };

    let open_storage = || Storage::open(paths.clone());

    match command {
        Commands::Init => {
            println!("Initializing Spendwise at: {}", paths.base_dir().display());
            let seeded = initialize_storage(&paths)?;
            settings.setup_completed = true;
            settings.save(&paths)?;

            if seeded > 0 {
                println!("Created {} starter categories.", seeded);
                println!("Run 'spendwise category list' to see them.");
            } else {
                println!("Existing data found; categories left unchanged.");
            }
        }
        Commands::Config => {
            println!("Spendwise Configuration");
            println!("=======================");
            println!("Base directory:   {}", paths.base_dir().display());
            println!("Data directory:   {}", paths.data_dir().display());
            println!("Backup directory: {}", paths.backup_dir().display());
            println!("Settings file:    {}", paths.settings_file().display());
            println!();
            println!("Settings:");
            println!("  Currency:         {}", settings.currency_symbol);
            println!("  Date format:      {}", settings.date_format);
            println!("  Default category: {}", settings.default_category);
            println!(
                "  Backups kept:     {} daily, {} monthly",
                settings.backup_retention.daily_count, settings.backup_retention.monthly_count
            );
            println!("  Bank API:         {}", settings.open_banking.base_url);
            println!("  Initialized:      {}", settings.setup_completed);
        }
        Commands::Backup(cmd) => handle_backup_command(&paths, &settings, cmd)?,
        Commands::Transaction(cmd) => handle_transaction_command(&open_storage()?, &settings, cmd)?,
        Commands::Category(cmd) => handle_category_command(&open_storage()?, &settings, cmd)?,
        Commands::Budget(cmd) => handle_budget_command(&open_storage()?, &settings, cmd)?,
        Commands::Import(cmd) => handle_import_command(&open_storage()?, &settings, cmd)?,
        Commands::Export(cmd) => handle_export_command(&open_storage()?, cmd)?,
        Commands::Summary {
            month,
            top,
            detailed,
        } => handle_summary_command(&open_storage()?, &settings, month.as_deref(), top, detailed)?,
    }

    Ok(())
}
