//! Budget CLI commands
//!
//! Month arguments accept anything `PeriodService::parse` does: `2025-01`,
//! `January`, `mar 2024`, `last`, `next`. They default to the current month.

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::format_budget_overview;
use crate::error::SpendwiseResult;
use crate::services::{BudgetService, CategoryService, PeriodService};
use crate::storage::Storage;

use super::parse_amount;

/// Budget subcommands
#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Set a category's budget for a month (an amount of 0 removes it)
    Set {
        /// Category name or ID
        category: String,
        /// Monthly limit
        amount: String,
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Show the budget overview for a month
    Show {
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Remove a category's budget for a month
    Remove {
        /// Category name or ID
        category: String,
        #[arg(short, long)]
        month: Option<String>,
    },

    /// List categories that are over budget
    Over {
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Copy monthly budgets from one month to another
    Copy {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },
}

/// Handle a budget command
pub fn handle_budget_command(
    storage: &Storage,
    settings: &Settings,
    cmd: BudgetCommands,
) -> SpendwiseResult<()> {
    let service = BudgetService::new(storage);
    let category_service = CategoryService::new(storage);
    let periods = PeriodService::new();
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        BudgetCommands::Set {
            category,
            amount,
            month,
        } => {
            let category = category_service.require(&category)?;
            let month = periods.parse_or_current(month.as_deref())?;
            let amount = parse_amount(&amount)?;

            match service.set_budget_for_category(category.id, month, amount)? {
                Some(budget) => println!(
                    "Set {} budget for {} to {}",
                    category.name,
                    month.label(),
                    budget.limit.format_with_symbol(symbol)
                ),
                None => println!("Removed {} budget for {}", category.name, month.label()),
            }
        }

        BudgetCommands::Show { month } => {
            let month = periods.parse_or_current(month.as_deref())?;
            print!("{}", format_budget_overview(&service.overview(month)?, symbol));
        }

        BudgetCommands::Remove { category, month } => {
            let category = category_service.require(&category)?;
            let month = periods.parse_or_current(month.as_deref())?;

            if service.delete_budget(category.id, month)? {
                println!("Removed {} budget for {}", category.name, month.label());
            } else {
                println!("{} has no budget for {}", category.name, month.label());
            }
        }

        BudgetCommands::Over { month } => {
            let month = periods.parse_or_current(month.as_deref())?;
            let over = service.over_budget(month)?;

            if over.is_empty() {
                println!("No categories over budget in {}.", month.label());
                return Ok(());
            }

            println!("Over budget in {}:", month.label());
            for line in &over {
                println!(
                    "  {:<20} {} of {} ({} over)",
                    line.category.name,
                    line.status.spent.format_with_symbol(symbol),
                    line.status.limit.format_with_symbol(symbol),
                    (-line.status.remaining).format_with_symbol(symbol),
                );
            }
        }

        BudgetCommands::Copy { from, to } => {
            let from = periods.parse(&from)?;
            let to = periods.parse(&to)?;
            let copied = service.copy_month(from, to)?;
            println!(
                "Copied {} budget(s) from {} to {}",
                copied,
                from.label(),
                to.label()
            );
        }
    }

    Ok(())
}
