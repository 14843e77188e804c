//! Category CLI commands
//!
//! Category CRUD, keyword maintenance and a dry-run of the categorizer.

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::{format_category_details, format_category_table};
use crate::error::{SpendwiseError, SpendwiseResult};
use crate::services::{Categorizer, CategoryService, CategoryUpdate};
use crate::storage::Storage;

use super::parse_amount;

/// Category subcommands
#[derive(Subcommand)]
pub enum CategoryCommands {
    /// List all categories in matching order
    List,

    /// Show category details
    Show {
        /// Category name or ID
        category: String,
    },

    /// Create a new category
    Create {
        /// Category name
        name: String,
        /// Matching keywords, comma separated
        #[arg(short, long, value_delimiter = ',')]
        keywords: Vec<String>,
        /// Default monthly budget limit
        #[arg(short, long)]
        limit: Option<String>,
    },

    /// Rename a category or change its default limit
    Edit {
        /// Category name or ID
        category: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long, conflicts_with = "clear_limit")]
        limit: Option<String>,
        /// Remove the default limit
        #[arg(long)]
        clear_limit: bool,
    },

    /// Add a matching keyword
    #[command(name = "add-keyword")]
    AddKeyword {
        category: String,
        keyword: String,
    },

    /// Remove a matching keyword
    #[command(name = "remove-keyword")]
    RemoveKeyword {
        category: String,
        keyword: String,
    },

    /// Delete a category
    Delete {
        /// Category name or ID
        category: String,
        /// Move the category's transactions here first
        #[arg(long)]
        reassign_to: Option<String>,
    },

    /// Show which category a description would be filed under
    Test {
        description: String,
    },
}

/// Handle a category command
pub fn handle_category_command(
    storage: &Storage,
    settings: &Settings,
    cmd: CategoryCommands,
) -> SpendwiseResult<()> {
    let service = CategoryService::new(storage);
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        CategoryCommands::List => {
            let categories = service.list()?;
            let counts = categories
                .iter()
                .map(|c| service.transaction_count(c.id))
                .collect::<SpendwiseResult<Vec<_>>>()?;
            print!("{}", format_category_table(&categories, &counts, symbol));
        }

        CategoryCommands::Show { category } => {
            let category = service.require(&category)?;
            let count = service.transaction_count(category.id)?;
            print!("{}", format_category_details(&category, count, symbol));
        }

        CategoryCommands::Create {
            name,
            keywords,
            limit,
        } => {
            let limit = limit.map(|l| parse_amount(&l)).transpose()?;
            let category = service.create(&name, &keywords, limit)?;

            println!("Created category: {}", category.name);
            if !category.keywords.is_empty() {
                println!("  Keywords: {}", category.keywords.join(", "));
            }
            println!("  ID: {}", category.id);
        }

        CategoryCommands::Edit {
            category,
            name,
            limit,
            clear_limit,
        } => {
            let category = service.require(&category)?;

            if name.is_none() && limit.is_none() && !clear_limit {
                println!("No changes specified. Use --name, --limit or --clear-limit.");
                return Ok(());
            }

            let updated = service.update(
                category.id,
                CategoryUpdate {
                    name,
                    budget_limit: limit.map(|l| parse_amount(&l)).transpose()?,
                    clear_budget_limit: clear_limit,
                },
            )?;
            println!("Updated category: {}", updated.name);
        }

        CategoryCommands::AddKeyword { category, keyword } => {
            let category = service.require(&category)?;
            if service.add_keyword(category.id, &keyword)? {
                println!("Added keyword '{}' to {}", keyword.trim().to_lowercase(), category.name);
            } else {
                println!("{} already has keyword '{}'", category.name, keyword.trim().to_lowercase());
            }
        }

        CategoryCommands::RemoveKeyword { category, keyword } => {
            let category = service.require(&category)?;
            if service.remove_keyword(category.id, &keyword)? {
                println!("Removed keyword '{}' from {}", keyword.trim().to_lowercase(), category.name);
            } else {
                println!("{} has no keyword '{}'", category.name, keyword.trim().to_lowercase());
            }
        }

        CategoryCommands::Delete {
            category,
            reassign_to,
        } => {
            let category = service.require(&category)?;

            match reassign_to {
                Some(target) => {
                    let target = service.require(&target)?;
                    let moved = service.delete_reassigning(category.id, target.id)?;
                    println!("Deleted category: {}", category.name);
                    println!("  {} transaction(s) moved to {}", moved, target.name);
                }
                None => {
                    if !service.delete_if_unused(category.id)? {
                        return Err(SpendwiseError::InUse {
                            entity_type: "Category",
                            identifier: category.name.clone(),
                            count: service.transaction_count(category.id)?,
                        });
                    }
                    println!("Deleted category: {}", category.name);
                }
            }
        }

        CategoryCommands::Test { description } => {
            let categorizer =
                Categorizer::with_default_name(service.list()?, &settings.default_category);
            match categorizer.categorize(&description) {
                Some(category) => println!("'{}' -> {}", description, category.name),
                None => println!(
                    "'{}' -> {} (no keyword matched)",
                    description, settings.default_category
                ),
            }
        }
    }

    Ok(())
}
