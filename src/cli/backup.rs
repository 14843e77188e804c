//! Backup CLI commands

use std::path::PathBuf;

use chrono::Utc;
use clap::Subcommand;

use crate::backup::{BackupManager, RestoreManager};
use crate::config::paths::SpendwisePaths;
use crate::config::settings::Settings;
use crate::error::{SpendwiseError, SpendwiseResult};

/// Backup subcommands
#[derive(Subcommand)]
pub enum BackupCommands {
    /// Create a backup and apply the retention policy
    Create {
        /// Write the backup to this file instead of the backup directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List available backups
    List {
        /// Show sizes and exact timestamps
        #[arg(short, long)]
        details: bool,
    },

    /// Restore data from a backup
    Restore {
        /// Backup file name, path, or "latest"
        backup: String,
        /// Overwrite current data without asking
        #[arg(short, long)]
        force: bool,
    },

    /// Delete backups outside the retention policy
    Prune,
}

/// Handle a backup command
pub fn handle_backup_command(
    paths: &SpendwisePaths,
    settings: &Settings,
    cmd: BackupCommands,
) -> SpendwiseResult<()> {
    let manager = BackupManager::new(paths.clone(), settings.backup_retention.clone());

    match cmd {
        BackupCommands::Create { output } => match output {
            Some(path) => {
                let path = manager.create_backup_to(&path)?;
                println!("Backup written to {}", path.display());
            }
            None => {
                let (path, pruned) = manager.create_backup_with_retention()?;
                println!("Backup created: {}", path.display());
                if !pruned.is_empty() {
                    println!("Pruned {} old backup(s).", pruned.len());
                }
            }
        },

        BackupCommands::List { details } => {
            let backups = manager.list_backups()?;

            if backups.is_empty() {
                println!("No backups found.");
                println!("Create one with: spendwise backup create");
                return Ok(());
            }

            println!("Backups in {}", manager.backup_dir().display());
            println!();
            for (i, backup) in backups.iter().enumerate() {
                let monthly = if backup.is_monthly { " [monthly]" } else { "" };
                let age = format_age(Utc::now().signed_duration_since(backup.created_at));

                if details {
                    println!(
                        "{:>3}. {}{}\n     Created: {}\n     Size:    {}",
                        i + 1,
                        backup.filename,
                        monthly,
                        backup.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
                        format_size(backup.size_bytes),
                    );
                } else {
                    println!("{:>3}. {} ({} ago){}", i + 1, backup.filename, age, monthly);
                }
            }
            println!();
            println!("Total: {} backup(s)", backups.len());
        }

        BackupCommands::Restore { backup, force } => {
            let backup_path = resolve_backup_path(&manager, &backup)?;
            let restore_manager = RestoreManager::new(paths.clone());
            let validation = restore_manager.validate_backup(&backup_path)?;

            println!("Backup: {}", backup_path.display());
            println!(
                "Created: {}",
                validation.backup_date.format("%Y-%m-%d %H:%M:%S UTC")
            );
            println!("Status: {}", validation.summary());

            if let Some(problem) = validation.problem {
                return Err(SpendwiseError::Validation(format!(
                    "Backup cannot be restored: {}",
                    problem
                )));
            }

            if !force {
                println!();
                println!("WARNING: This will overwrite all current data!");
                println!("To proceed, run again with --force:");
                println!("  spendwise backup restore {} --force", backup);
                return Ok(());
            }

            let safety = manager.create_backup()?;
            println!("Current data saved to {}", safety.display());

            let result = restore_manager.restore_from_file(&backup_path)?;
            println!("{}", result.summary());
        }

        BackupCommands::Prune => {
            let retention = &settings.backup_retention;
            let deleted = manager.enforce_retention()?;
            println!(
                "Deleted {} backup(s) (keeping {} daily, {} monthly).",
                deleted.len(),
                retention.daily_count,
                retention.monthly_count
            );
        }
    }

    Ok(())
}

/// "latest", a path, or a file name inside the backup directory
fn resolve_backup_path(manager: &BackupManager, backup: &str) -> SpendwiseResult<PathBuf> {
    let not_found = || SpendwiseError::NotFound {
        entity_type: "Backup",
        identifier: backup.to_string(),
    };

    if backup.eq_ignore_ascii_case("latest") {
        return manager
            .get_latest_backup()?
            .map(|b| b.path)
            .ok_or_else(not_found);
    }

    let path = PathBuf::from(backup);
    if path.is_file() {
        return Ok(path);
    }

    if let Some(info) = manager.get_backup(backup)? {
        return Ok(info.path);
    }
    manager
        .get_backup(&format!("{}.json", backup))?
        .map(|b| b.path)
        .ok_or_else(not_found)
}

fn format_age(age: chrono::Duration) -> String {
    let minutes = age.num_minutes();
    match minutes {
        m if m < 1 => format!("{}s", age.num_seconds().max(0)),
        m if m < 60 => format!("{}m", m),
        m if m < 60 * 24 => format!("{}h", m / 60),
        m => format!("{}d", m / (60 * 24)),
    }
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
