//! Backup CLI commands
//!
//! Implements CLI commands for backup management. These work on the store
//! file directly, so they are usable even when the store cannot be loaded.

use clap::Subcommand;

use crate::audit::{AuditEntry, AuditLogger, Operation};
use crate::backup::BackupInfo;
use crate::config::settings::Settings;
use crate::error::ExpenseResult;
use crate::storage::Storage;

use super::session::restore_backup;

/// Backup subcommands
#[derive(Subcommand, Debug)]
pub enum BackupCommands {
    /// Copy the current store to a new backup
    Create,

    /// List all available backups, newest first
    List {
        /// Show detailed information
        #[arg(short, long)]
        verbose: bool,
    },

    /// Restore the store from a backup
    Restore {
        /// Backup name (with or without .json), or 'latest'
        backup: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Delete all but the newest backups
    Prune {
        /// Number of backups to keep (default from settings)
        #[arg(short, long)]
        keep: Option<usize>,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

/// Handle a backup command
pub fn handle_backup_command(
    storage: &Storage,
    settings: &Settings,
    audit: &AuditLogger,
    cmd: BackupCommands,
) -> ExpenseResult<()> {
    match cmd {
        BackupCommands::Create => {
            let backup = storage.create_backup()?;
            audit.log(&AuditEntry::store_event(
                Operation::Backup,
                backup.filename.clone(),
                "manual backup",
            ))?;
            println!("Backup created: {}", backup.filename);
            println!("Location: {}", backup.path.display());
        }

        BackupCommands::List { verbose } => {
            let backups = storage.list_backups()?;

            if backups.is_empty() {
                println!("No backups found.");
                println!("Create one with: expense backup create");
                return Ok(());
            }

            print!("{}", format_backup_list(&backups, verbose));
        }

        BackupCommands::Restore { backup, force } => {
            let (info, validation) = storage.validate_backup(&backup)?;

            println!("Backup Information");
            println!("==================");
            println!("File: {}", info.path.display());
            println!("Created: {}", info.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
            println!("Status: {}", validation.summary());
            println!();

            if !force {
                println!("WARNING: This will replace ALL current expenses!");
                println!("The current store is backed up first.");
                println!("To proceed, run again with --force flag:");
                println!("  expense backup restore {} --force", backup);
                return Ok(());
            }

            let result = restore_backup(storage, audit, &backup)?;
            println!("Restore complete!");
            println!("{}", result.summary());
        }

        BackupCommands::Prune { keep, force } => {
            let keep = keep.unwrap_or(settings.backup_retention.keep);
            let backups = storage.list_backups()?;
            let to_delete = backups.len().saturating_sub(keep);

            if to_delete == 0 {
                println!("No backups to prune.");
                println!("You have {} backup(s); keeping {}.", backups.len(), keep);
                return Ok(());
            }

            if !force {
                println!(
                    "{} of {} backup(s) would be deleted, keeping the newest {}.",
                    to_delete,
                    backups.len(),
                    keep
                );
                println!("To delete them, run again with --force flag:");
                println!("  expense backup prune --keep {} --force", keep);
                return Ok(());
            }

            let deleted = storage.prune_backups(keep)?;
            audit.log(&AuditEntry::store_event(
                Operation::Prune,
                storage.paths().backup_dir().display().to_string(),
                format!("deleted {}, kept {}", deleted, keep),
            ))?;
            println!("Deleted {} backup(s).", deleted);
        }
    }

    Ok(())
}

/// Format a list of backups, numbered newest first
pub fn format_backup_list(backups: &[BackupInfo], verbose: bool) -> String {
    let mut output = String::from("Available Backups\n=================\n\n");

    for (i, backup) in backups.iter().enumerate() {
        let age = chrono::Utc::now().signed_duration_since(backup.created_at);

        if verbose {
            output.push_str(&format!(
                "{}. {}\n   Created: {}\n   Size: {}\n   Age: {}\n\n",
                i + 1,
                backup.filename,
                backup.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
                format_size(backup.size_bytes),
                format_duration(age),
            ));
        } else {
            output.push_str(&format!(
                "  {}. {} ({} ago, {})\n",
                i + 1,
                backup.id(),
                format_duration(age),
                format_size(backup.size_bytes),
            ));
        }
    }

    output.push_str(&format!("\nTotal: {} backup(s)\n", backups.len()));
    output
}

/// Format a duration in human-readable form
fn format_duration(duration: chrono::Duration) -> String {
    let total_seconds = duration.num_seconds().max(0);

    if total_seconds < 60 {
        return format!("{}s", total_seconds);
    }

    let minutes = total_seconds / 60;
    if minutes < 60 {
        return format!("{}m", minutes);
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{}h", hours);
    }

    let days = hours / 24;
    if days < 30 {
        return format!("{}d", days);
    }

    format!("{}mo", days / 30)
}

/// Format a file size in human-readable form
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
