//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.
//! Running without a subcommand starts the interactive menu.

pub mod args;
pub mod backup;
pub mod budget;
pub mod category;
pub mod expense;
pub mod export;
pub mod history;
pub mod import;
pub mod menu;
pub mod prompt;
pub mod report;
pub mod session;

pub use backup::{handle_backup_command, BackupCommands};
pub use budget::{handle_budget_command, BudgetCommands};
pub use category::{handle_category_command, CategoryCommands};
pub use expense::{handle_add, handle_delete, handle_list, handle_search, AddArgs, DeleteArgs, ListArgs, SearchArgs};
pub use export::{handle_export_command, ExportArgs};
pub use history::{handle_history_command, HistoryArgs};
pub use import::{handle_import_command, ImportArgs};
pub use menu::{open_or_recover, run_menu};
pub use prompt::Prompter;
pub use report::{handle_report_command, ReportCommands};
pub use session::Session;
