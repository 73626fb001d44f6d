use std::io;
use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use finance_tracker::audit::AuditLogger;
use finance_tracker::cli::{
    handle_add, handle_backup_command, handle_budget_command, handle_category_command,
    handle_delete, handle_export_command, handle_history_command, handle_import_command,
    handle_list, handle_report_command, handle_search, open_or_recover, run_menu, Prompter,
};
use finance_tracker::config::{paths::FinancePaths, settings::Settings};
use finance_tracker::storage::Storage;

#[derive(Parser)]
#[command(
    name = "expense",
    version,
    about = "Personal finance tracker",
    long_about = "Record expenses, set monthly category budgets and see where \
                  the money goes. Run without a command for the interactive menu."
)]
struct Cli {
    /// Directory holding the expense store, backups and settings
    #[arg(long, global = true, env = "FINANCE_TRACKER_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Record an expense
    Add(finance_tracker::cli::AddArgs),

    /// List expenses by date
    #[command(alias = "ls")]
    List(finance_tracker::cli::ListArgs),

    /// Search expenses
    Search(finance_tracker::cli::SearchArgs),

    /// Delete an expense
    #[command(alias = "rm")]
    Delete(finance_tracker::cli::DeleteArgs),

    /// Spending reports
    #[command(subcommand)]
    Report(finance_tracker::cli::ReportCommands),

    /// Monthly category budgets
    #[command(subcommand)]
    Budget(finance_tracker::cli::BudgetCommands),

    /// Category management
    #[command(subcommand)]
    Category(finance_tracker::cli::CategoryCommands),

    /// Export expenses to CSV
    Export(finance_tracker::cli::ExportArgs),

    /// Import expenses from CSV
    Import(finance_tracker::cli::ImportArgs),

    /// Backup management
    #[command(subcommand)]
    Backup(finance_tracker::cli::BackupCommands),

    /// Show current configuration and paths
    Config,

    /// Show recent changes from the audit log
    History(finance_tracker::cli::HistoryArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let paths = match cli.data_dir {
        Some(dir) => FinancePaths::with_base_dir(dir),
        None => FinancePaths::new()?,
    };
    let settings = Settings::load_or_create(&paths)?;
    let paths = paths.with_overrides(&settings.paths);
    tracing::debug!(base = %paths.base_dir().display(), "resolved paths");

    // These work on files directly and never load the store
    match cli.command {
        Some(Commands::Backup(cmd)) => {
            let storage = Storage::new(paths.clone());
            let audit = AuditLogger::new(paths.audit_log());
            handle_backup_command(&storage, &settings, &audit, cmd)?;
        }
        Some(Commands::Config) => print_config(&paths, &settings),
        Some(Commands::History(args)) => {
            handle_history_command(&AuditLogger::new(paths.audit_log()), args)?;
        }
        command => run_session(paths, settings, command)?,
    }

    Ok(())
}

fn run_session(paths: FinancePaths, settings: Settings, command: Option<Commands>) -> Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    let mut prompter = Prompter::new(&mut input, &mut output);

    let Some(mut session) = open_or_recover(paths, settings, &mut prompter)? else {
        bail!(
            "The expense store is damaged and was left untouched. \
             Restore it with 'expense backup restore latest --force'."
        );
    };

    match command {
        Some(Commands::Add(args)) => handle_add(&mut session, args)?,
        Some(Commands::List(args)) => handle_list(&session, args)?,
        Some(Commands::Search(args)) => handle_search(&session, args)?,
        Some(Commands::Delete(args)) => handle_delete(&mut session, args)?,
        Some(Commands::Report(cmd)) => handle_report_command(&session, cmd)?,
        Some(Commands::Budget(cmd)) => handle_budget_command(&mut session, cmd)?,
        Some(Commands::Category(cmd)) => handle_category_command(&mut session, cmd)?,
        Some(Commands::Export(args)) => handle_export_command(&session, args)?,
        Some(Commands::Import(args)) => handle_import_command(&mut session, args)?,
        Some(Commands::Backup(_)) | Some(Commands::Config) | Some(Commands::History(_)) => {}
        None => run_menu(&mut session, &mut prompter)?,
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn print_config(paths: &FinancePaths, settings: &Settings) {
    println!("Finance Tracker Configuration");
    println!("=============================");
    println!("Base directory:   {}", paths.base_dir().display());
    println!("Expense store:    {}", paths.store_file().display());
    println!("Budgets file:     {}", paths.budgets_file().display());
    println!("Backup directory: {}", paths.backup_dir().display());
    println!("Export directory: {}", paths.export_dir().display());
    println!("Settings file:    {}", paths.settings_file().display());
    println!("Audit log:        {}", paths.audit_log().display());
    println!();
    println!("Settings:");
    println!("  Backups kept by prune: {}", settings.backup_retention.keep);
    if settings.custom_categories.is_empty() {
        println!("  Custom categories:     (none)");
    } else {
        println!(
            "  Custom categories:     {}",
            settings.custom_categories.join(", ")
        );
    }
}
