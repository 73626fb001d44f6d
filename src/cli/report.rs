//! CLI commands for reports
//!
//! Each report prints to the terminal, or with `--output` is written as CSV.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use clap::Subcommand;

use crate::error::{ExpenseError, ExpenseResult};
use crate::models::Expense;
use crate::reports::{BudgetStatusReport, CategoryBreakdown, MonthSummary, MonthlyTotals, Statistics};

use super::args::{parse_month_or_current, parse_optional_month, FilterArgs, OutputArgs};
use super::session::Session;

/// Report subcommands
#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Total spending per month
    Monthly {
        #[command(flatten)]
        filter: FilterArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Detailed summary of one month
    Month {
        /// Month to summarize (YYYY-MM, default current)
        month: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Spending per category with percentages
    #[command(alias = "categories")]
    Category {
        #[command(flatten)]
        filter: FilterArgs,

        /// Also list known categories with no spending
        #[arg(short, long)]
        all: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Spending against budget limits
    Budget {
        /// Only budgets for this month (YYYY-MM)
        #[arg(short, long)]
        month: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Overall statistics
    #[command(alias = "statistics")]
    Stats {
        #[command(flatten)]
        filter: FilterArgs,

        #[command(flatten)]
        output: OutputArgs,
    },
}

/// Handle report commands
pub fn handle_report_command(session: &Session, cmd: ReportCommands) -> ExpenseResult<()> {
    match cmd {
        ReportCommands::Monthly { filter, output } => {
            let expenses = filtered(session, &filter)?;
            let report = MonthlyTotals::generate(expenses);
            emit(output, || report.format_terminal(), |w| report.export_csv(w))
        }

        ReportCommands::Month { month, output } => {
            let month = parse_month_or_current(month.as_deref().unwrap_or(""))?;
            let report = MonthSummary::generate(session.manager().all(), month);
            emit(output, || report.format_terminal(), |w| report.export_csv(w))
        }

        ReportCommands::Category { filter, all, output } => {
            let expenses = filtered(session, &filter)?;
            let report = if all {
                CategoryBreakdown::generate_with_categories(
                    expenses,
                    session.manager().categories().iter(),
                )
            } else {
                CategoryBreakdown::generate(expenses)
            };
            emit(output, || report.format_terminal(), |w| report.export_csv(w))
        }

        ReportCommands::Budget { month, output } => {
            let month = parse_optional_month(month.as_deref())?;
            let report =
                BudgetStatusReport::generate(session.manager().all(), session.budgets(), month);
            emit(output, || report.format_terminal(), |w| report.export_csv(w))
        }

        ReportCommands::Stats { filter, output } => {
            let expenses = filtered(session, &filter)?;
            let report = Statistics::generate(expenses);
            emit(output, || report.format_terminal(), |w| report.export_csv(w))
        }
    }
}

fn filtered<'a>(session: &'a Session, args: &FilterArgs) -> ExpenseResult<Vec<&'a Expense>> {
    let filter = args.to_filter()?;
    Ok(session
        .manager()
        .all()
        .iter()
        .filter(|e| filter.matches(e))
        .collect())
}

/// Print a report, or write it as CSV when an output path was given
fn emit<T, C>(output: OutputArgs, terminal: T, csv: C) -> ExpenseResult<()>
where
    T: FnOnce() -> String,
    C: FnOnce(&mut BufWriter<File>) -> ExpenseResult<()>,
{
    match output.output {
        Some(path) => {
            write_csv_file(&path, csv)?;
            println!("Report exported to: {}", path.display());
        }
        None => println!("{}", terminal()),
    }
    Ok(())
}

/// Create `path` (and its directory) and hand a buffered writer to `write`
pub(crate) fn write_csv_file<C>(path: &Path, write: C) -> ExpenseResult<()>
where
    C: FnOnce(&mut BufWriter<File>) -> ExpenseResult<()>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            ExpenseError::Export(format!("Failed to create {}: {}", parent.display(), e))
        })?;
    }

    let file = File::create(path).map_err(|e| {
        ExpenseError::Export(format!("Failed to create file {}: {}", path.display(), e))
    })?;
    let mut writer = BufWriter::new(file);
    write(&mut writer)?;
    writer
        .flush()
        .map_err(|e| ExpenseError::Export(format!("Failed to write {}: {}", path.display(), e)))
}
