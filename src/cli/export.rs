//! CLI command for CSV export
//!
//! Writes the expense list, or a filtered part of it, as CSV.

use std::path::PathBuf;

use clap::Args;

use crate::error::ExpenseResult;

use super::args::FilterArgs;
use super::session::Session;

/// Arguments for `export`
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Output file (default: a dated file in the export directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub filter: FilterArgs,
}

/// Handle the export command
pub fn handle_export_command(session: &Session, args: ExportArgs) -> ExpenseResult<()> {
    let filter = args.filter.to_filter()?;
    let (path, count) = session.export_csv(session.manager().search(&filter), args.output)?;

    println!("Exported {} expense(s) to {}", count, path.display());
    Ok(())
}
