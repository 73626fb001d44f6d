//! CLI command handler for CSV import
//!
//! Merges expenses from a CSV file in the export layout. Rows whose id is
//! already stored are skipped; invalid rows are reported by line number.

use std::path::PathBuf;

use clap::Args;

use crate::error::ExpenseResult;
use crate::services::ImportResult;

use super::session::Session;

/// Arguments for `import`
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Path to CSV file
    pub file: PathBuf,
}

/// Handle the import command
pub fn handle_import_command(session: &mut Session, args: ImportArgs) -> ExpenseResult<()> {
    let result = session.import_csv(&args.file)?;
    session.save()?;

    print!("{}", format_import_result(&result));
    Ok(())
}

/// Format the outcome of an import
pub fn format_import_result(result: &ImportResult) -> String {
    let mut output = String::from("Import Complete!\n");
    output.push_str(&format!("  Imported:    {}\n", result.imported));
    output.push_str(&format!("  Duplicates:  {}\n", result.duplicates_skipped));

    if !result.errors.is_empty() {
        output.push_str(&format!("  Errors:      {}\n", result.errors.len()));
        for (line, message) in &result.errors {
            output.push_str(&format!("    Line {}: {}\n", line, message));
        }
    }

    output
}
