//! Category CLI commands
//!
//! Implements CLI commands for listing and adding categories.

use clap::Subcommand;

use crate::error::ExpenseResult;
use crate::models::{CategoryList, Expense};
use crate::reports::CategoryBreakdown;

use super::session::Session;

/// Category subcommands
#[derive(Subcommand, Debug)]
pub enum CategoryCommands {
    /// List known categories with how often each is used
    List,

    /// Add a custom category
    Add {
        /// Category name
        name: String,
    },
}

/// Handle a category command
pub fn handle_category_command(session: &mut Session, cmd: CategoryCommands) -> ExpenseResult<()> {
    match cmd {
        CategoryCommands::List => {
            print!(
                "{}",
                format_category_list(session.manager().categories(), session.manager().all())
            );
        }

        CategoryCommands::Add { name } => {
            let existed = session.manager().categories().contains(&name);
            let canonical = session.add_category(&name)?;
            if existed {
                println!("Category already exists: {}", canonical);
            } else {
                println!("Added category: {}", canonical);
            }
        }
    }

    Ok(())
}

/// Format categories, numbered, with their expense counts and totals
pub fn format_category_list(categories: &CategoryList, expenses: &[Expense]) -> String {
    let usage = CategoryBreakdown::generate_with_categories(expenses, categories.iter());

    let mut output = String::new();
    for (i, name) in categories.iter().enumerate() {
        let (count, total) = usage
            .get(name)
            .map(|row| (row.count, row.total))
            .unwrap_or_default();
        output.push_str(&format!(
            "{:>3}. {:<20} {:>4} expense(s) {:>12}\n",
            i + 1,
            name,
            count,
            total
        ));
    }
    output
}
