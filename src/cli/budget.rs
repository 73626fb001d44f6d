//! Budget CLI commands
//!
//! Implements CLI commands for setting, removing and listing monthly
//! category budgets.

use clap::Subcommand;

use crate::error::ExpenseResult;
use crate::models::BudgetBook;

use super::args::{parse_amount, parse_month_or_current, parse_optional_month};
use super::session::Session;

/// Budget subcommands
#[derive(Subcommand, Debug)]
pub enum BudgetCommands {
    /// Set the spending limit for a category in a month
    Set {
        /// Category name
        category: String,
        /// Limit (e.g., "400" or "400.00")
        limit: String,
        /// Month (YYYY-MM, "current" or "last"; default current)
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Remove a budget
    #[command(alias = "rm")]
    Remove {
        /// Category name
        category: String,
        /// Month (YYYY-MM; default current)
        #[arg(short, long)]
        month: Option<String>,
    },

    /// List budgets
    List {
        /// Only budgets for this month (YYYY-MM)
        #[arg(short, long)]
        month: Option<String>,
    },
}

/// Handle a budget command
pub fn handle_budget_command(session: &mut Session, cmd: BudgetCommands) -> ExpenseResult<()> {
    match cmd {
        BudgetCommands::Set {
            category,
            limit,
            month,
        } => {
            let limit = parse_amount(&limit)?;
            let month = parse_month_or_current(month.as_deref().unwrap_or(""))?;

            match session.set_budget(&category, month, limit)? {
                Some(previous) => println!(
                    "Updated budget for {} in {}: {} -> {}",
                    previous.category, month, previous.limit, limit
                ),
                None => println!("Set budget for {} in {}: {}", category.trim(), month, limit),
            }
        }

        BudgetCommands::Remove { category, month } => {
            let month = parse_month_or_current(month.as_deref().unwrap_or(""))?;
            let removed = session.remove_budget(&category, month)?;
            println!("Removed budget: {}", removed);
        }

        BudgetCommands::List { month } => {
            let month = parse_optional_month(month.as_deref())?;
            print!("{}", format_budget_list(session.budgets(), month));
        }
    }

    Ok(())
}

/// Format configured budgets, optionally for a single month
pub fn format_budget_list(book: &BudgetBook, month: Option<crate::models::Month>) -> String {
    let budgets: Vec<_> = book
        .sorted()
        .into_iter()
        .filter(|b| month.map_or(true, |m| b.month == m))
        .collect();

    if budgets.is_empty() {
        return "No budgets configured.\n".to_string();
    }

    let name_width = budgets
        .iter()
        .map(|b| b.category.chars().count())
        .max()
        .unwrap_or(8)
        .max(8);

    let mut output = format!(
        "{:<7}  {:<name_width$}  {:>12}\n",
        "Month",
        "Category",
        "Limit",
        name_width = name_width
    );
    output.push_str(&format!(
        "{:-<7}  {:-<name_width$}  {:->12}\n",
        "",
        "",
        "",
        name_width = name_width
    ));

    for budget in budgets {
        output.push_str(&format!(
            "{:<7}  {:<name_width$}  {:>12}\n",
            budget.month,
            budget.category,
            budget.limit,
            name_width = name_width
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Budget, Money, Month};

    #[test]
    fn test_format_budget_list() {
        let mut book = BudgetBook::new();
        let jan = Month::new(2024, 1).unwrap();
        let feb = Month::new(2024, 2).unwrap();
        book.set(Budget::new("Transport", feb, Money::from_cents(5000)).unwrap());
        book.set(Budget::new("Food", jan, Money::from_cents(40000)).unwrap());

        let all = format_budget_list(&book, None);
        let food = all.find("Food").unwrap();
        let transport = all.find("Transport").unwrap();
        assert!(food < transport);
        assert!(all.contains("$400.00"));

        let feb_only = format_budget_list(&book, Some(feb));
        assert!(!feb_only.contains("Food"));
        assert!(feb_only.contains("2024-02"));
    }

    #[test]
    fn test_format_empty_budget_list() {
        assert_eq!(
            format_budget_list(&BudgetBook::new(), None),
            "No budgets configured.\n"
        );
    }
}
