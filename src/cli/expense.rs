//! Expense CLI commands
//!
//! Implements the `add`, `list`, `search` and `delete` commands.

use clap::Args;

use crate::display::expense::{format_expense_details, format_expense_table};
use crate::error::{ExpenseError, ExpenseResult};
use crate::models::parse_tags;
use crate::services::SearchFilter;

use super::args::{parse_amount, parse_date_or_today, parse_optional_month, FilterArgs};
use super::session::Session;

/// Arguments for `add`
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Amount spent (e.g. "12.50")
    pub amount: String,

    /// Category name
    pub category: String,

    /// Description
    #[arg(short, long, default_value = "")]
    pub description: String,

    /// Date of the expense (YYYY-MM-DD, default today)
    #[arg(long)]
    pub date: Option<String>,

    /// Comma-separated tags
    #[arg(short, long)]
    pub tags: Option<String>,
}

/// Arguments for `list`
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only this month (YYYY-MM)
    #[arg(short, long)]
    pub month: Option<String>,

    /// Show only the most recent N expenses
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

/// Arguments for `search`
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Text to find (same as --text)
    pub query: Option<String>,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Stop after N matches
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

/// Arguments for `delete`
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Expense id (exp-xxxxxxxx, full id or unique prefix)
    pub id: String,
}

/// Handle `add`
pub fn handle_add(session: &mut Session, args: AddArgs) -> ExpenseResult<()> {
    let amount = parse_amount(&args.amount)?;
    let date = parse_date_or_today(args.date.as_deref().unwrap_or(""))?;
    let tags = args.tags.as_deref().map(parse_tags).unwrap_or_default();

    let expense = session.add_expense(date, amount, &args.category, &args.description, tags)?;
    session.save()?;

    println!("Added expense: {}", expense);
    println!("  ID: {}", expense.id);
    Ok(())
}

/// Handle `list`
pub fn handle_list(session: &Session, args: ListArgs) -> ExpenseResult<()> {
    let mut filter = SearchFilter::new();
    if let Some(month) = parse_optional_month(args.month.as_deref())? {
        filter = filter.month(month);
    }

    let mut expenses: Vec<_> = session.manager().search(&filter).collect();
    expenses.sort_by_key(|e| e.date);
    if let Some(limit) = args.limit {
        let skip = expenses.len().saturating_sub(limit);
        expenses.drain(..skip);
    }

    print!("{}", format_expense_table(expenses));
    Ok(())
}

/// Handle `search`
pub fn handle_search(session: &Session, args: SearchArgs) -> ExpenseResult<()> {
    let mut filter_args = args.filter;
    if let Some(query) = args.query {
        if filter_args.text.is_some() {
            return Err(ExpenseError::Validation(
                "Give the search text either as an argument or with --text, not both".into(),
            ));
        }
        filter_args.text = Some(query);
    }

    let mut filter = filter_args.to_filter()?;
    if let Some(limit) = args.limit {
        filter = filter.limit(limit);
    }

    print!("{}", format_expense_table(session.manager().search(&filter)));
    Ok(())
}

/// Handle `delete`
pub fn handle_delete(session: &mut Session, args: DeleteArgs) -> ExpenseResult<()> {
    let expense = session.delete_expense(&args.id)?;
    session.save()?;

    println!("Deleted expense:");
    print!("{}", format_expense_details(&expense));
    Ok(())
}
