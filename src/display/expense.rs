//! Expense display formatting
//!
//! Formats expenses for terminal output in table and detail views.

use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};

use crate::models::{Expense, Money, DATE_FORMAT};

use super::report::truncate;

const DESCRIPTION_WIDTH: usize = 30;

#[derive(Tabled)]
struct ExpenseRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Tags")]
    tags: String,
}

impl From<&Expense> for ExpenseRow {
    fn from(expense: &Expense) -> Self {
        Self {
            id: expense.id.to_string(),
            date: expense.date.format(DATE_FORMAT).to_string(),
            amount: expense.amount.to_string(),
            category: expense.category.clone(),
            description: truncate(&expense.description, DESCRIPTION_WIDTH)
                .trim_end()
                .to_string(),
            tags: expense.tags.join(", "),
        }
    }
}

/// Format a list of expenses as a table, followed by a count and total
pub fn format_expense_table<'a, I>(expenses: I) -> String
where
    I: IntoIterator<Item = &'a Expense>,
{
    let expenses: Vec<&Expense> = expenses.into_iter().collect();
    if expenses.is_empty() {
        return "No expenses found.\n".to_string();
    }

    let total: Money = expenses.iter().map(|e| e.amount).sum();
    let rows: Vec<ExpenseRow> = expenses.iter().map(|e| ExpenseRow::from(*e)).collect();

    let mut table = Table::new(rows);
    table
        .with(Style::psql())
        .with(Modify::new(Columns::single(2)).with(Alignment::right()));

    format!(
        "{}\n{} expense(s), total {}\n",
        table,
        expenses.len(),
        total
    )
}

/// Format expense details for display
pub fn format_expense_details(expense: &Expense) -> String {
    let mut output = String::new();

    output.push_str(&format!("Expense:     {}\n", expense.id));
    output.push_str(&format!("Date:        {}\n", expense.date.format(DATE_FORMAT)));
    output.push_str(&format!("Amount:      {}\n", expense.amount));
    output.push_str(&format!("Category:    {}\n", expense.category));

    if !expense.description.is_empty() {
        output.push_str(&format!("Description: {}\n", expense.description));
    }

    if !expense.tags.is_empty() {
        output.push_str(&format!("Tags:        {}\n", expense.tags.join(", ")));
    }

    output.push_str(&format!("Full ID:     {}\n", expense.id.full()));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample() -> Expense {
        Expense::new(
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            Money::from_cents(2550),
            "Food",
            "Lunch with team",
        )
        .unwrap()
        .with_tags(["work", "lunch"])
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(
            format_expense_table(&Vec::<Expense>::new()),
            "No expenses found.\n"
        );
    }

    #[test]
    fn test_table_contents() {
        let expense = sample();
        let output = format_expense_table([&expense]);

        assert!(output.contains("Date"));
        assert!(output.contains("2024-01-15"));
        assert!(output.contains("$25.50"));
        assert!(output.contains("Lunch with team"));
        assert!(output.contains("work, lunch"));
        assert!(output.contains(&expense.id.to_string()));
        assert!(output.contains("1 expense(s), total $25.50"));
    }

    #[test]
    fn test_long_description_truncated() {
        let expense = Expense::new(
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            Money::from_cents(100),
            "Other",
            "a".repeat(80),
        )
        .unwrap();

        let output = format_expense_table([&expense]);
        assert!(!output.contains(&"a".repeat(40)));
        assert!(output.contains("..."));
    }

    #[test]
    fn test_details() {
        let expense = sample();
        let output = format_expense_details(&expense);

        assert!(output.contains("Amount:      $25.50"));
        assert!(output.contains("Category:    Food"));
        assert!(output.contains("Tags:        work, lunch"));
        assert!(output.contains(&expense.id.full()));
    }
}
