//! Budget Status Report
//!
//! Compares actual spending against each configured (category, month) limit.

use std::io::Write;

use crate::display::report::{format_bar, format_percentage, separator, title_block, truncate};
use crate::error::ExpenseResult;
use crate::models::{BudgetBook, Expense, Money, Month};

use super::export_error;

/// Status of one budget
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetStatusRow {
    pub category: String,
    pub month: Month,
    /// Budgeted limit
    pub limit: Money,
    /// Actual spending in the category that month
    pub spent: Money,
    /// Limit minus spending (negative when over)
    pub remaining: Money,
    /// Spending as a percentage of the limit; `None` for a zero limit
    pub percent_used: Option<f64>,
    /// Whether spending exceeds the limit
    pub over: bool,
}

impl BudgetStatusRow {
    /// Short status label
    pub fn status(&self) -> &'static str {
        if self.over {
            "OVER"
        } else {
            "OK"
        }
    }
}

/// Budget Status Report
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BudgetStatusReport {
    /// Month the report is restricted to, if any
    pub month: Option<Month>,
    /// Rows ordered by month, then category
    pub rows: Vec<BudgetStatusRow>,
}

impl BudgetStatusReport {
    /// Generate status for every budget, or only those of `month`
    pub fn generate<'a, I>(expenses: I, budgets: &BudgetBook, month: Option<Month>) -> Self
    where
        I: IntoIterator<Item = &'a Expense>,
    {
        let expenses: Vec<&Expense> = expenses.into_iter().collect();

        let rows = budgets
            .sorted()
            .into_iter()
            .filter(|b| month.map_or(true, |m| b.month == m))
            .map(|budget| {
                let spent: Money = expenses
                    .iter()
                    .filter(|e| budget.month.contains(e.date) && e.in_category(&budget.category))
                    .map(|e| e.amount)
                    .sum();

                BudgetStatusRow {
                    category: budget.category.clone(),
                    month: budget.month,
                    limit: budget.limit,
                    spent,
                    remaining: budget.limit - spent,
                    percent_used: (!budget.limit.is_zero())
                        .then(|| spent.percentage_of(budget.limit)),
                    over: spent > budget.limit,
                }
            })
            .collect();

        Self { month, rows }
    }

    /// Number of budgets that are over their limit
    pub fn over_count(&self) -> usize {
        self.rows.iter().filter(|r| r.over).count()
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self) -> String {
        let title = match self.month {
            Some(month) => format!("BUDGET STATUS: {} {}", month.name(), month.year()),
            None => "BUDGET STATUS".to_string(),
        };
        let mut output = title_block(&title, 78);

        if self.rows.is_empty() {
            output.push_str("No budgets configured\n");
            return output;
        }

        output.push_str(&format!(
            "{:<8} {:<20} {:>11} {:>11} {:>11} {:>7} {:<4}\n",
            "Month", "Category", "Limit", "Spent", "Remaining", "Used", ""
        ));
        output.push_str(&separator(78));
        output.push('\n');

        for row in &self.rows {
            let used = row
                .percent_used
                .map_or_else(|| "n/a".to_string(), format_percentage);
            output.push_str(&format!(
                "{:<8} {:<20} {:>11} {:>11} {:>11} {:>7} {:<4} {}\n",
                row.month,
                truncate(&row.category, 20),
                row.limit,
                row.spent,
                row.remaining,
                used,
                row.status(),
                format_bar(row.percent_used.unwrap_or(0.0).min(100.0), 100.0, 10)
            ));
        }

        let over = self.over_count();
        if over > 0 {
            output.push_str(&format!("\n{} budget(s) over limit\n", over));
        }

        output
    }

    /// Export the report to CSV format
    pub fn export_csv<W: Write>(&self, writer: &mut W) -> ExpenseResult<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record([
            "month",
            "category",
            "limit",
            "spent",
            "remaining",
            "percent_used",
            "over",
        ])
        .map_err(export_error)?;

        for row in &self.rows {
            csv.write_record([
                row.month.to_string(),
                row.category.clone(),
                row.limit.to_decimal_string(),
                row.spent.to_decimal_string(),
                row.remaining.to_decimal_string(),
                row.percent_used
                    .map(|p| format!("{:.2}", p))
                    .unwrap_or_default(),
                row.over.to_string(),
            ])
            .map_err(export_error)?;
        }

        csv.flush().map_err(export_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Budget;
    use chrono::NaiveDate;

    fn expense(month: u32, day: u32, cents: i64, category: &str) -> Expense {
        Expense::new(
            NaiveDate::from_ymd_opt(2024, month, day).unwrap(),
            Money::from_cents(cents),
            category,
            "",
        )
        .unwrap()
    }

    fn month(m: u32) -> Month {
        Month::new(2024, m).unwrap()
    }

    fn budgets() -> BudgetBook {
        let mut book = BudgetBook::new();
        book.set(Budget::new("Food", month(1), Money::from_cents(5000)).unwrap());
        book.set(Budget::new("Transport", month(1), Money::from_cents(2000)).unwrap());
        book.set(Budget::new("Food", month(2), Money::from_cents(1000)).unwrap());
        book
    }

    fn expenses() -> Vec<Expense> {
        vec![
            expense(1, 15, 2550, "Food"),
            expense(1, 20, 2700, "food"),
            expense(1, 22, 500, "Transport"),
            expense(2, 1, 400, "Food"),
        ]
    }

    #[test]
    fn test_over_and_under() {
        let report = BudgetStatusReport::generate(&expenses(), &budgets(), Some(month(1)));

        assert_eq!(report.rows.len(), 2);

        let food = &report.rows[0];
        assert_eq!(food.category, "Food");
        assert_eq!(food.spent, Money::from_cents(5250));
        assert_eq!(food.remaining, Money::from_cents(-250));
        assert!(food.over);
        assert!((food.percent_used.unwrap() - 105.0).abs() < 1e-9);

        let transport = &report.rows[1];
        assert_eq!(transport.spent, Money::from_cents(500));
        assert_eq!(transport.remaining, Money::from_cents(1500));
        assert!(!transport.over);
        assert_eq!(transport.status(), "OK");

        assert_eq!(report.over_count(), 1);
    }

    #[test]
    fn test_all_months() {
        let report = BudgetStatusReport::generate(&expenses(), &budgets(), None);

        assert_eq!(report.rows.len(), 3);
        assert_eq!(report.rows[2].month, month(2));
        assert_eq!(report.rows[2].spent, Money::from_cents(400));
    }

    #[test]
    fn test_exactly_at_limit_is_not_over() {
        let mut book = BudgetBook::new();
        book.set(Budget::new("Food", month(2), Money::from_cents(400)).unwrap());

        let report = BudgetStatusReport::generate(&expenses(), &book, None);
        assert!(!report.rows[0].over);
        assert_eq!(report.rows[0].remaining, Money::zero());
    }

    #[test]
    fn test_zero_limit() {
        let mut book = BudgetBook::new();
        book.set(Budget::new("Food", month(2), Money::zero()).unwrap());

        let report = BudgetStatusReport::generate(&expenses(), &book, None);
        assert_eq!(report.rows[0].percent_used, None);
        assert!(report.rows[0].over);
    }

    #[test]
    fn test_no_budgets() {
        let report = BudgetStatusReport::generate(&expenses(), &BudgetBook::new(), None);
        assert!(report.rows.is_empty());
        assert!(report.format_terminal().contains("No budgets configured"));
    }

    #[test]
    fn test_export_csv() {
        let report = BudgetStatusReport::generate(&expenses(), &budgets(), Some(month(1)));
        let mut buffer = Vec::new();
        report.export_csv(&mut buffer).unwrap();

        let output = String::from_utf8(buffer).unwrap();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines[0], "month,category,limit,spent,remaining,percent_used,over");
        assert_eq!(lines[1], "2024-01,Food,50.00,52.50,-2.50,105.00,true");
        assert_eq!(lines[2], "2024-01,Transport,20.00,5.00,15.00,25.00,false");
    }
}
