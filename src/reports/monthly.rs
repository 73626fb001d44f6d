//! Monthly Reports
//!
//! Totals per calendar month, and a detailed summary of a single month.

use std::collections::BTreeMap;
use std::io::Write;

use crate::display::report::{format_bar, format_percentage, separator, title_block};
use crate::error::ExpenseResult;
use crate::models::{Expense, Money, Month, DATE_FORMAT};

use super::category::{CategoryBreakdown, CategoryRow};
use super::export_error;

/// Number of categories highlighted in a month summary
pub const TOP_CATEGORY_COUNT: usize = 3;

/// Spending in one month
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthTotal {
    pub month: Month,
    pub total: Money,
    pub count: usize,
}

/// Spending grouped by calendar month
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MonthlyTotals {
    /// One row per month with expenses, oldest first
    pub rows: Vec<MonthTotal>,
    /// Total across all months
    pub total: Money,
}

impl MonthlyTotals {
    /// Group expenses by month
    pub fn generate<'a, I>(expenses: I) -> Self
    where
        I: IntoIterator<Item = &'a Expense>,
    {
        let mut by_month: BTreeMap<Month, (Money, usize)> = BTreeMap::new();
        for expense in expenses {
            let entry = by_month
                .entry(Month::of(expense.date))
                .or_insert((Money::zero(), 0));
            entry.0 += expense.amount;
            entry.1 += 1;
        }

        let rows: Vec<MonthTotal> = by_month
            .into_iter()
            .map(|(month, (total, count))| MonthTotal {
                month,
                total,
                count,
            })
            .collect();
        let total = rows.iter().map(|r| r.total).sum();

        Self { rows, total }
    }

    /// Total for one month (zero if there were no expenses)
    pub fn get(&self, month: Month) -> Money {
        self.rows
            .iter()
            .find(|r| r.month == month)
            .map_or(Money::zero(), |r| r.total)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self) -> String {
        let mut output = title_block("MONTHLY TOTALS", 60);

        if self.rows.is_empty() {
            output.push_str("No expenses to display\n");
            return output;
        }

        let max = self
            .rows
            .iter()
            .map(|r| r.total.as_f64())
            .fold(0.0, f64::max);

        for row in &self.rows {
            output.push_str(&format!(
                "{:<8} {:>12} {:>5} {}\n",
                row.month,
                row.total,
                row.count,
                format_bar(row.total.as_f64(), max, 30)
            ));
        }

        output.push_str(&separator(60));
        output.push('\n');
        output.push_str(&format!("{:<8} {:>12}\n", "TOTAL", self.total));
        output
    }

    /// Export the report to CSV format
    pub fn export_csv<W: Write>(&self, writer: &mut W) -> ExpenseResult<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(["month", "total", "count"])
            .map_err(export_error)?;

        for row in &self.rows {
            csv.write_record([
                row.month.to_string(),
                row.total.to_decimal_string(),
                row.count.to_string(),
            ])
            .map_err(export_error)?;
        }

        csv.flush().map_err(export_error)?;
        Ok(())
    }
}

/// Detailed report for a single month
#[derive(Debug, Clone, PartialEq)]
pub struct MonthSummary {
    pub month: Month,
    /// Number of expenses in the month
    pub count: usize,
    /// Total spending in the month
    pub total: Money,
    /// Total divided by the number of days in the month
    pub average_per_day: Money,
    /// Per-category totals for the month
    pub categories: CategoryBreakdown,
    /// The month's expenses sorted by date
    pub expenses: Vec<Expense>,
}

impl MonthSummary {
    /// Summarise the expenses that fall in `month`
    pub fn generate<'a, I>(expenses: I, month: Month) -> Self
    where
        I: IntoIterator<Item = &'a Expense>,
    {
        let mut in_month: Vec<Expense> = expenses
            .into_iter()
            .filter(|e| month.contains(e.date))
            .cloned()
            .collect();
        // Stable sort keeps entry order for same-day expenses
        in_month.sort_by_key(|e| e.date);

        let categories = CategoryBreakdown::generate(&in_month);
        let total = categories.total;

        Self {
            month,
            count: in_month.len(),
            total,
            average_per_day: total.div_round(i64::from(month.days())),
            categories,
            expenses: in_month,
        }
    }

    /// The highest-spending categories of the month
    pub fn top_categories(&self) -> &[CategoryRow] {
        self.categories.top_categories(TOP_CATEGORY_COUNT)
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self) -> String {
        let mut output = title_block(
            &format!("MONTHLY REPORT: {} {}", self.month.name(), self.month.year()),
            60,
        );

        output.push_str("\nSummary:\n");
        output.push_str(&format!("  Expenses:       {}\n", self.count));
        output.push_str(&format!("  Total:          {}\n", self.total));
        output.push_str(&format!("  Average daily:  {}\n", self.average_per_day));

        output.push_str("\nTop categories:\n");
        if self.count == 0 {
            output.push_str("  No expenses for this month\n");
            return output;
        }
        for (rank, row) in self.top_categories().iter().enumerate() {
            output.push_str(&format!(
                "  {}. {}: {} ({})\n",
                rank + 1,
                row.category,
                row.total,
                format_percentage(row.percentage)
            ));
        }

        output.push_str("\nExpenses:\n");
        for expense in &self.expenses {
            output.push_str(&format!(
                "  {}  {:>10}  {}",
                expense.date.format(DATE_FORMAT),
                expense.amount,
                expense.category
            ));
            if !expense.description.is_empty() {
                output.push_str(&format!(" - {}", expense.description));
            }
            output.push('\n');
        }

        output
    }

    /// Export the month's category totals to CSV format
    pub fn export_csv<W: Write>(&self, writer: &mut W) -> ExpenseResult<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(["month", "category", "total", "count", "percentage"])
            .map_err(export_error)?;

        let month = self.month.to_string();
        for row in &self.categories.rows {
            csv.write_record([
                month.clone(),
                row.category.clone(),
                row.total.to_decimal_string(),
                row.count.to_string(),
                format!("{:.2}", row.percentage),
            ])
            .map_err(export_error)?;
        }

        csv.write_record([
            month,
            "TOTAL".to_string(),
            self.total.to_decimal_string(),
            self.count.to_string(),
            if self.count == 0 { "0.00" } else { "100.00" }.to_string(),
        ])
        .map_err(export_error)?;

        csv.flush().map_err(export_error)?;
        Ok(())
    }
}
