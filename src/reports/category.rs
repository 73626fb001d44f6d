//! Category Breakdown Report
//!
//! Totals, counts and share of spending per category.

use std::io::Write;

use crate::display::report::{format_bar, format_percentage, separator, title_block, truncate};
use crate::error::ExpenseResult;
use crate::models::{same_category, Expense, Money};

use super::export_error;

/// Spending for one category
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRow {
    /// Category name (first spelling seen)
    pub category: String,
    /// Total spending
    pub total: Money,
    /// Number of expenses
    pub count: usize,
    /// Percentage of total spending
    pub percentage: f64,
}

/// Category Breakdown Report
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CategoryBreakdown {
    /// Rows sorted by total descending, then name
    pub rows: Vec<CategoryRow>,
    /// Total spending across all categories
    pub total: Money,
    /// Total expense count
    pub count: usize,
}

impl CategoryBreakdown {
    /// Break down spending over the given expenses
    ///
    /// Only categories that have expenses appear.
    pub fn generate<'a, I>(expenses: I) -> Self
    where
        I: IntoIterator<Item = &'a Expense>,
    {
        Self::from_rows(totals_by_category(expenses))
    }

    /// Break down spending, listing every category in `categories`
    ///
    /// Listed categories without expenses appear with zero totals.
    pub fn generate_with_categories<'a, I, C, S>(expenses: I, categories: C) -> Self
    where
        I: IntoIterator<Item = &'a Expense>,
        C: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut rows = totals_by_category(expenses);
        for name in categories {
            let name = name.as_ref();
            if !rows.iter().any(|r| same_category(&r.category, name)) {
                rows.push(CategoryRow {
                    category: name.to_string(),
                    total: Money::zero(),
                    count: 0,
                    percentage: 0.0,
                });
            }
        }
        Self::from_rows(rows)
    }

    fn from_rows(mut rows: Vec<CategoryRow>) -> Self {
        let total: Money = rows.iter().map(|r| r.total).sum();
        let count = rows.iter().map(|r| r.count).sum();

        for row in &mut rows {
            row.percentage = row.total.percentage_of(total);
        }

        rows.sort_by(|a, b| {
            b.total
                .cmp(&a.total)
                .then_with(|| a.category.to_lowercase().cmp(&b.category.to_lowercase()))
        });

        Self { rows, total, count }
    }

    /// Whether there is nothing to report
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Look up a category, ignoring case
    pub fn get(&self, category: &str) -> Option<&CategoryRow> {
        self.rows
            .iter()
            .find(|r| same_category(&r.category, category))
    }

    /// Get top spending categories
    pub fn top_categories(&self, limit: usize) -> &[CategoryRow] {
        &self.rows[..limit.min(self.rows.len())]
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self) -> String {
        let mut output = title_block("CATEGORY BREAKDOWN", 70);

        if self.count == 0 {
            output.push_str("No expenses to display\n");
            return output;
        }

        let max = self
            .rows
            .first()
            .map_or(0.0, |r| r.total.as_f64());

        for row in &self.rows {
            output.push_str(&format!(
                "{:<22} {:>12} {:>4} {:>7} {}\n",
                truncate(&row.category, 22),
                row.total,
                row.count,
                format_percentage(row.percentage),
                format_bar(row.total.as_f64(), max, 20)
            ));
        }

        output.push_str(&separator(70));
        output.push('\n');
        output.push_str(&format!(
            "{:<22} {:>12} {:>4} {:>7}\n",
            "TOTAL",
            self.total,
            self.count,
            format_percentage(100.0)
        ));

        output
    }

    /// Export the report to CSV format
    pub fn export_csv<W: Write>(&self, writer: &mut W) -> ExpenseResult<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(["category", "total", "count", "percentage"])
            .map_err(export_error)?;

        for row in &self.rows {
            csv.write_record([
                row.category.clone(),
                row.total.to_decimal_string(),
                row.count.to_string(),
                format!("{:.2}", row.percentage),
            ])
            .map_err(export_error)?;
        }

        csv.flush().map_err(export_error)?;
        Ok(())
    }
}

/// Sum expenses per category, grouping names case-insensitively
///
/// Rows keep the order categories were first seen; percentages are left at
/// zero.
pub(crate) fn totals_by_category<'a, I>(expenses: I) -> Vec<CategoryRow>
where
    I: IntoIterator<Item = &'a Expense>,
{
    let mut rows: Vec<CategoryRow> = Vec::new();

    for expense in expenses {
        match rows.iter_mut().find(|r| expense.in_category(&r.category)) {
            Some(row) => {
                row.total += expense.amount;
                row.count += 1;
            }
            None => rows.push(CategoryRow {
                category: expense.category.clone(),
                total: expense.amount,
                count: 1,
                percentage: 0.0,
            }),
        }
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
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

    fn sample() -> Vec<Expense> {
        vec![
            expense(1, 15, 2550, "Food"),
            expense(1, 20, 2700, "Food"),
            expense(2, 1, 1500, "Transport"),
        ]
    }

    #[test]
    fn test_breakdown_totals_and_percentages() {
        let report = CategoryBreakdown::generate(&sample());

        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[0].category, "Food");
        assert_eq!(report.rows[0].total, Money::from_cents(5250));
        assert_eq!(report.rows[0].count, 2);
        assert!((report.rows[0].percentage - 77.78).abs() < 0.01);
        assert_eq!(report.rows[1].category, "Transport");
        assert!((report.rows[1].percentage - 22.22).abs() < 0.01);
        assert_eq!(report.total, Money::from_cents(6750));
    }

    #[test]
    fn test_percentages_sum_to_100() {
        let expenses = vec![
            expense(1, 1, 333, "A"),
            expense(1, 2, 333, "B"),
            expense(1, 3, 334, "C"),
            expense(1, 4, 1, "D"),
        ];
        let report = CategoryBreakdown::generate(&expenses);

        let sum: f64 = report.rows.iter().map(|r| r.percentage).sum();
        assert!((sum - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_sorted_by_total_then_name() {
        let expenses = vec![
            expense(1, 1, 500, "Zoo"),
            expense(1, 2, 500, "apples"),
            expense(1, 3, 900, "Rent"),
        ];
        let report = CategoryBreakdown::generate(&expenses);

        let names: Vec<_> = report.rows.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(names, vec!["Rent", "apples", "Zoo"]);
    }

    #[test]
    fn test_categories_group_ignoring_case() {
        let expenses = vec![expense(1, 1, 100, "Food"), expense(1, 2, 200, "food")];
        let report = CategoryBreakdown::generate(&expenses);

        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].category, "Food");
        assert_eq!(report.rows[0].count, 2);
    }

    #[test]
    fn test_listed_categories_appear_with_zero() {
        let report = CategoryBreakdown::generate_with_categories(&sample(), ["Food", "Travel"]);

        let travel = report.get("travel").unwrap();
        assert_eq!(travel.total, Money::zero());
        assert_eq!(travel.count, 0);
        assert_eq!(report.rows.last().unwrap().category, "Travel");
        // Unlisted categories with expenses are still reported
        assert!(report.get("Transport").is_some());
    }

    #[test]
    fn test_empty_input() {
        let report = CategoryBreakdown::generate(&Vec::<Expense>::new());

        assert!(report.is_empty());
        assert_eq!(report.total, Money::zero());
        assert!(report.format_terminal().contains("No expenses"));
    }

    #[test]
    fn test_top_categories() {
        let report = CategoryBreakdown::generate(&sample());
        assert_eq!(report.top_categories(1).len(), 1);
        assert_eq!(report.top_categories(10).len(), 2);
    }

    #[test]
    fn test_export_csv() {
        let report = CategoryBreakdown::generate(&sample());
        let mut buffer = Vec::new();
        report.export_csv(&mut buffer).unwrap();

        let output = String::from_utf8(buffer).unwrap();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines[0], "category,total,count,percentage");
        assert_eq!(lines[1], "Food,52.50,2,77.78");
        assert_eq!(lines[2], "Transport,15.00,1,22.22");
    }

    #[test]
    fn test_format_terminal() {
        let output = CategoryBreakdown::generate(&sample()).format_terminal();
        assert!(output.contains("Food"));
        assert!(output.contains("$52.50"));
        assert!(output.contains("77.8%"));
        assert!(output.contains("$67.50"));
    }
}
