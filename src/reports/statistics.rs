//! Spending Statistics
//!
//! Overall figures plus totals by month and by day of week.

use std::io::Write;

use chrono::{Datelike, Weekday};

use crate::display::report::{format_bar, separator, title_block};
use crate::error::ExpenseResult;
use crate::models::{Expense, Money, DATE_FORMAT};

use super::export_error;
use super::monthly::{MonthTotal, MonthlyTotals};

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Full English name of a weekday
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Spending on one day of the week
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekdayTotal {
    pub weekday: Weekday,
    pub total: Money,
    pub count: usize,
}

/// Overall spending statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statistics {
    /// Number of expenses
    pub count: usize,
    /// Sum of all amounts
    pub total: Money,
    /// Mean amount, rounded to the cent
    pub mean: Money,
    /// Largest expense (first one on ties)
    pub largest: Option<Expense>,
    /// Smallest expense (first one on ties)
    pub smallest: Option<Expense>,
    /// Totals per month, oldest first
    pub by_month: Vec<MonthTotal>,
    /// Totals per weekday, Monday first; always seven entries
    pub by_weekday: Vec<WeekdayTotal>,
}

impl Statistics {
    /// Compute statistics over the given expenses
    pub fn generate<'a, I>(expenses: I) -> Self
    where
        I: IntoIterator<Item = &'a Expense>,
    {
        let expenses: Vec<&Expense> = expenses.into_iter().collect();

        let mut largest: Option<&Expense> = None;
        let mut smallest: Option<&Expense> = None;
        let mut by_weekday: Vec<WeekdayTotal> = WEEKDAYS
            .iter()
            .map(|&weekday| WeekdayTotal {
                weekday,
                total: Money::zero(),
                count: 0,
            })
            .collect();

        for &expense in &expenses {
            if largest.map_or(true, |l| expense.amount > l.amount) {
                largest = Some(expense);
            }
            if smallest.map_or(true, |s| expense.amount < s.amount) {
                smallest = Some(expense);
            }

            let day = &mut by_weekday[expense.date.weekday().num_days_from_monday() as usize];
            day.total += expense.amount;
            day.count += 1;
        }

        let total: Money = expenses.iter().map(|e| e.amount).sum();

        Self {
            count: expenses.len(),
            total,
            mean: mean_of(&expenses),
            largest: largest.cloned(),
            smallest: smallest.cloned(),
            by_month: MonthlyTotals::generate(expenses.iter().copied()).rows,
            by_weekday,
        }
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self) -> String {
        let mut output = title_block("EXPENSE STATISTICS", 60);

        output.push_str(&format!("  Total expenses:  {}\n", self.count));
        output.push_str(&format!("  Total amount:    {}\n", self.total));
        output.push_str(&format!("  Average expense: {}\n", self.mean));

        if let Some(largest) = &self.largest {
            output.push_str(&format!("  Largest:         {}\n", describe(largest)));
        }
        if let Some(smallest) = &self.smallest {
            output.push_str(&format!("  Smallest:        {}\n", describe(smallest)));
        }

        if self.count == 0 {
            return output;
        }

        output.push_str("\nBy month:\n");
        output.push_str(&separator(60));
        output.push('\n');
        for row in &self.by_month {
            output.push_str(&format!(
                "  {:<10} {:>12} {:>5}\n",
                row.month, row.total, row.count
            ));
        }

        output.push_str("\nBy day of week:\n");
        output.push_str(&separator(60));
        output.push('\n');
        let max = self
            .by_weekday
            .iter()
            .map(|d| d.total.as_f64())
            .fold(0.0, f64::max);
        for day in &self.by_weekday {
            output.push_str(&format!(
                "  {:<10} {:>12} {:>5} {}\n",
                weekday_name(day.weekday),
                day.total,
                day.count,
                format_bar(day.total.as_f64(), max, 20)
            ));
        }

        output
    }

    /// Export the report to CSV format
    ///
    /// One row per statistic, then one per month and one per weekday.
    pub fn export_csv<W: Write>(&self, writer: &mut W) -> ExpenseResult<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(["group", "key", "total", "count"])
            .map_err(export_error)?;

        let amount = |e: &Option<Expense>| {
            e.as_ref()
                .map(|e| e.amount.to_decimal_string())
                .unwrap_or_default()
        };

        let summary = [
            ("total", self.total.to_decimal_string(), self.count.to_string()),
            ("mean", self.mean.to_decimal_string(), String::new()),
            ("largest", amount(&self.largest), String::new()),
            ("smallest", amount(&self.smallest), String::new()),
        ];
        for (key, total, count) in summary {
            csv.write_record(["overall", key, total.as_str(), count.as_str()])
                .map_err(export_error)?;
        }

        for row in &self.by_month {
            csv.write_record([
                "month".to_string(),
                row.month.to_string(),
                row.total.to_decimal_string(),
                row.count.to_string(),
            ])
            .map_err(export_error)?;
        }

        for day in &self.by_weekday {
            csv.write_record([
                "weekday".to_string(),
                weekday_name(day.weekday).to_string(),
                day.total.to_decimal_string(),
                day.count.to_string(),
            ])
            .map_err(export_error)?;
        }

        csv.flush().map_err(export_error)?;
        Ok(())
    }
}

fn describe(expense: &Expense) -> String {
    format!(
        "{} on {} ({})",
        expense.amount,
        expense.date.format(DATE_FORMAT),
        expense.category
    )
}

/// Mean amount rounded half up, exact even when the saturating total is not
fn mean_of(expenses: &[&Expense]) -> Money {
    if expenses.is_empty() {
        return Money::zero();
    }
    let n = expenses.len() as i128;
    let sum: i128 = expenses.iter().map(|e| i128::from(e.amount.cents())).sum();
    let mean = (sum + n / 2).div_euclid(n);
    Money::from_cents(i64::try_from(mean).unwrap_or(i64::MAX))
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
            // Monday
            expense(1, 15, 2550, "Food"),
            // Saturday
            expense(1, 20, 2700, "Food"),
            // Thursday
            expense(2, 1, 1500, "Transport"),
        ]
    }

    #[test]
    fn test_basic_statistics() {
        let stats = Statistics::generate(&sample());

        assert_eq!(stats.count, 3);
        assert_eq!(stats.total, Money::from_cents(6750));
        assert_eq!(stats.mean, Money::from_cents(2250));
        assert_eq!(stats.largest.as_ref().unwrap().amount, Money::from_cents(2700));
        assert_eq!(stats.smallest.as_ref().unwrap().amount, Money::from_cents(1500));
    }

    #[test]
    fn test_reports_over_maximum_amounts() {
        use crate::models::MAX_AMOUNT_CENTS;
        use crate::reports::CategoryBreakdown;

        // Enough maximum-size expenses to push the total past i64::MAX
        let expenses: Vec<Expense> = (0..10_000)
            .map(|i| expense(1 + (i % 12) as u32, 1, MAX_AMOUNT_CENTS, "Food"))
            .collect();

        let stats = Statistics::generate(&expenses);
        assert_eq!(stats.total, Money::from_cents(i64::MAX));
        assert_eq!(stats.mean, Money::from_cents(MAX_AMOUNT_CENTS));
        assert!(!stats.format_terminal().is_empty());
        let mut csv = Vec::new();
        stats.export_csv(&mut csv).unwrap();

        let breakdown = CategoryBreakdown::generate(&expenses);
        assert_eq!(breakdown.rows[0].count, 10_000);
        assert!((breakdown.rows[0].percentage - 100.0).abs() < 1e-9);
        assert!(!breakdown.format_terminal().is_empty());

        let two = [
            expense(1, 1, MAX_AMOUNT_CENTS, "Food"),
            expense(1, 2, MAX_AMOUNT_CENTS, "Food"),
        ];
        assert_eq!(
            Statistics::generate(&two).total,
            Money::from_cents(2 * MAX_AMOUNT_CENTS)
        );
    }

    #[test]
    fn test_by_month_and_weekday() {
        let stats = Statistics::generate(&sample());

        assert_eq!(stats.by_month.len(), 2);
        assert_eq!(stats.by_month[0].total, Money::from_cents(5250));

        assert_eq!(stats.by_weekday.len(), 7);
        assert_eq!(stats.by_weekday[0].weekday, Weekday::Mon);
        assert_eq!(stats.by_weekday[0].total, Money::from_cents(2550));
        assert_eq!(stats.by_weekday[3].total, Money::from_cents(1500));
        assert_eq!(stats.by_weekday[5].total, Money::from_cents(2700));
        assert_eq!(stats.by_weekday[6].count, 0);
    }

    #[test]
    fn test_ties_keep_first() {
        let expenses = vec![expense(1, 1, 500, "A"), expense(1, 2, 500, "B")];
        let stats = Statistics::generate(&expenses);

        assert_eq!(stats.largest.unwrap().category, "A");
        assert_eq!(stats.smallest.unwrap().category, "A");
    }

    #[test]
    fn test_empty_statistics() {
        let stats = Statistics::generate(&Vec::<Expense>::new());

        assert_eq!(stats.count, 0);
        assert_eq!(stats.total, Money::zero());
        assert_eq!(stats.mean, Money::zero());
        assert!(stats.largest.is_none());
        assert!(stats.by_month.is_empty());
        assert!(stats.by_weekday.iter().all(|d| d.count == 0));
    }

    #[test]
    fn test_export_csv() {
        let mut buffer = Vec::new();
        Statistics::generate(&sample())
            .export_csv(&mut buffer)
            .unwrap();

        let output = String::from_utf8(buffer).unwrap();
        assert!(output.starts_with("group,key,total,count\noverall,total,67.50,3\n"));
        assert!(output.contains("month,2024-02,15.00,1\n"));
        assert!(output.contains("weekday,Monday,25.50,1\n"));
    }

    #[test]
    fn test_format_terminal() {
        let output = Statistics::generate(&sample()).format_terminal();
        assert!(output.contains("Average expense: $22.50"));
        assert!(output.contains("Saturday"));
    }
}
