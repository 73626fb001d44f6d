//! Shared argument parsing
//!
//! Converts user text into typed values, reporting bad input as validation
//! errors so interactive prompts can ask again.

use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::Args;

use crate::error::{ExpenseError, ExpenseResult};
use crate::models::{self, Money, Month};
use crate::services::SearchFilter;

/// Parse an amount such as "12.50" or "$1,250"
pub fn parse_amount(s: &str) -> ExpenseResult<Money> {
    let amount = Money::parse(s).map_err(|e| {
        ExpenseError::Validation(format!("Invalid amount '{}': {}", s.trim(), e))
    })?;
    if amount.is_negative() {
        return Err(ExpenseError::Validation(format!(
            "Amount cannot be negative: {}",
            amount
        )));
    }
    Ok(amount)
}

/// Parse a `YYYY-MM-DD` date; empty input means today
pub fn parse_date_or_today(s: &str) -> ExpenseResult<NaiveDate> {
    if s.trim().is_empty() {
        return Ok(Local::now().date_naive());
    }
    Ok(models::parse_date(s)?)
}

/// Parse a `YYYY-MM` month; empty input means the current month
pub fn parse_month_or_current(s: &str) -> ExpenseResult<Month> {
    if s.trim().is_empty() {
        return Ok(Month::current());
    }
    Month::parse(s).map_err(|e| ExpenseError::Validation(e.to_string()))
}

/// Parse an optional month argument
pub fn parse_optional_month(s: Option<&str>) -> ExpenseResult<Option<Month>> {
    s.map(|s| Month::parse(s).map_err(|e| ExpenseError::Validation(e.to_string())))
        .transpose()
}

/// Filters shared by listing, searching, exporting and reports
#[derive(Args, Debug, Default, Clone)]
pub struct FilterArgs {
    /// Earliest date to include (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,

    /// Latest date to include (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<String>,

    /// Only this month (YYYY-MM)
    #[arg(short, long)]
    pub month: Option<String>,

    /// Only this category (case-insensitive)
    #[arg(short, long)]
    pub category: Option<String>,

    /// Text to find in description, category or tags
    #[arg(short, long)]
    pub text: Option<String>,

    /// Smallest amount to include
    #[arg(long)]
    pub min: Option<String>,

    /// Largest amount to include
    #[arg(long)]
    pub max: Option<String>,
}

impl FilterArgs {
    /// Build a search filter, validating every field
    pub fn to_filter(&self) -> ExpenseResult<SearchFilter> {
        let mut filter = SearchFilter::new();

        if let Some(from) = &self.from {
            filter = filter.since(models::parse_date(from)?);
        }
        if let Some(to) = &self.to {
            filter = filter.until(models::parse_date(to)?);
        }
        if let (Some(start), Some(end)) = (filter.start_date, filter.end_date) {
            if start > end {
                return Err(ExpenseError::Validation(format!(
                    "Start date {} is after end date {}",
                    start, end
                )));
            }
        }
        if let Some(month) = parse_optional_month(self.month.as_deref())? {
            filter = filter.month(month);
        }
        if let Some(category) = &self.category {
            filter = filter.category(category.as_str());
        }
        if let Some(text) = &self.text {
            filter = filter.text(text.as_str());
        }

        let min = self.min.as_deref().map(parse_amount).transpose()?;
        let max = self.max.as_deref().map(parse_amount).transpose()?;
        if min.is_some() || max.is_some() {
            filter = filter.amount_range(min, max);
        }

        Ok(filter)
    }
}

/// Optional CSV output path for reports
#[derive(Args, Debug, Default, Clone)]
pub struct OutputArgs {
    /// Write the report as CSV to this file instead of printing it
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
