//! Expense model
//!
//! An expense is a single spending event. Records read from disk or CSV pass
//! through [`ExpenseRecord`] and are validated when converted into an
//! [`Expense`], so an `Expense` value always satisfies its invariants.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::category::{normalize_category, same_category, CategoryValidationError};
use super::ids::ExpenseId;
use super::money::{Money, MAX_AMOUNT_CENTS};

/// Date format used on disk and for user input
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single recorded expense
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ExpenseRecord")]
pub struct Expense {
    /// Unique identifier
    pub id: ExpenseId,

    /// When the money was spent
    pub date: NaiveDate,

    /// Amount spent (never negative)
    pub amount: Money,

    /// Category name
    pub category: String,

    /// Free-text description (may be empty)
    #[serde(default)]
    pub description: String,

    /// Optional labels
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Expense {
    /// Create a new expense with a fresh id
    pub fn new(
        date: NaiveDate,
        amount: Money,
        category: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, ExpenseValidationError> {
        Self::with_id(ExpenseId::new(), date, amount, category, description)
    }

    /// Create an expense with a known id (used when loading stored data)
    pub fn with_id(
        id: ExpenseId,
        date: NaiveDate,
        amount: Money,
        category: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, ExpenseValidationError> {
        let expense = Self {
            id,
            date,
            amount,
            category: normalize_category(&category.into()),
            description: description.into().trim().to_string(),
            tags: Vec::new(),
        };
        expense.validate()?;
        Ok(expense)
    }

    /// Attach tags, trimming whitespace and dropping empty or repeated entries
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags = normalize_tags(tags);
        self
    }

    /// Validate the expense
    pub fn validate(&self) -> Result<(), ExpenseValidationError> {
        if self.amount.is_negative() {
            return Err(ExpenseValidationError::NegativeAmount(self.amount));
        }
        if self.amount.exceeds_limit() {
            return Err(ExpenseValidationError::AmountTooLarge(self.amount));
        }

        super::category::validate_category_name(&self.category)
            .map_err(ExpenseValidationError::Category)?;

        Ok(())
    }

    /// Case-insensitive check whether the expense mentions `needle`
    ///
    /// Looks at the description, category and tags.
    pub fn matches_text(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.description.to_lowercase().contains(&needle)
            || self.category.to_lowercase().contains(&needle)
            || self.tags.iter().any(|t| t.to_lowercase().contains(&needle))
    }

    /// Case-insensitive category comparison
    pub fn in_category(&self, category: &str) -> bool {
        same_category(&self.category, category)
    }
}

impl fmt::Display for Expense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} - {}",
            self.date.format(DATE_FORMAT),
            self.amount,
            self.category
        )?;
        if !self.description.is_empty() {
            write!(f, ": {}", self.description)?;
        }
        Ok(())
    }
}

/// Unvalidated expense as it appears on disk
///
/// Dates are kept as text so a bad date becomes a validation error naming
/// the record instead of an opaque parse failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: String,
    pub date: String,
    pub amount: f64,
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl TryFrom<ExpenseRecord> for Expense {
    type Error = ExpenseValidationError;

    fn try_from(record: ExpenseRecord) -> Result<Self, Self::Error> {
        let id: ExpenseId = record
            .id
            .parse()
            .map_err(|_| ExpenseValidationError::InvalidId(record.id.clone()))?;
        let date = parse_date(&record.date)?;
        let amount = Money::from_decimal(record.amount)
            .ok_or_else(|| ExpenseValidationError::InvalidAmount(record.amount.to_string()))?;

        Ok(Self::with_id(id, date, amount, record.category, record.description)?
            .with_tags(record.tags))
    }
}

impl From<&Expense> for ExpenseRecord {
    fn from(expense: &Expense) -> Self {
        Self {
            id: expense.id.full(),
            date: expense.date.format(DATE_FORMAT).to_string(),
            amount: expense.amount.as_f64(),
            category: expense.category.clone(),
            description: expense.description.clone(),
            tags: expense.tags.clone(),
        }
    }
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(s: &str) -> Result<NaiveDate, ExpenseValidationError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| ExpenseValidationError::InvalidDate(s.to_string()))
}

/// Split a comma-separated tag list
pub fn parse_tags(s: &str) -> Vec<String> {
    normalize_tags([s])
}

fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    // Tags travel through CSV as one comma-joined field, so a tag never holds a comma
    for tag in tags.into_iter().flat_map(|t| {
        t.as_ref()
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect::<Vec<_>>()
    }) {
        let folded = tag.to_lowercase();
        if !out.iter().any(|t| t.to_lowercase() == folded) {
            out.push(tag);
        }
    }
    out
}

/// Validation errors for expenses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpenseValidationError {
    NegativeAmount(Money),
    AmountTooLarge(Money),
    InvalidAmount(String),
    InvalidDate(String),
    InvalidId(String),
    Category(CategoryValidationError),
}

impl fmt::Display for ExpenseValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativeAmount(amount) => {
                write!(f, "Amount must not be negative (got {})", amount)
            }
            Self::AmountTooLarge(amount) => write!(
                f,
                "Amount too large: {} (limit {})",
                amount,
                Money::from_cents(MAX_AMOUNT_CENTS)
            ),
            Self::InvalidAmount(s) => write!(f, "Invalid amount: {}", s),
            Self::InvalidDate(s) => write!(f, "Invalid date '{}': use YYYY-MM-DD", s),
            Self::InvalidId(s) => write!(f, "Invalid expense id: {}", s),
            Self::Category(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ExpenseValidationError {}

impl From<ExpenseValidationError> for crate::error::ExpenseError {
    fn from(err: ExpenseValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}
