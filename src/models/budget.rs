//! Budget model
//!
//! A budget is a spending limit for one category in one calendar month.
//! Budgets live apart from expenses until a report joins them.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::category::{
    normalize_category, same_category, validate_category_name, CategoryValidationError,
};
use super::money::Money;
use super::month::Month;

/// A spending limit for a category in a month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    /// Category the limit applies to
    pub category: String,

    /// Month the limit applies to
    pub month: Month,

    /// Maximum planned spending
    pub limit: Money,
}

impl Budget {
    /// Create a validated budget
    pub fn new(
        category: impl Into<String>,
        month: Month,
        limit: Money,
    ) -> Result<Self, BudgetValidationError> {
        let budget = Self {
            category: normalize_category(&category.into()),
            month,
            limit,
        };
        budget.validate()?;
        Ok(budget)
    }

    /// Validate the budget
    pub fn validate(&self) -> Result<(), BudgetValidationError> {
        // Budgeted amount cannot be negative
        if self.limit.is_negative() {
            return Err(BudgetValidationError::NegativeLimit);
        }

        validate_category_name(&self.category).map_err(BudgetValidationError::Category)
    }

    /// Whether this budget is keyed by the given (category, month)
    pub fn is_for(&self, category: &str, month: Month) -> bool {
        self.month == month && same_category(&self.category, category)
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.month, self.category, self.limit)
    }
}

/// All configured budgets, keyed by (category, month)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetBook {
    #[serde(default)]
    budgets: Vec<Budget>,
}

impl BudgetBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the limit for (category, month), replacing any existing limit
    ///
    /// Returns the previous budget if one was replaced.
    pub fn set(&mut self, budget: Budget) -> Option<Budget> {
        match self
            .budgets
            .iter_mut()
            .find(|b| b.is_for(&budget.category, budget.month))
        {
            Some(existing) => Some(std::mem::replace(existing, budget)),
            None => {
                self.budgets.push(budget);
                None
            }
        }
    }

    /// Remove the budget for (category, month)
    pub fn remove(&mut self, category: &str, month: Month) -> Option<Budget> {
        let index = self.budgets.iter().position(|b| b.is_for(category, month))?;
        Some(self.budgets.remove(index))
    }

    /// Look up the budget for (category, month)
    pub fn get(&self, category: &str, month: Month) -> Option<&Budget> {
        self.budgets.iter().find(|b| b.is_for(category, month))
    }

    /// Budgets for a single month
    pub fn for_month(&self, month: Month) -> impl Iterator<Item = &Budget> {
        self.budgets.iter().filter(move |b| b.month == month)
    }

    /// All budgets ordered by month, then category
    pub fn sorted(&self) -> Vec<&Budget> {
        let mut budgets: Vec<_> = self.budgets.iter().collect();
        budgets.sort_by(|a, b| {
            a.month
                .cmp(&b.month)
                .then_with(|| a.category.to_lowercase().cmp(&b.category.to_lowercase()))
        });
        budgets
    }

    pub fn iter(&self) -> impl Iterator<Item = &Budget> {
        self.budgets.iter()
    }

    pub fn len(&self) -> usize {
        self.budgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.budgets.is_empty()
    }

    /// Validate every budget and reject duplicate (category, month) keys
    pub fn validate(&self) -> Result<(), BudgetValidationError> {
        for (i, budget) in self.budgets.iter().enumerate() {
            budget.validate()?;
            if self.budgets[..i]
                .iter()
                .any(|b| b.is_for(&budget.category, budget.month))
            {
                return Err(BudgetValidationError::Duplicate {
                    category: budget.category.clone(),
                    month: budget.month,
                });
            }
        }
        Ok(())
    }
}

/// Validation errors for budgets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BudgetValidationError {
    NegativeLimit,
    Category(CategoryValidationError),
    Duplicate { category: String, month: Month },
}

impl fmt::Display for BudgetValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativeLimit => write!(f, "Budget limit cannot be negative"),
            Self::Category(e) => write!(f, "{}", e),
            Self::Duplicate { category, month } => {
                write!(f, "Duplicate budget for '{}' in {}", category, month)
            }
        }
    }
}

impl std::error::Error for BudgetValidationError {}

impl From<BudgetValidationError> for crate::error::ExpenseError {
    fn from(err: BudgetValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jan() -> Month {
        Month::new(2024, 1).unwrap()
    }

    #[test]
    fn test_new_budget() {
        let budget = Budget::new(" Food ", jan(), Money::from_cents(20000)).unwrap();
        assert_eq!(budget.category, "Food");
        assert_eq!(budget.limit.cents(), 20000);
    }

    #[test]
    fn test_negative_limit_rejected() {
        assert_eq!(
            Budget::new("Food", jan(), Money::from_cents(-1)),
            Err(BudgetValidationError::NegativeLimit)
        );
    }

    #[test]
    fn test_set_replaces_existing() {
        let mut book = BudgetBook::new();
        assert!(book
            .set(Budget::new("Food", jan(), Money::from_cents(100)).unwrap())
            .is_none());
        let previous = book
            .set(Budget::new("food", jan(), Money::from_cents(200)).unwrap())
            .unwrap();

        assert_eq!(previous.limit.cents(), 100);
        assert_eq!(book.len(), 1);
        assert_eq!(book.get("FOOD", jan()).unwrap().limit.cents(), 200);
    }

    #[test]
    fn test_same_category_different_months() {
        let mut book = BudgetBook::new();
        book.set(Budget::new("Food", jan(), Money::from_cents(100)).unwrap());
        book.set(Budget::new("Food", jan().next(), Money::from_cents(300)).unwrap());

        assert_eq!(book.len(), 2);
        assert_eq!(book.for_month(jan()).count(), 1);
        assert_eq!(book.sorted()[1].month, jan().next());
    }

    #[test]
    fn test_remove() {
        let mut book = BudgetBook::new();
        book.set(Budget::new("Food", jan(), Money::from_cents(100)).unwrap());
        assert!(book.remove("Travel", jan()).is_none());
        assert!(book.remove("food", jan()).is_some());
        assert!(book.is_empty());
    }

    #[test]
    fn test_serde_layout() {
        let mut book = BudgetBook::new();
        book.set(Budget::new("Food", jan(), Money::from_cents(25050)).unwrap());

        let value = serde_json::to_value(&book).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"budgets": [{"category": "Food", "month": "2024-01", "limit": 250.5}]})
        );
    }

    #[test]
    fn test_validate_detects_duplicates() {
        let json = r#"{"budgets": [
            {"category": "Food", "month": "2024-01", "limit": 1},
            {"category": "food", "month": "2024-01", "limit": 2}
        ]}"#;
        let book: BudgetBook = serde_json::from_str(json).unwrap();
        assert!(matches!(
            book.validate(),
            Err(BudgetValidationError::Duplicate { .. })
        ));
    }
}
