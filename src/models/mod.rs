//! Core data models for the finance tracker
//!
//! This module contains the data structures of the expense domain: expenses,
//! categories, budgets, months and money.

pub mod budget;
pub mod category;
pub mod collection;
pub mod expense;
pub mod ids;
pub mod money;
pub mod month;

pub use budget::{Budget, BudgetBook, BudgetValidationError};
pub use category::{same_category, CategoryList, CategoryValidationError, DEFAULT_CATEGORIES};
pub use collection::{DuplicateIdError, ExpenseCollection};
pub use expense::{parse_date, parse_tags, Expense, ExpenseRecord, ExpenseValidationError, DATE_FORMAT};
pub use ids::{EmptyIdError, ExpenseId};
pub use money::{Money, MoneyParseError, MAX_AMOUNT_CENTS};
pub use month::{Month, MonthParseError};
