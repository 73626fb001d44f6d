//! Reports module for the finance tracker
//!
//! Reports are computed from any iterator of expenses (the whole collection
//! or a search result) and never modify it. Each renders for the terminal
//! and exports CSV.

pub mod budget_status;
pub mod category;
pub mod monthly;
pub mod statistics;

pub use budget_status::{BudgetStatusReport, BudgetStatusRow};
pub use category::{CategoryBreakdown, CategoryRow};
pub use monthly::{MonthSummary, MonthTotal, MonthlyTotals};
pub use statistics::{Statistics, WeekdayTotal};

use crate::error::ExpenseError;

fn export_error(err: impl std::fmt::Display) -> ExpenseError {
    ExpenseError::Export(err.to_string())
}
