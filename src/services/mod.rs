//! Service layer for the finance tracker
//!
//! The service layer owns the in-memory expense collection and applies
//! validation and category bookkeeping on top of the models.

pub mod expense;

pub use expense::{ExpenseManager, ImportResult, SearchFilter};
