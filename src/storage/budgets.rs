//! Budget persistence
//!
//! Budgets live in budgets.json as `{ "budgets": [...] }`.

use std::path::Path;

use crate::error::{ExpenseError, ExpenseResult};
use crate::models::BudgetBook;

use super::file_io::{read_json, write_json_atomic};

/// Load budgets, returning an empty book when the file doesn't exist
pub fn load_budgets(path: &Path) -> ExpenseResult<BudgetBook> {
    let book: BudgetBook = read_json(path)?;
    book.validate()
        .map_err(|e| ExpenseError::CorruptData(format!("{}: {}", path.display(), e)))?;
    Ok(book)
}

/// Save budgets atomically
pub fn save_budgets(book: &BudgetBook, path: &Path) -> ExpenseResult<()> {
    write_json_atomic(path, book)
}
