//! Expense store persistence
//!
//! The store is a JSON array of expense records. The older layout, an object
//! with an `expenses` array next to a `metadata` block, is still accepted on
//! load; saves always write the array form.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{ExpenseError, ExpenseResult};
use crate::models::{Expense, ExpenseCollection, ExpenseRecord};

use super::file_io::write_json_atomic;

/// Top-level shapes a store file may take
#[derive(Deserialize)]
#[serde(untagged)]
enum StoreFile {
    Records(Vec<Value>),
    Legacy { expenses: Vec<Value> },
}

/// Load the expense collection stored at `path`
///
/// A missing file is `NotFound`; malformed JSON, an invalid record or a
/// repeated id is `CorruptData`.
pub fn load_expenses(path: &Path) -> ExpenseResult<ExpenseCollection> {
    if !path.exists() {
        return Err(ExpenseError::file_not_found(path.display().to_string()));
    }

    let contents = fs::read_to_string(path)
        .map_err(|e| ExpenseError::Io(format!("Failed to read {}: {}", path.display(), e)))?;

    let collection = decode_expenses(&contents)
        .map_err(|e| ExpenseError::CorruptData(format!("{}: {}", path.display(), e)))?;

    tracing::debug!(path = %path.display(), count = collection.len(), "loaded expenses");
    Ok(collection)
}

/// Decode store contents into a validated collection
///
/// The error string names the offending record (1-based).
pub fn decode_expenses(contents: &str) -> Result<ExpenseCollection, String> {
    let file: StoreFile = serde_json::from_str(contents).map_err(|e| {
        format!("expected a list of expenses: {}", e)
    })?;

    let values = match file {
        StoreFile::Records(values) => values,
        StoreFile::Legacy { expenses } => expenses,
    };

    let mut expenses = Vec::with_capacity(values.len());
    for (index, value) in values.into_iter().enumerate() {
        let record: ExpenseRecord = serde_json::from_value(value)
            .map_err(|e| format!("record {}: {}", index + 1, e))?;
        let expense =
            Expense::try_from(record).map_err(|e| format!("record {}: {}", index + 1, e))?;
        expenses.push(expense);
    }

    ExpenseCollection::from_expenses(expenses).map_err(|e| e.to_string())
}

/// Write the collection to `path` as a JSON array, atomically
pub fn save_expenses(collection: &ExpenseCollection, path: &Path) -> ExpenseResult<()> {
    let records: Vec<ExpenseRecord> = collection.iter().map(ExpenseRecord::from).collect();
    write_json_atomic(path, &records)?;
    tracing::debug!(path = %path.display(), count = records.len(), "saved expenses");
    Ok(())
}
