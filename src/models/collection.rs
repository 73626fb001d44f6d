//! Expense collection
//!
//! Insertion-ordered list of expenses whose ids are unique. Serializes as a
//! plain JSON array.

use serde::Serialize;

use super::expense::Expense;
use super::ids::ExpenseId;

/// Ordered sequence of expenses with unique ids
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExpenseCollection {
    expenses: Vec<Expense>,
}

impl ExpenseCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection, rejecting the first repeated id
    pub fn from_expenses(expenses: Vec<Expense>) -> Result<Self, DuplicateIdError> {
        let mut collection = Self::new();
        for expense in expenses {
            collection.insert(expense)?;
        }
        Ok(collection)
    }

    /// Append an expense, rejecting an id that is already present
    pub fn insert(&mut self, expense: Expense) -> Result<(), DuplicateIdError> {
        if self.contains(&expense.id) {
            return Err(DuplicateIdError(expense.id));
        }
        self.expenses.push(expense);
        Ok(())
    }

    /// Remove an expense by id, returning it if present
    pub fn remove(&mut self, id: &ExpenseId) -> Option<Expense> {
        let index = self.expenses.iter().position(|e| &e.id == id)?;
        Some(self.expenses.remove(index))
    }

    pub fn get(&self, id: &ExpenseId) -> Option<&Expense> {
        self.expenses.iter().find(|e| &e.id == id)
    }

    pub fn contains(&self, id: &ExpenseId) -> bool {
        self.get(id).is_some()
    }

    pub fn as_slice(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Expense> {
        self.expenses.iter()
    }

    pub fn len(&self) -> usize {
        self.expenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }

    pub fn clear(&mut self) {
        self.expenses.clear();
    }
}

impl<'a> IntoIterator for &'a ExpenseCollection {
    type Item = &'a Expense;
    type IntoIter = std::slice::Iter<'a, Expense>;

    fn into_iter(self) -> Self::IntoIter {
        self.expenses.iter()
    }
}

/// An expense id appeared more than once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateIdError(pub ExpenseId);

impl std::fmt::Display for DuplicateIdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Duplicate expense id: {}", self.0.full())
    }
}

impl std::error::Error for DuplicateIdError {}
