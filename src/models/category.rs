//! Expense categories
//!
//! Categories are plain labels. A default set is offered to the user and the
//! list grows as new categories are entered or discovered in loaded data.

use std::fmt;

/// Categories offered before the user has entered any of their own
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "Food & Dining",
    "Transportation",
    "Shopping",
    "Entertainment",
    "Bills & Utilities",
    "Healthcare",
    "Education",
    "Personal Care",
    "Travel",
    "Other",
];

/// Maximum length of a category name
pub const MAX_CATEGORY_LEN: usize = 50;

/// Trim a category name and collapse internal runs of whitespace
pub fn normalize_category(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Compare two category names the way every lookup does
///
/// Whitespace is normalized and case is folded with full Unicode lowercasing,
/// so "Café" and "CAFÉ" are the same category.
pub fn same_category(a: &str, b: &str) -> bool {
    normalize_category(a).to_lowercase() == normalize_category(b).to_lowercase()
}

/// Validate a category name
pub fn validate_category_name(name: &str) -> Result<(), CategoryValidationError> {
    if name.trim().is_empty() {
        return Err(CategoryValidationError::EmptyName);
    }

    if name.len() > MAX_CATEGORY_LEN {
        return Err(CategoryValidationError::NameTooLong(name.len()));
    }

    Ok(())
}

/// Ordered, case-insensitively unique list of category names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryList {
    names: Vec<String>,
}

impl CategoryList {
    /// An empty list
    pub fn empty() -> Self {
        Self { names: Vec::new() }
    }

    /// Add a category if not already present (case-insensitive)
    ///
    /// Returns the canonical spelling stored in the list.
    pub fn add(&mut self, name: &str) -> Result<String, CategoryValidationError> {
        let name = normalize_category(name);
        validate_category_name(&name)?;

        if let Some(existing) = self.find(&name) {
            return Ok(existing.to_string());
        }

        self.names.push(name.clone());
        Ok(name)
    }

    /// Look up a category by name, ignoring case
    pub fn find(&self, name: &str) -> Option<&str> {
        self.names
            .iter()
            .find(|n| same_category(n, name))
            .map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Get a category by its 1-based menu position
    pub fn get_by_position(&self, position: usize) -> Option<&str> {
        position
            .checked_sub(1)
            .and_then(|i| self.names.get(i))
            .map(String::as_str)
    }
}

impl Default for CategoryList {
    fn default() -> Self {
        Self {
            names: DEFAULT_CATEGORIES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Validation errors for categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryValidationError {
    EmptyName,
    NameTooLong(usize),
}

impl fmt::Display for CategoryValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Category name cannot be empty"),
            Self::NameTooLong(len) => write!(
                f,
                "Category name too long ({} chars, max {})",
                len, MAX_CATEGORY_LEN
            ),
        }
    }
}

impl std::error::Error for CategoryValidationError {}
