//! Expense identifier
//!
//! New expenses get a UUID. Stores written by older versions carry short
//! free-form ids (usually eight hex characters); those are kept verbatim.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Prefix used when displaying an expense id
pub const EXPENSE_ID_PREFIX: &str = "exp-";

/// Unique identifier of an expense
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExpenseId {
    /// Generated by this program
    Uuid(Uuid),
    /// Any other non-empty id found in stored or imported data
    Legacy(String),
}

impl ExpenseId {
    /// Create a new random ID
    pub fn new() -> Self {
        Self::Uuid(Uuid::new_v4())
    }

    /// The complete id as stored on disk
    pub fn full(&self) -> String {
        match self {
            Self::Uuid(uuid) => uuid.to_string(),
            Self::Legacy(id) => id.clone(),
        }
    }

    /// Parse an ID from its stored form; any non-empty text is accepted
    pub fn parse(s: &str) -> Result<Self, EmptyIdError> {
        s.parse()
    }

    /// Check whether `input` is this id written out in full or in display form
    pub fn matches_exact(&self, input: &str) -> bool {
        let input = input.trim().to_lowercase();
        !input.is_empty()
            && (self.full().to_lowercase() == input || self.to_string().to_lowercase() == input)
    }

    /// Check whether `fragment` identifies this id
    ///
    /// Matches the full id, the short display form (`exp-1a2b3c4d`) or a
    /// leading prefix of the id, ignoring case.
    pub fn matches_prefix(&self, fragment: &str) -> bool {
        let fragment = fragment.trim().to_lowercase();
        let full = self.full().to_lowercase();
        if !fragment.is_empty() && full.starts_with(&fragment) {
            return true;
        }
        let fragment = fragment
            .strip_prefix(EXPENSE_ID_PREFIX)
            .unwrap_or(&fragment);
        !fragment.is_empty() && full.starts_with(fragment)
    }
}

impl Default for ExpenseId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uuid(uuid) => write!(f, "{}{}", EXPENSE_ID_PREFIX, &uuid.to_string()[..8]),
            Self::Legacy(id) => write!(f, "{}{}", EXPENSE_ID_PREFIX, id),
        }
    }
}

impl From<Uuid> for ExpenseId {
    fn from(uuid: Uuid) -> Self {
        Self::Uuid(uuid)
    }
}

impl FromStr for ExpenseId {
    type Err = EmptyIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(EmptyIdError);
        }
        let unprefixed = s.strip_prefix(EXPENSE_ID_PREFIX).unwrap_or(s);
        match Uuid::parse_str(unprefixed) {
            Ok(uuid) => Ok(Self::Uuid(uuid)),
            Err(_) => Ok(Self::Legacy(s.to_string())),
        }
    }
}

impl Serialize for ExpenseId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.full())
    }
}

impl<'de> Deserialize<'de> for ExpenseId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// An expense id was blank
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyIdError;

impl fmt::Display for EmptyIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Expense id cannot be empty")
    }
}

impl std::error::Error for EmptyIdError {}
