//! Expense service
//!
//! Owns the in-memory expense collection and the category list, and is the
//! only place expenses are added or removed.

use chrono::NaiveDate;

use crate::error::{ExpenseError, ExpenseResult};
use crate::export::ParsedRow;
use crate::models::{CategoryList, Expense, ExpenseCollection, ExpenseId, Money, Month};

/// Filter options for searching expenses
///
/// All set fields must match; an empty filter matches everything.
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    /// Earliest date, inclusive
    pub start_date: Option<NaiveDate>,
    /// Latest date, inclusive
    pub end_date: Option<NaiveDate>,
    /// Exact category, ignoring case
    pub category: Option<String>,
    /// Substring of description, category or tags, ignoring case
    pub text: Option<String>,
    /// Smallest amount, inclusive
    pub min_amount: Option<Money>,
    /// Largest amount, inclusive
    pub max_amount: Option<Money>,
    /// Calendar month
    pub month: Option<Month>,
    /// Maximum number of expenses to return
    pub limit: Option<usize>,
}

impl SearchFilter {
    /// Create a new empty filter
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by date range
    pub fn date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    /// Only expenses on or after `start`
    pub fn since(mut self, start: NaiveDate) -> Self {
        self.start_date = Some(start);
        self
    }

    /// Only expenses on or before `end`
    pub fn until(mut self, end: NaiveDate) -> Self {
        self.end_date = Some(end);
        self
    }

    /// Filter by category
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Filter by text
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Filter by amount range
    pub fn amount_range(mut self, min: Option<Money>, max: Option<Money>) -> Self {
        self.min_amount = min;
        self.max_amount = max;
        self
    }

    /// Filter by month
    pub fn month(mut self, month: Month) -> Self {
        self.month = Some(month);
        self
    }

    /// Limit results
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether an expense passes every set criterion
    pub fn matches(&self, expense: &Expense) -> bool {
        self.start_date.map_or(true, |d| expense.date >= d)
            && self.end_date.map_or(true, |d| expense.date <= d)
            && self.month.map_or(true, |m| m.contains(expense.date))
            && self.min_amount.map_or(true, |m| expense.amount >= m)
            && self.max_amount.map_or(true, |m| expense.amount <= m)
            && self
                .category
                .as_deref()
                .map_or(true, |c| expense.in_category(c))
            && self
                .text
                .as_deref()
                .map_or(true, |t| expense.matches_text(t))
    }
}

/// Result of merging imported rows
#[derive(Debug, Clone, Default)]
pub struct ImportResult {
    /// Number of expenses imported
    pub imported: usize,
    /// Number of rows skipped because their id already exists
    pub duplicates_skipped: usize,
    /// Rows that could not be parsed, by line number
    pub errors: Vec<(u64, String)>,
    /// IDs of imported expenses
    pub imported_ids: Vec<ExpenseId>,
}

impl ImportResult {
    /// One-line summary of the import
    pub fn summary(&self) -> String {
        format!(
            "Imported {} expense(s), skipped {} duplicate(s), {} invalid row(s)",
            self.imported,
            self.duplicates_skipped,
            self.errors.len()
        )
    }
}

/// Service for expense management
#[derive(Debug, Clone, Default)]
pub struct ExpenseManager {
    expenses: ExpenseCollection,
    categories: CategoryList,
}

impl ExpenseManager {
    /// Create an empty manager with the default categories
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a loaded collection
    ///
    /// Categories used by the loaded expenses join the default list.
    pub fn from_collection(expenses: ExpenseCollection) -> Self {
        let mut manager = Self {
            expenses,
            categories: CategoryList::default(),
        };
        manager.register_loaded_categories();
        manager
    }

    fn register_loaded_categories(&mut self) {
        for expense in self.expenses.iter() {
            // Loaded expenses are already validated
            let _ = self.categories.add(&expense.category);
        }
    }

    /// Record a new expense
    pub fn add(
        &mut self,
        date: NaiveDate,
        amount: Money,
        category: &str,
        description: &str,
    ) -> ExpenseResult<Expense> {
        self.add_with_tags(date, amount, category, description, Vec::<String>::new())
    }

    /// Record a new expense with tags
    ///
    /// The category is matched against known categories ignoring case, and
    /// registered if it is new.
    pub fn add_with_tags<I, S>(
        &mut self,
        date: NaiveDate,
        amount: Money,
        category: &str,
        description: &str,
        tags: I,
    ) -> ExpenseResult<Expense>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut expense = Expense::new(date, amount, category, description)?.with_tags(tags);
        expense.category = self
            .categories
            .add(&expense.category)
            .map_err(|e| ExpenseError::Validation(e.to_string()))?;

        self.expenses
            .insert(expense.clone())
            .map_err(|e| ExpenseError::Validation(e.to_string()))?;

        tracing::debug!(id = %expense.id, amount = %expense.amount, "added expense");
        Ok(expense)
    }

    /// Remove an expense; returns false if no expense has that id
    pub fn delete(&mut self, id: &ExpenseId) -> bool {
        let removed = self.expenses.remove(id).is_some();
        if removed {
            tracing::debug!(id = %id, "deleted expense");
        }
        removed
    }

    /// Remove an expense, returning it
    pub fn take(&mut self, id: &ExpenseId) -> Option<Expense> {
        self.expenses.remove(id)
    }

    /// Get an expense by ID
    pub fn get(&self, id: &ExpenseId) -> Option<&Expense> {
        self.expenses.get(id)
    }

    /// Resolve user input to an expense id
    ///
    /// Accepts a full id, the `exp-` display form, or any unambiguous
    /// prefix of the id. An exact match wins over prefix matches.
    pub fn resolve_id(&self, input: &str) -> ExpenseResult<ExpenseId> {
        if let Some(expense) = self.expenses.iter().find(|e| e.id.matches_exact(input)) {
            return Ok(expense.id.clone());
        }

        let mut matches = self
            .expenses
            .iter()
            .filter(|e| e.id.matches_prefix(input))
            .map(|e| &e.id);

        match (matches.next(), matches.next()) {
            (Some(id), None) => Ok(id.clone()),
            (None, _) => Err(ExpenseError::expense_not_found(input.trim())),
            (Some(_), Some(_)) => Err(ExpenseError::Validation(format!(
                "Expense id '{}' is ambiguous; use more characters",
                input.trim()
            ))),
        }
    }

    /// Search expenses lazily; calling again restarts the search
    pub fn search<'a>(&'a self, filter: &'a SearchFilter) -> impl Iterator<Item = &'a Expense> + 'a {
        self.expenses
            .iter()
            .filter(move |e| filter.matches(e))
            .take(filter.limit.unwrap_or(usize::MAX))
    }

    /// All expenses in insertion order
    pub fn all(&self) -> &[Expense] {
        self.expenses.as_slice()
    }

    /// The underlying collection, for persistence
    pub fn collection(&self) -> &ExpenseCollection {
        &self.expenses
    }

    /// Replace every expense, e.g. after a restore
    pub fn replace_all(&mut self, expenses: ExpenseCollection) {
        self.expenses = expenses;
        self.register_loaded_categories();
    }

    /// Known categories
    pub fn categories(&self) -> &CategoryList {
        &self.categories
    }

    /// Register a category, returning its canonical spelling
    pub fn add_category(&mut self, name: &str) -> ExpenseResult<String> {
        self.categories
            .add(name)
            .map_err(|e| ExpenseError::Validation(e.to_string()))
    }

    /// Number of expenses
    pub fn len(&self) -> usize {
        self.expenses.len()
    }

    /// Whether there are no expenses
    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }

    /// Sum of all expenses
    pub fn total_spent(&self) -> Money {
        self.expenses.iter().map(|e| e.amount).sum()
    }

    /// Merge rows read from a CSV import
    ///
    /// Rows with an id already present are skipped; unparsable rows are
    /// collected in the result.
    pub fn import(&mut self, rows: Vec<ParsedRow>) -> ImportResult {
        let mut result = ImportResult::default();

        for row in rows {
            match row.result {
                Ok(mut expense) => {
                    if self.expenses.contains(&expense.id) {
                        result.duplicates_skipped += 1;
                        continue;
                    }
                    if let Ok(canonical) = self.categories.add(&expense.category) {
                        expense.category = canonical;
                    }
                    let id = expense.id.clone();
                    if self.expenses.insert(expense).is_ok() {
                        result.imported += 1;
                        result.imported_ids.push(id);
                    }
                }
                Err(reason) => result.errors.push((row.line, reason)),
            }
        }

        tracing::info!(
            imported = result.imported,
            duplicates = result.duplicates_skipped,
            errors = result.errors.len(),
            "imported expenses"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn cents(c: i64) -> Money {
        Money::from_cents(c)
    }

    fn sample_manager() -> ExpenseManager {
        let mut manager = ExpenseManager::new();
        manager
            .add(date(2024, 1, 15), cents(2550), "Food", "Lunch")
            .unwrap();
        manager
            .add(date(2024, 1, 20), cents(2700), "Food", "Dinner")
            .unwrap();
        manager
            .add_with_tags(date(2024, 2, 1), cents(1500), "Transport", "Taxi", ["work"])
            .unwrap();
        manager
    }

    #[test]
    fn test_add_appears_in_all() {
        let mut manager = ExpenseManager::new();
        let expense = manager
            .add(date(2024, 1, 15), cents(2550), "Food", "Lunch")
            .unwrap();

        assert_eq!(manager.all(), &[expense.clone()]);
        assert_eq!(manager.get(&expense.id), Some(&expense));
    }

    #[test]
    fn test_add_rejects_invalid_input() {
        let mut manager = ExpenseManager::new();

        let err = manager
            .add(date(2024, 1, 15), cents(-100), "Food", "")
            .unwrap_err();
        assert!(err.is_validation());

        let err = manager
            .add(date(2024, 1, 15), cents(100), "   ", "")
            .unwrap_err();
        assert!(err.is_validation());

        assert!(manager.is_empty());
    }

    #[test]
    fn test_add_allows_zero_and_empty_description() {
        let mut manager = ExpenseManager::new();
        let expense = manager.add(date(2024, 1, 1), cents(0), "Other", "").unwrap();
        assert!(expense.amount.is_zero());
        assert_eq!(expense.description, "");
    }

    #[test]
    fn test_add_uses_canonical_category() {
        let mut manager = ExpenseManager::new();
        let expense = manager
            .add(date(2024, 1, 1), cents(100), "travel", "")
            .unwrap();
        assert_eq!(expense.category, "Travel");

        let before = manager.categories().len();
        manager.add(date(2024, 1, 1), cents(100), "Pets", "").unwrap();
        assert_eq!(manager.categories().len(), before + 1);
    }

    #[test]
    fn test_ids_are_unique() {
        let manager = sample_manager();
        let mut ids: Vec<_> = manager.all().iter().map(|e| e.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let mut manager = sample_manager();
        let id = manager.all()[0].id.clone();

        assert!(manager.delete(&id));
        assert!(!manager.delete(&id));
        assert_eq!(manager.len(), 2);
        assert!(manager.get(&id).is_none());
    }

    #[test]
    fn test_search_by_category_and_text() {
        let manager = sample_manager();

        let filter = SearchFilter::new().category("food");
        assert_eq!(manager.search(&filter).count(), 2);

        let filter = SearchFilter::new().text("DINNER");
        let found: Vec<_> = manager.search(&filter).collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].description, "Dinner");

        // tags are searchable
        let filter = SearchFilter::new().text("work");
        assert_eq!(manager.search(&filter).count(), 1);
    }

    #[test]
    fn test_search_date_range_is_inclusive() {
        let manager = sample_manager();

        let filter = SearchFilter::new().date_range(date(2024, 1, 15), date(2024, 1, 20));
        assert_eq!(manager.search(&filter).count(), 2);

        let filter = SearchFilter::new().month(Month::new(2024, 2).unwrap());
        assert_eq!(manager.search(&filter).count(), 1);
    }

    #[test]
    fn test_search_amount_and_limit() {
        let manager = sample_manager();

        let filter = SearchFilter::new().amount_range(Some(cents(2000)), None);
        assert_eq!(manager.search(&filter).count(), 2);

        let filter = SearchFilter::new().limit(1);
        assert_eq!(manager.search(&filter).count(), 1);
    }

    #[test]
    fn test_search_is_restartable() {
        let manager = sample_manager();
        let filter = SearchFilter::new().category("Food");

        let first: Vec<_> = manager.search(&filter).collect();
        let second: Vec<_> = manager.search(&filter).collect();
        assert_eq!(first, second);
        assert_eq!(manager.len(), 3);
    }

    #[test]
    fn test_resolve_id() {
        let manager = sample_manager();
        let id = manager.all()[0].id.clone();

        assert_eq!(manager.resolve_id(&id.to_string()).unwrap(), id);
        assert_eq!(manager.resolve_id(&id.full()).unwrap(), id);
        assert!(manager.resolve_id("zzzz").unwrap_err().is_not_found());
        assert!(manager.resolve_id("").unwrap_err().is_not_found());
    }

    #[test]
    fn test_resolve_legacy_id_prefers_exact_match() {
        let mut manager = ExpenseManager::new();
        let rows = ["a1", "a1b2c3d4"]
            .into_iter()
            .enumerate()
            .map(|(i, raw)| ParsedRow {
                line: i as u64 + 2,
                result: Ok(Expense::with_id(
                    ExpenseId::parse(raw).unwrap(),
                    date(2024, 1, 15),
                    cents(100),
                    "Food",
                    "",
                )
                .unwrap()),
            })
            .collect();
        assert_eq!(manager.import(rows).imported, 2);

        assert_eq!(manager.resolve_id("a1").unwrap().full(), "a1");
        assert_eq!(manager.resolve_id("exp-a1b2c3d4").unwrap().full(), "a1b2c3d4");
        assert_eq!(manager.resolve_id("a1b").unwrap().full(), "a1b2c3d4");
        assert!(manager.resolve_id("a").unwrap_err().is_validation());
    }

    #[test]
    fn test_total_spent() {
        let manager = sample_manager();
        assert_eq!(manager.total_spent(), cents(6750));
        assert_eq!(ExpenseManager::new().total_spent(), Money::zero());
    }

    #[test]
    fn test_from_collection_registers_categories() {
        let mut source = ExpenseManager::new();
        source.add(date(2024, 1, 1), cents(100), "Garden", "").unwrap();

        let manager = ExpenseManager::from_collection(source.collection().clone());
        assert!(manager.categories().contains("garden"));
    }

    #[test]
    fn test_import_skips_duplicates_and_collects_errors() {
        let mut manager = sample_manager();
        let existing = manager.all()[0].clone();
        let fresh = Expense::new(date(2024, 3, 1), cents(900), "Books", "Novel").unwrap();

        let rows = vec![
            ParsedRow { line: 2, result: Ok(existing) },
            ParsedRow { line: 3, result: Ok(fresh.clone()) },
            ParsedRow { line: 4, result: Err("Invalid date".into()) },
        ];

        let result = manager.import(rows);

        assert_eq!(result.imported, 1);
        assert_eq!(result.duplicates_skipped, 1);
        assert_eq!(result.errors, vec![(4, "Invalid date".to_string())]);
        assert_eq!(result.imported_ids, vec![fresh.id]);
        assert_eq!(manager.len(), 4);
        assert!(manager.categories().contains("Books"));
    }
}
