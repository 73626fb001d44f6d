//! Storage layer for the finance tracker
//!
//! Provides JSON file storage with atomic writes and a backup of the
//! previous store taken before every overwrite.

pub mod budgets;
pub mod expenses;
pub mod file_io;

pub use budgets::{load_budgets, save_budgets};
pub use expenses::{decode_expenses, load_expenses, save_expenses};
pub use file_io::{read_json, write_json_atomic};

use std::path::Path;

use crate::backup::{BackupInfo, BackupManager, RestoreManager, RestoreResult, ValidationResult};
use crate::config::paths::FinancePaths;
use crate::error::ExpenseResult;
use crate::export::{self, ParsedRow};
use crate::models::{BudgetBook, Expense, ExpenseCollection};

/// Storage coordinator for the expense store, budgets and backups
pub struct Storage {
    paths: FinancePaths,
    backups: BackupManager,
    restorer: RestoreManager,
}

impl Storage {
    /// Create a new Storage instance
    pub fn new(paths: FinancePaths) -> Self {
        Self {
            backups: BackupManager::new(&paths),
            restorer: RestoreManager::new(&paths),
            paths,
        }
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &FinancePaths {
        &self.paths
    }

    /// Get the backup manager
    pub fn backups(&self) -> &BackupManager {
        &self.backups
    }

    /// Whether a store file exists yet
    pub fn store_exists(&self) -> bool {
        self.paths.store_file().exists()
    }

    /// Load the expense store
    ///
    /// `NotFound` if there is no store yet, `CorruptData` if it can't be
    /// trusted.
    pub fn load(&self) -> ExpenseResult<ExpenseCollection> {
        load_expenses(&self.paths.store_file())
    }

    /// Load the expense store, treating a missing file as empty
    pub fn load_or_default(&self) -> ExpenseResult<ExpenseCollection> {
        if !self.store_exists() {
            tracing::debug!("no expense store yet, starting empty");
            return Ok(ExpenseCollection::new());
        }
        self.load()
    }

    /// Save the collection, backing up the previous store first
    ///
    /// Returns the backup taken, if there was a previous store. On failure
    /// the previous store is left untouched.
    pub fn save(&self, collection: &ExpenseCollection) -> ExpenseResult<Option<BackupInfo>> {
        self.paths.ensure_directories()?;

        let backup = if self.store_exists() {
            Some(self.backups.create_backup()?)
        } else {
            None
        };

        save_expenses(collection, &self.paths.store_file())?;
        Ok(backup)
    }

    /// Set a damaged store aside as a backup and replace it with an empty one
    pub fn reset(&self) -> ExpenseResult<BackupInfo> {
        self.paths.ensure_directories()?;
        let backup = self.backups.create_backup()?;
        save_expenses(&ExpenseCollection::new(), &self.paths.store_file())?;
        tracing::warn!(backup = %backup.filename, "replaced damaged store with an empty one");
        Ok(backup)
    }

    /// Take a backup of the current store on demand
    pub fn create_backup(&self) -> ExpenseResult<BackupInfo> {
        self.backups.create_backup()
    }

    /// List backups, newest first
    pub fn list_backups(&self) -> ExpenseResult<Vec<BackupInfo>> {
        self.backups.list_backups()
    }

    /// Delete all but the newest `keep` backups, returning how many were removed
    pub fn prune_backups(&self, keep: usize) -> ExpenseResult<usize> {
        let deleted = self.backups.prune(keep)?;
        if !deleted.is_empty() {
            tracing::info!(deleted = deleted.len(), keep, "pruned backups");
        }
        Ok(deleted.len())
    }

    /// Check that a backup decodes as a valid store
    pub fn validate_backup(&self, backup_id: &str) -> ExpenseResult<(BackupInfo, ValidationResult)> {
        let backup = self.backups.get_backup(backup_id)?;
        let validation = self.restorer.validate_backup(&backup)?;
        Ok((backup, validation))
    }

    /// Replace the store with a backup
    ///
    /// `backup_id` is a backup filename (with or without `.json`) or
    /// `latest`. The current store is backed up before it is replaced.
    pub fn restore(&self, backup_id: &str) -> ExpenseResult<RestoreResult> {
        let (backup, _) = self.validate_backup(backup_id)?;

        if self.store_exists() {
            let pre_restore = self.backups.create_backup()?;
            tracing::info!(backup = %pre_restore.filename, "backed up store before restore");
        }

        self.restorer.restore(&backup)
    }

    /// Export expenses to CSV, returning the number of rows written
    pub fn export_csv<'a, I>(&self, expenses: I, path: &Path) -> ExpenseResult<usize>
    where
        I: IntoIterator<Item = &'a Expense>,
    {
        export::export_expenses_csv(path, expenses)
    }

    /// Read a CSV import file into parsed rows
    pub fn import_csv(&self, path: &Path) -> ExpenseResult<Vec<ParsedRow>> {
        export::import_expenses_csv(path)
    }

    /// Load budgets
    pub fn load_budgets(&self) -> ExpenseResult<BudgetBook> {
        load_budgets(&self.paths.budgets_file())
    }

    /// Save budgets
    pub fn save_budgets(&self, book: &BudgetBook) -> ExpenseResult<()> {
        save_budgets(book, &self.paths.budgets_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExpenseError;
    use crate::models::Money;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::TempDir;

    fn create_storage() -> (Storage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let paths = FinancePaths::with_base_dir(temp_dir.path().to_path_buf());
        (Storage::new(paths), temp_dir)
    }

    fn collection_of(amounts: &[i64]) -> ExpenseCollection {
        let mut collection = ExpenseCollection::new();
        for &cents in amounts {
            collection
                .insert(
                    Expense::new(
                        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
                        Money::from_cents(cents),
                        "Food",
                        "",
                    )
                    .unwrap(),
                )
                .unwrap();
        }
        collection
    }

    #[test]
    fn test_first_save_takes_no_backup() {
        let (storage, _temp) = create_storage();

        let backup = storage.save(&collection_of(&[100])).unwrap();

        assert!(backup.is_none());
        assert!(storage.list_backups().unwrap().is_empty());
    }

    #[test]
    fn test_save_backs_up_previous_store() {
        let (storage, _temp) = create_storage();
        let first = collection_of(&[100]);
        storage.save(&first).unwrap();

        let backup = storage.save(&collection_of(&[200, 300])).unwrap().unwrap();

        let backed_up = load_expenses(&backup.path).unwrap();
        assert_eq!(backed_up, first);
        assert_eq!(storage.load().unwrap().len(), 2);
    }

    #[test]
    fn test_load_or_default_when_missing() {
        let (storage, _temp) = create_storage();

        assert!(storage.load().unwrap_err().is_not_found());
        assert!(storage.load_or_default().unwrap().is_empty());
    }

    #[test]
    fn test_failed_save_keeps_previous_store() {
        let (storage, _temp) = create_storage();
        storage.save(&collection_of(&[100])).unwrap();
        let store = storage.paths().store_file();
        let before = fs::read_to_string(&store).unwrap();

        fs::create_dir(file_io::temp_path_for(&store)).unwrap();
        let err = storage.save(&collection_of(&[999])).unwrap_err();

        assert!(matches!(err, ExpenseError::Io(_)));
        assert_eq!(fs::read_to_string(&store).unwrap(), before);
    }

    #[test]
    fn test_restore_latest_recovers_deleted_expense() {
        let (storage, _temp) = create_storage();
        let original = collection_of(&[100, 200]);
        storage.save(&original).unwrap();

        let mut trimmed = original.clone();
        let removed = trimmed.as_slice()[0].id.clone();
        trimmed.remove(&removed);
        storage.save(&trimmed).unwrap();

        let result = storage.restore("latest").unwrap();

        assert_eq!(result.expense_count, 2);
        assert_eq!(storage.load().unwrap(), original);
        // backup before the second save plus the pre-restore backup
        assert_eq!(storage.list_backups().unwrap().len(), 2);
    }

    #[test]
    fn test_restore_unknown_backup() {
        let (storage, _temp) = create_storage();
        storage.save(&collection_of(&[100])).unwrap();

        let err = storage.restore("expenses-19990101-000000-000").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_prune_backups() {
        let (storage, _temp) = create_storage();
        storage.save(&collection_of(&[1])).unwrap();
        for cents in 2..6 {
            storage.save(&collection_of(&[cents])).unwrap();
        }
        assert_eq!(storage.list_backups().unwrap().len(), 4);

        assert_eq!(storage.prune_backups(1).unwrap(), 3);
        assert_eq!(storage.list_backups().unwrap().len(), 1);
    }

    #[test]
    fn test_reset_preserves_damaged_store() {
        let (storage, _temp) = create_storage();
        storage.paths().ensure_directories().unwrap();
        fs::write(storage.paths().store_file(), "{ not json").unwrap();
        assert!(storage.load().unwrap_err().is_corrupt());

        let backup = storage.reset().unwrap();

        assert_eq!(fs::read_to_string(&backup.path).unwrap(), "{ not json");
        assert!(storage.load().unwrap().is_empty());
    }

    #[test]
    fn test_budgets_round_trip() {
        let (storage, _temp) = create_storage();
        assert!(storage.load_budgets().unwrap().is_empty());

        let mut book = BudgetBook::new();
        book.set(
            crate::models::Budget::new(
                "Food",
                crate::models::Month::new(2024, 1).unwrap(),
                Money::from_cents(5000),
            )
            .unwrap(),
        );
        storage.save_budgets(&book).unwrap();

        assert_eq!(storage.load_budgets().unwrap(), book);
    }
}
