//! Backup restoration for the finance tracker
//!
//! A backup is validated before it replaces the store, and the replacement
//! itself is an atomic copy.

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};

use crate::config::paths::FinancePaths;
use crate::error::{ExpenseError, ExpenseResult};
use crate::models::{ExpenseCollection, Money};
use crate::storage::expenses::decode_expenses;
use crate::storage::file_io::copy_atomic;

use super::manager::BackupInfo;

/// Handles restoring from backups
pub struct RestoreManager {
    store_file: PathBuf,
}

impl RestoreManager {
    /// Create a new RestoreManager
    pub fn new(paths: &FinancePaths) -> Self {
        Self {
            store_file: paths.store_file(),
        }
    }

    /// Replace the store with the contents of `backup`
    ///
    /// The backup must decode as a valid expense collection; otherwise the
    /// store is left as it was.
    pub fn restore(&self, backup: &BackupInfo) -> ExpenseResult<RestoreResult> {
        let validation = self.validate_backup(backup)?;

        copy_atomic(&backup.path, &self.store_file)?;

        tracing::info!(backup = %backup.filename, "restored store from backup");

        Ok(RestoreResult {
            backup_filename: backup.filename.clone(),
            backup_date: backup.created_at,
            expense_count: validation.expense_count,
            total: validation.total,
        })
    }

    /// Validate a backup file without restoring it
    pub fn validate_backup(&self, backup: &BackupInfo) -> ExpenseResult<ValidationResult> {
        let contents = fs::read_to_string(&backup.path)
            .map_err(|e| ExpenseError::Io(format!("Failed to read backup file: {}", e)))?;

        let collection = decode_expenses(&contents).map_err(|e| {
            ExpenseError::CorruptData(format!("Backup {}: {}", backup.filename, e))
        })?;

        Ok(ValidationResult::from_collection(backup, &collection))
    }
}

/// Result of a restore operation
#[derive(Debug, Clone)]
pub struct RestoreResult {
    /// Backup the store was restored from
    pub backup_filename: String,
    /// Date the backup was created
    pub backup_date: DateTime<Utc>,
    /// Number of expenses now in the store
    pub expense_count: usize,
    /// Sum of restored expenses
    pub total: Money,
}

impl RestoreResult {
    /// Get a summary of what was restored
    pub fn summary(&self) -> String {
        format!(
            "Restored {} expense(s) totalling {} from {} ({})",
            self.expense_count,
            self.total,
            self.backup_filename,
            self.backup_date.format("%Y-%m-%d %H:%M:%S")
        )
    }
}

/// Result of validating a backup
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Date the backup was created
    pub backup_date: DateTime<Utc>,
    /// Number of expenses in the backup
    pub expense_count: usize,
    /// Sum of all amounts
    pub total: Money,
    /// Earliest and latest expense dates
    pub date_range: Option<(NaiveDate, NaiveDate)>,
}

impl ValidationResult {
    fn from_collection(backup: &BackupInfo, collection: &ExpenseCollection) -> Self {
        let first = collection.iter().map(|e| e.date).min();
        let last = collection.iter().map(|e| e.date).max();

        Self {
            backup_date: backup.created_at,
            expense_count: collection.len(),
            total: collection.iter().map(|e| e.amount).sum(),
            date_range: first.zip(last),
        }
    }

    /// Get a summary of what data is present
    pub fn summary(&self) -> String {
        match self.date_range {
            Some((first, last)) => format!(
                "Valid backup: {} expense(s), {} total, {} to {}",
                self.expense_count, self.total, first, last
            ),
            None => "Valid backup: no expenses".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::manager::BackupManager;
    use crate::models::Expense;
    use crate::storage::expenses::{load_expenses, save_expenses};
    use tempfile::TempDir;

    fn create_test_env() -> (RestoreManager, BackupManager, FinancePaths, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let paths = FinancePaths::with_base_dir(temp_dir.path().to_path_buf());
        paths.ensure_directories().unwrap();

        let backup_manager = BackupManager::new(&paths);
        let restore_manager = RestoreManager::new(&paths);

        (restore_manager, backup_manager, paths, temp_dir)
    }

    fn sample_collection() -> ExpenseCollection {
        let mut collection = ExpenseCollection::new();
        for (day, cents) in [(3, 1250), (9, 800)] {
            collection
                .insert(
                    Expense::new(
                        NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
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
    fn test_restore_from_backup() {
        let (restore_manager, backup_manager, paths, _temp) = create_test_env();

        let original = sample_collection();
        save_expenses(&original, &paths.store_file()).unwrap();
        let backup = backup_manager.create_backup().unwrap();

        save_expenses(&ExpenseCollection::new(), &paths.store_file()).unwrap();

        let result = restore_manager.restore(&backup).unwrap();

        assert_eq!(result.expense_count, 2);
        assert_eq!(result.total, Money::from_cents(2050));
        assert_eq!(load_expenses(&paths.store_file()).unwrap(), original);
    }

    #[test]
    fn test_validate_backup() {
        let (restore_manager, backup_manager, paths, _temp) = create_test_env();
        save_expenses(&sample_collection(), &paths.store_file()).unwrap();
        let backup = backup_manager.create_backup().unwrap();

        let result = restore_manager.validate_backup(&backup).unwrap();

        assert_eq!(result.expense_count, 2);
        assert_eq!(
            result.date_range,
            Some((
                NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 9).unwrap()
            ))
        );
        assert!(result.summary().contains("2 expense(s)"));
    }

    #[test]
    fn test_corrupt_backup_is_not_restored() {
        let (restore_manager, backup_manager, paths, _temp) = create_test_env();

        fs::write(paths.store_file(), "{ broken").unwrap();
        let backup = backup_manager.create_backup().unwrap();

        save_expenses(&sample_collection(), &paths.store_file()).unwrap();
        let before = fs::read_to_string(paths.store_file()).unwrap();

        let err = restore_manager.restore(&backup).unwrap_err();

        assert!(err.is_corrupt());
        assert_eq!(fs::read_to_string(paths.store_file()).unwrap(), before);
    }

    #[test]
    fn test_restore_result_summary() {
        let result = RestoreResult {
            backup_filename: "expenses-20240101-120000-000.json".into(),
            backup_date: Utc::now(),
            expense_count: 3,
            total: Money::from_cents(4200),
        };

        let summary = result.summary();
        assert!(summary.contains("3 expense(s)"));
        assert!(summary.contains("$42.00"));
        assert!(summary.contains("expenses-20240101-120000-000.json"));
    }

    #[test]
    fn test_restore_recreates_missing_store() {
        let (restore_manager, backup_manager, paths, _temp) = create_test_env();
        save_expenses(&sample_collection(), &paths.store_file()).unwrap();
        let backup = backup_manager.create_backup().unwrap();

        fs::remove_dir_all(paths.data_dir()).unwrap();

        restore_manager.restore(&backup).unwrap();
        assert!(paths.store_file().exists());
    }
}
