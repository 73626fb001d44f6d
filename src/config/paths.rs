//! Path management for the finance tracker
//!
//! Resolves where the expense store, budgets, backups, exports, settings and
//! audit log live.
//!
//! ## Path Resolution Order
//!
//! 1. `--data-dir` flag or `FINANCE_TRACKER_DATA_DIR` environment variable
//! 2. The platform config directory (`~/.config/finance-tracker` on Linux)
//!
//! Individual locations (store file, backup directory, export directory) can
//! then be overridden from `config.json`; relative overrides are resolved
//! against the base directory.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use super::settings::PathOverrides;
use crate::error::ExpenseError;

/// Environment variable that overrides the base directory
pub const DATA_DIR_ENV: &str = "FINANCE_TRACKER_DATA_DIR";

/// Manages all paths used by the finance tracker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinancePaths {
    /// Base directory for all data
    base_dir: PathBuf,
    store_file: Option<PathBuf>,
    backup_dir: Option<PathBuf>,
    export_dir: Option<PathBuf>,
}

impl FinancePaths {
    /// Create a new FinancePaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> Result<Self, ExpenseError> {
        let base_dir = match std::env::var_os(DATA_DIR_ENV) {
            Some(custom) if !custom.is_empty() => PathBuf::from(custom),
            _ => resolve_default_path()?,
        };

        Ok(Self::with_base_dir(base_dir))
    }

    /// Create FinancePaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self {
            base_dir,
            store_file: None,
            backup_dir: None,
            export_dir: None,
        }
    }

    /// Apply path overrides from settings
    pub fn with_overrides(mut self, overrides: &PathOverrides) -> Self {
        self.store_file = overrides.store_file.as_deref().map(|p| self.resolve(p));
        self.backup_dir = overrides.backup_dir.as_deref().map(|p| self.resolve(p));
        self.export_dir = overrides.export_dir.as_deref().map(|p| self.resolve(p));
        self
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Get the base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the data directory (<base>/data/)
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Get the primary expense store
    pub fn store_file(&self) -> PathBuf {
        self.store_file
            .clone()
            .unwrap_or_else(|| self.data_dir().join("expenses.json"))
    }

    /// Get the path to budgets.json
    pub fn budgets_file(&self) -> PathBuf {
        self.data_dir().join("budgets.json")
    }

    /// Get the backup directory (<base>/backups/)
    pub fn backup_dir(&self) -> PathBuf {
        self.backup_dir
            .clone()
            .unwrap_or_else(|| self.base_dir.join("backups"))
    }

    /// Get the default export directory (<base>/exports/)
    pub fn export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .unwrap_or_else(|| self.base_dir.join("exports"))
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to the audit log
    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    /// Ensure all required directories exist
    pub fn ensure_directories(&self) -> Result<(), ExpenseError> {
        let mut dirs = vec![self.base_dir.clone(), self.data_dir(), self.backup_dir()];
        if let Some(parent) = self.store_file().parent() {
            dirs.push(parent.to_path_buf());
        }

        for dir in dirs {
            std::fs::create_dir_all(&dir).map_err(|e| {
                ExpenseError::Io(format!(
                    "Failed to create directory {}: {}",
                    dir.display(),
                    e
                ))
            })?;
        }

        Ok(())
    }
}

/// Resolve the default data directory path based on platform
fn resolve_default_path() -> Result<PathBuf, ExpenseError> {
    ProjectDirs::from("", "", "finance-tracker")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| ExpenseError::Config("Could not determine a home directory".into()))
}
