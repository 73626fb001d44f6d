//! User settings for the finance tracker
//!
//! Manages user preferences: backup retention, path overrides and the
//! categories the user has added.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::paths::FinancePaths;
use crate::error::ExpenseError;

/// Backup retention settings
///
/// Backups are never pruned automatically; `keep` is the default for a
/// manual prune.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupRetention {
    /// Number of most recent backups kept by `backup prune`
    pub keep: usize,
}

impl Default for BackupRetention {
    fn default() -> Self {
        Self { keep: 10 }
    }
}

/// Overrides for individual file locations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathOverrides {
    /// Primary expense store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_file: Option<PathBuf>,

    /// Directory holding backups
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_dir: Option<PathBuf>,

    /// Default directory for CSV exports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<PathBuf>,
}

/// User settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version of the settings file
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Backup retention policy
    #[serde(default)]
    pub backup_retention: BackupRetention,

    /// File location overrides
    #[serde(default)]
    pub paths: PathOverrides,

    /// Categories the user added beyond the defaults
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_categories: Vec<String>,
}

fn default_schema_version() -> u32 {
    1
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            backup_retention: BackupRetention::default(),
            paths: PathOverrides::default(),
            custom_categories: Vec::new(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &FinancePaths) -> Result<Self, ExpenseError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path).map_err(|e| {
                ExpenseError::Io(format!("Failed to read settings file: {}", e))
            })?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                ExpenseError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &FinancePaths) -> Result<(), ExpenseError> {
        std::fs::create_dir_all(paths.base_dir())
            .map_err(|e| ExpenseError::Io(format!("Failed to create config directory: {}", e)))?;

        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            ExpenseError::Config(format!("Failed to serialize settings: {}", e))
        })?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| ExpenseError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    /// Remember a user-defined category; returns true if it was new
    pub fn remember_category(&mut self, name: &str) -> bool {
        let known = crate::models::DEFAULT_CATEGORIES
            .iter()
            .copied()
            .chain(self.custom_categories.iter().map(String::as_str))
            .any(|c| crate::models::same_category(c, name));
        if known {
            return false;
        }
        self.custom_categories.push(name.to_string());
        true
    }
}
