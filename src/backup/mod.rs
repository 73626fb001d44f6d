//! Backup system for the finance tracker
//!
//! # Architecture
//!
//! - `BackupManager`: creates, lists, looks up and prunes backups
//! - `RestoreManager`: validates and restores backups
//!
//! # Backup Format
//!
//! A backup is an exact copy of the expense store, named
//! `expenses-YYYYMMDD-HHMMSS-mmm.json` (UTC). Backups taken within the same
//! millisecond get a `-N` suffix.
//!
//! # Retention
//!
//! Backups are kept until `prune` is called; nothing is deleted
//! automatically.
//!
//! # Example
//!
//! ```rust,ignore
//! use finance_tracker::backup::{BackupManager, RestoreManager};
//! use finance_tracker::config::FinancePaths;
//!
//! let paths = FinancePaths::new()?;
//! let backups = BackupManager::new(&paths);
//! let info = backups.create_backup()?;
//!
//! // Later, restore from backup
//! let restore = RestoreManager::new(&paths);
//! let result = restore.restore(&backups.get_backup("latest")?)?;
//! println!("{}", result.summary());
//! ```

mod manager;
mod restore;

pub use manager::{BackupInfo, BackupManager, BACKUP_PREFIX};
pub use restore::{RestoreManager, RestoreResult, ValidationResult};
