//! Backup manager for the finance tracker
//!
//! A backup is a byte-for-byte copy of the expense store, named after the
//! moment it was taken. Backups are only deleted by an explicit prune.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::config::paths::FinancePaths;
use crate::error::{ExpenseError, ExpenseResult};

/// Filename prefix shared by every backup
pub const BACKUP_PREFIX: &str = "expenses-";

/// Metadata about a backup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupInfo {
    /// Backup filename
    pub filename: String,
    /// Full path to backup
    pub path: PathBuf,
    /// When the backup was created
    pub created_at: DateTime<Utc>,
    /// Disambiguates backups taken within the same millisecond
    pub sequence: u32,
    /// Size in bytes
    pub size_bytes: u64,
}

impl BackupInfo {
    /// Filename without the `.json` extension
    pub fn id(&self) -> &str {
        self.filename
            .strip_suffix(".json")
            .unwrap_or(&self.filename)
    }
}

/// Manages backup creation, lookup and pruning
#[derive(Debug, Clone)]
pub struct BackupManager {
    /// Path to backup directory
    backup_dir: PathBuf,
    /// File being backed up
    store_file: PathBuf,
}

impl BackupManager {
    /// Create a new BackupManager
    pub fn new(paths: &FinancePaths) -> Self {
        Self {
            backup_dir: paths.backup_dir(),
            store_file: paths.store_file(),
        }
    }

    /// Copy the current store into a new timestamped backup
    ///
    /// Fails with `NotFound` when there is no store file to copy.
    pub fn create_backup(&self) -> ExpenseResult<BackupInfo> {
        if !self.store_file.exists() {
            return Err(ExpenseError::file_not_found(
                self.store_file.display().to_string(),
            ));
        }

        fs::create_dir_all(&self.backup_dir).map_err(|e| {
            ExpenseError::Io(format!("Failed to create backup directory: {}", e))
        })?;

        let now = Utc::now();
        let stamp = format!(
            "{}-{:03}",
            now.format("%Y%m%d-%H%M%S"),
            now.timestamp_subsec_millis()
        );

        let mut sequence = 0;
        let mut filename = format!("{}{}.json", BACKUP_PREFIX, stamp);
        while self.backup_dir.join(&filename).exists() {
            sequence += 1;
            filename = format!("{}{}-{}.json", BACKUP_PREFIX, stamp, sequence);
        }
        let backup_path = self.backup_dir.join(&filename);

        fs::copy(&self.store_file, &backup_path).map_err(|e| {
            ExpenseError::Io(format!("Failed to write backup file: {}", e))
        })?;

        tracing::info!(backup = %filename, "created backup");

        self.parse_backup_info(&backup_path).ok_or_else(|| {
            ExpenseError::Io(format!("Backup {} could not be read back", filename))
        })
    }

    /// List all available backups, newest first
    pub fn list_backups(&self) -> ExpenseResult<Vec<BackupInfo>> {
        if !self.backup_dir.exists() {
            return Ok(Vec::new());
        }

        let mut backups = Vec::new();

        for entry in fs::read_dir(&self.backup_dir).map_err(|e| {
            ExpenseError::Io(format!("Failed to read backup directory: {}", e))
        })? {
            let entry = entry.map_err(|e| {
                ExpenseError::Io(format!("Failed to read directory entry: {}", e))
            })?;

            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                if let Some(info) = self.parse_backup_info(&path) {
                    backups.push(info);
                }
            }
        }

        backups.sort_by(|a, b| {
            (b.created_at, b.sequence, &b.filename).cmp(&(a.created_at, a.sequence, &a.filename))
        });

        Ok(backups)
    }

    /// Parse backup info from a backup file
    fn parse_backup_info(&self, path: &Path) -> Option<BackupInfo> {
        let filename = path.file_name()?.to_string_lossy().to_string();

        // expenses-YYYYMMDD-HHMMSS-mmm[-N].json
        let stamp = filename.strip_prefix(BACKUP_PREFIX)?.strip_suffix(".json")?;
        let (created_at, sequence) = parse_backup_timestamp(stamp)?;

        let metadata = fs::metadata(path).ok()?;
        if !metadata.is_file() {
            return None;
        }

        Some(BackupInfo {
            filename,
            path: path.to_path_buf(),
            created_at,
            sequence,
            size_bytes: metadata.len(),
        })
    }

    /// Delete all but the newest `keep` backups
    ///
    /// Returns the paths that were removed.
    pub fn prune(&self, keep: usize) -> ExpenseResult<Vec<PathBuf>> {
        let mut deleted = Vec::new();

        for backup in self.list_backups()?.into_iter().skip(keep) {
            fs::remove_file(&backup.path).map_err(|e| {
                ExpenseError::Io(format!("Failed to delete old backup: {}", e))
            })?;
            tracing::debug!(backup = %backup.filename, "pruned backup");
            deleted.push(backup.path);
        }

        Ok(deleted)
    }

    /// Get backup directory path
    pub fn backup_dir(&self) -> &PathBuf {
        &self.backup_dir
    }

    /// Find a backup by id
    ///
    /// Accepts the filename with or without `.json`, or `latest`.
    pub fn get_backup(&self, id: &str) -> ExpenseResult<BackupInfo> {
        let id = id.trim();

        if id.eq_ignore_ascii_case("latest") {
            return self
                .get_latest_backup()?
                .ok_or_else(|| ExpenseError::backup_not_found("latest"));
        }

        // Only plain filenames inside the backup directory
        if id.is_empty() || id.contains(['/', '\\']) {
            return Err(ExpenseError::backup_not_found(id));
        }

        let filename = if id.ends_with(".json") {
            id.to_string()
        } else {
            format!("{}.json", id)
        };

        let path = self.backup_dir.join(&filename);
        if !path.is_file() {
            return Err(ExpenseError::backup_not_found(id));
        }

        self.parse_backup_info(&path)
            .ok_or_else(|| ExpenseError::backup_not_found(id))
    }

    /// Get the most recent backup
    pub fn get_latest_backup(&self) -> ExpenseResult<Option<BackupInfo>> {
        let backups = self.list_backups()?;
        Ok(backups.into_iter().next())
    }
}

/// Parse the timestamp part of a backup filename
///
/// Format: `YYYYMMDD-HHMMSS-mmm` with an optional `-N` collision counter.
fn parse_backup_timestamp(stamp: &str) -> Option<(DateTime<Utc>, u32)> {
    let parts: Vec<&str> = stamp.split('-').collect();
    if parts.len() < 3 || parts.len() > 4 {
        return None;
    }

    let (date_part, time_part, millis_part) = (parts[0], parts[1], parts[2]);
    if date_part.len() != 8 || time_part.len() != 6 || millis_part.len() != 3 {
        return None;
    }

    let sequence: u32 = match parts.get(3) {
        Some(n) => n.parse().ok()?,
        None => 0,
    };

    let year: i32 = date_part[0..4].parse().ok()?;
    let month: u32 = date_part[4..6].parse().ok()?;
    let day: u32 = date_part[6..8].parse().ok()?;
    let hour: u32 = time_part[0..2].parse().ok()?;
    let minute: u32 = time_part[2..4].parse().ok()?;
    let second: u32 = time_part[4..6].parse().ok()?;
    let millis: u32 = millis_part.parse().ok()?;

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = chrono::NaiveTime::from_hms_milli_opt(hour, minute, second, millis)?;
    let datetime = chrono::NaiveDateTime::new(date, time);

    Some((DateTime::from_naive_utc_and_offset(datetime, Utc), sequence))
}
