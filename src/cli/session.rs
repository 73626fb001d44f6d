//! Command session
//!
//! A `Session` owns everything one run of the program works with: storage,
//! settings, the expense manager, budgets and the audit logger. Mutations go
//! through it so each one is audited and tracked as unsaved.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};

use crate::audit::{AuditEntry, AuditLogger, EntityType, Operation};
use crate::backup::{BackupInfo, RestoreResult};
use crate::config::paths::FinancePaths;
use crate::config::settings::Settings;
use crate::error::{ExpenseError, ExpenseResult};
use crate::models::{Budget, BudgetBook, Expense, ExpenseId, Money, Month};
use crate::services::{ExpenseManager, ImportResult};
use crate::storage::Storage;

/// State shared by subcommands and the interactive menu
pub struct Session {
    storage: Storage,
    settings: Settings,
    manager: ExpenseManager,
    budgets: BudgetBook,
    audit: AuditLogger,
    dirty: bool,
}

impl Session {
    /// Open the store at `paths`
    ///
    /// A missing store is an empty one. A damaged store is a `CorruptData`
    /// error; see [`Session::start_fresh`].
    pub fn open(paths: FinancePaths, settings: Settings) -> ExpenseResult<Self> {
        let storage = Storage::new(paths);
        let expenses = storage.load_or_default()?;
        tracing::debug!(count = expenses.len(), "loaded expense store");
        Self::assemble(storage, settings, ExpenseManager::from_collection(expenses))
    }

    /// Set a damaged store aside as a backup and open an empty one
    pub fn start_fresh(paths: FinancePaths, settings: Settings) -> ExpenseResult<(Self, BackupInfo)> {
        let storage = Storage::new(paths);
        let backup = storage.reset()?;
        let session = Self::assemble(storage, settings, ExpenseManager::new())?;
        session.audit.log(&AuditEntry::store_event(
            Operation::Backup,
            backup.filename.clone(),
            "damaged store set aside",
        ))?;
        Ok((session, backup))
    }

    fn assemble(storage: Storage, settings: Settings, mut manager: ExpenseManager) -> ExpenseResult<Self> {
        for category in &settings.custom_categories {
            if let Err(e) = manager.add_category(category) {
                tracing::warn!(%category, error = %e, "ignoring invalid custom category");
            }
        }
        let budgets = storage.load_budgets()?;
        let audit = AuditLogger::new(storage.paths().audit_log());

        Ok(Self {
            storage,
            settings,
            manager,
            budgets,
            audit,
            dirty: false,
        })
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn manager(&self) -> &ExpenseManager {
        &self.manager
    }

    pub fn budgets(&self) -> &BudgetBook {
        &self.budgets
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Whether there are changes not yet written to the store
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Record a new expense
    ///
    /// If the audit entry cannot be written the expense is taken back out.
    pub fn add_expense(
        &mut self,
        date: NaiveDate,
        amount: Money,
        category: &str,
        description: &str,
        tags: Vec<String>,
    ) -> ExpenseResult<Expense> {
        let is_new_category = !self.manager.categories().contains(category);
        let expense = self
            .manager
            .add_with_tags(date, amount, category, description, tags)?;

        if let Err(e) = self.audit.log(&AuditEntry::create(
            EntityType::Expense,
            expense.id.to_string(),
            &expense,
        )) {
            self.manager.take(&expense.id);
            return Err(e);
        }
        self.dirty = true;

        if is_new_category {
            self.remember_category(&expense.category)?;
        }

        Ok(expense)
    }

    /// Delete the expense identified by `input` (full id, `exp-` form or prefix)
    pub fn delete_expense(&mut self, input: &str) -> ExpenseResult<Expense> {
        let id = self.manager.resolve_id(input)?;
        self.remove_expense(&id)
    }

    /// Delete the expense with exactly this id
    ///
    /// The audit entry is written first; nothing changes if that fails.
    pub fn remove_expense(&mut self, id: &ExpenseId) -> ExpenseResult<Expense> {
        let expense = self
            .manager
            .get(id)
            .ok_or_else(|| ExpenseError::expense_not_found(id.to_string()))?;

        self.audit.log(&AuditEntry::delete(
            EntityType::Expense,
            expense.id.to_string(),
            expense,
        ))?;

        let expense = self
            .manager
            .take(id)
            .ok_or_else(|| ExpenseError::expense_not_found(id.to_string()))?;
        self.dirty = true;
        Ok(expense)
    }

    /// Register a user category and remember it in the settings
    pub fn add_category(&mut self, name: &str) -> ExpenseResult<String> {
        let is_new = !self.manager.categories().contains(name);
        let canonical = self.manager.add_category(name)?;
        if is_new {
            self.remember_category(&canonical)?;
            self.audit.log(&AuditEntry::create(
                EntityType::Category,
                canonical.clone(),
                &canonical,
            ))?;
        }
        Ok(canonical)
    }

    fn remember_category(&mut self, name: &str) -> ExpenseResult<()> {
        if self.settings.remember_category(name) {
            self.settings.save(self.storage.paths())?;
        }
        Ok(())
    }

    /// Set the limit for (category, month); returns the replaced budget
    pub fn set_budget(&mut self, category: &str, month: Month, limit: Money) -> ExpenseResult<Option<Budget>> {
        let category = self.add_category(category)?;
        let budget = Budget::new(category, month, limit)?;
        let key = format!("{} {}", budget.category, budget.month);

        let previous = self.budgets.set(budget.clone());
        self.storage.save_budgets(&self.budgets)?;

        let entry = match &previous {
            Some(old) => AuditEntry::update(EntityType::Budget, key, old, &budget)
                .with_details(format!("limit {} -> {}", old.limit, budget.limit)),
            None => AuditEntry::create(EntityType::Budget, key, &budget),
        };
        self.audit.log(&entry)?;

        Ok(previous)
    }

    /// Remove the budget for (category, month)
    pub fn remove_budget(&mut self, category: &str, month: Month) -> ExpenseResult<Budget> {
        let removed = self
            .budgets
            .remove(category, month)
            .ok_or_else(|| ExpenseError::budget_not_found(format!("{} {}", category.trim(), month)))?;
        self.storage.save_budgets(&self.budgets)?;

        self.audit.log(&AuditEntry::delete(
            EntityType::Budget,
            format!("{} {}", removed.category, removed.month),
            &removed,
        ))?;
        Ok(removed)
    }

    /// Merge expenses from a CSV file
    pub fn import_csv(&mut self, path: &Path) -> ExpenseResult<ImportResult> {
        let rows = self.storage.import_csv(path)?;
        let result = self.manager.import(rows);

        if result.imported > 0 {
            let mut entries: Vec<AuditEntry> = result
                .imported_ids
                .iter()
                .filter_map(|id| self.manager.get(id))
                .map(|e| AuditEntry::create(EntityType::Expense, e.id.to_string(), e))
                .collect();
            entries.push(AuditEntry::store_event(
                Operation::Import,
                path.display().to_string(),
                result.summary(),
            ));
            if let Err(e) = self.audit.log_batch(&entries) {
                for id in &result.imported_ids {
                    self.manager.take(id);
                }
                return Err(e);
            }
            self.dirty = true;
        }

        Ok(result)
    }

    /// Export expenses to CSV; without a path, a dated file in the export directory
    pub fn export_csv<'a, I>(&self, expenses: I, path: Option<PathBuf>) -> ExpenseResult<(PathBuf, usize)>
    where
        I: IntoIterator<Item = &'a Expense>,
    {
        let path = path.unwrap_or_else(|| self.default_export_path("expenses"));
        let count = self.storage.export_csv(expenses, &path)?;
        tracing::info!(path = %path.display(), count, "exported expenses");
        Ok((path, count))
    }

    /// A timestamped CSV path in the export directory
    pub fn default_export_path(&self, stem: &str) -> PathBuf {
        self.storage.paths().export_dir().join(format!(
            "{}-{}.csv",
            stem,
            Local::now().format("%Y%m%d-%H%M%S")
        ))
    }

    /// Write the collection to disk if anything changed
    pub fn save(&mut self) -> ExpenseResult<Option<BackupInfo>> {
        if !self.dirty {
            return Ok(None);
        }

        let backup = self.storage.save(self.manager.collection())?;
        self.dirty = false;
        tracing::info!(count = self.manager.len(), "saved expense store");
        Ok(backup)
    }

    /// Save pending changes, then replace the store with a backup and reload
    pub fn restore(&mut self, backup_id: &str) -> ExpenseResult<RestoreResult> {
        self.save()?;
        let result = restore_backup(&self.storage, &self.audit, backup_id)?;
        self.manager.replace_all(self.storage.load()?);
        Ok(result)
    }
}

/// Restore a backup over the store and audit it
///
/// Works without loading the current store, so it can repair a damaged one.
pub fn restore_backup(storage: &Storage, audit: &AuditLogger, backup_id: &str) -> ExpenseResult<RestoreResult> {
    let result = storage.restore(backup_id)?;
    audit.log(&AuditEntry::store_event(
        Operation::Restore,
        result.backup_filename.clone(),
        result.summary(),
    ))?;
    Ok(result)
}
