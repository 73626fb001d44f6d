//! Interactive menu mode
//!
//! Runs when `expense` is started without a subcommand. Choices are looked
//! up in a table of `(label, handler)` pairs. Bad input is reported and
//! asked again; end of input saves and exits.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::audit::{AuditEntry, Operation};
use crate::config::paths::FinancePaths;
use crate::config::settings::Settings;
use crate::display::expense::{format_expense_details, format_expense_table};
use crate::error::{ExpenseError, ExpenseResult};
use crate::models::{parse_date, parse_tags, CategoryList, ExpenseId};
use crate::reports::{BudgetStatusReport, CategoryBreakdown, MonthSummary, MonthlyTotals, Statistics};
use crate::services::SearchFilter;

use super::args::{parse_amount, parse_date_or_today, parse_month_or_current};
use super::backup::format_backup_list;
use super::budget::format_budget_list;
use super::import::format_import_result;
use super::prompt::Prompter;
use super::report::write_csv_file;
use super::session::Session;

/// What the menu does after an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

type MenuAction = fn(&mut Session, &mut Prompter<'_>) -> ExpenseResult<Flow>;

const MAIN_MENU: &[(&str, MenuAction)] = &[
    ("Add expense", add_expense),
    ("View expenses", view_expenses),
    ("Search expenses", search_expenses),
    ("Delete expense", delete_expense),
    ("Reports", reports),
    ("Budgets", budgets),
    ("Export to CSV", export_csv),
    ("Import from CSV", import_csv),
    ("Back up now", backup_now),
    ("Restore from backup", restore),
    ("Save", save),
    ("Exit", exit),
];

/// Open the store, offering to start fresh if it is damaged
///
/// Returns `None` if the user declines.
pub fn open_or_recover(
    paths: FinancePaths,
    settings: Settings,
    prompter: &mut Prompter<'_>,
) -> ExpenseResult<Option<Session>> {
    match Session::open(paths.clone(), settings.clone()) {
        Ok(session) => Ok(Some(session)),
        Err(e) if e.is_corrupt() => {
            prompter.say(format!("The expense store could not be read.\n  {}", e))?;
            if !prompter.confirm("Start with an empty store? The damaged file is kept as a backup")? {
                return Ok(None);
            }
            let (session, backup) = Session::start_fresh(paths, settings)?;
            prompter.say(format!("Damaged store saved as backup {}", backup.id()))?;
            Ok(Some(session))
        }
        Err(e) => Err(e),
    }
}

/// Run the main menu until the user exits or input ends, then save
pub fn run_menu(session: &mut Session, prompter: &mut Prompter<'_>) -> ExpenseResult<()> {
    prompter.say(format!(
        "Personal Finance Tracker ({} expense(s) loaded, {} spent)",
        session.manager().len(),
        session.manager().total_spent()
    ))?;

    loop {
        prompter.say("")?;
        for (i, (label, _)) in MAIN_MENU.iter().enumerate() {
            prompter.say(format!("{:>3}. {}", i + 1, label))?;
        }

        let Some(choice) = prompter.read_line("Choose an option")? else {
            break;
        };

        let Some((_, action)) = pick(MAIN_MENU, &choice) else {
            prompter.say(format!("Invalid choice: '{}'", choice))?;
            continue;
        };

        match action(session, prompter) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Exit) => break,
            Err(e) => prompter.say(format!("Error: {}", e))?,
        }
    }

    if let Some(backup) = session.save()? {
        tracing::debug!(backup = %backup.filename, "saved on exit");
    }
    prompter.say("Goodbye!")
}

fn pick<'m, T>(menu: &'m [(&'static str, T)], choice: &str) -> Option<&'m (&'static str, T)> {
    choice
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| menu.get(i))
}

fn parse_category(categories: &CategoryList, input: &str) -> ExpenseResult<String> {
    if let Ok(position) = input.trim().parse::<usize>() {
        return categories
            .get_by_position(position)
            .map(str::to_string)
            .ok_or_else(|| ExpenseError::Validation(format!("No category number {}", position)));
    }
    if input.trim().is_empty() {
        return Err(ExpenseError::Validation("Category cannot be empty".into()));
    }
    Ok(input.trim().to_string())
}

fn parse_optional_date(input: &str) -> ExpenseResult<Option<chrono::NaiveDate>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(parse_date(input)?))
}

fn add_expense(session: &mut Session, p: &mut Prompter<'_>) -> ExpenseResult<Flow> {
    let Some(date) = p.ask("Date (YYYY-MM-DD, blank for today)", parse_date_or_today)? else {
        return Ok(Flow::Continue);
    };
    let Some(amount) = p.ask("Amount", parse_amount)? else {
        return Ok(Flow::Continue);
    };

    let categories = session.manager().categories().clone();
    for (i, name) in categories.iter().enumerate() {
        p.say(format!("{:>3}. {}", i + 1, name))?;
    }
    let Some(category) = p.ask("Category (number or new name)", |s| parse_category(&categories, s))? else {
        return Ok(Flow::Continue);
    };

    let Some(description) = p.read_line("Description")? else {
        return Ok(Flow::Continue);
    };
    let Some(tags) = p.read_line("Tags (comma-separated, optional)")? else {
        return Ok(Flow::Continue);
    };

    let expense = session.add_expense(date, amount, &category, &description, parse_tags(&tags))?;
    p.say(format!("Added: {} [{}]", expense, expense.id))?;
    Ok(Flow::Continue)
}

fn view_expenses(session: &mut Session, p: &mut Prompter<'_>) -> ExpenseResult<Flow> {
    p.print(format_expense_table(session.manager().all()))?;
    Ok(Flow::Continue)
}

fn search_expenses(session: &mut Session, p: &mut Prompter<'_>) -> ExpenseResult<Flow> {
    let mut filter = SearchFilter::new();

    let Some(text) = p.read_line("Text to find (blank for any)")? else {
        return Ok(Flow::Continue);
    };
    if !text.is_empty() {
        filter = filter.text(text);
    }

    let Some(category) = p.read_line("Category (blank for any)")? else {
        return Ok(Flow::Continue);
    };
    if !category.is_empty() {
        filter = filter.category(category);
    }

    let Some(from) = p.ask("From date (YYYY-MM-DD, blank for any)", parse_optional_date)? else {
        return Ok(Flow::Continue);
    };
    let Some(to) = p.ask("To date (YYYY-MM-DD, blank for any)", parse_optional_date)? else {
        return Ok(Flow::Continue);
    };
    filter.start_date = from;
    filter.end_date = to;

    p.print(format_expense_table(session.manager().search(&filter)))?;
    Ok(Flow::Continue)
}

fn delete_expense(session: &mut Session, p: &mut Prompter<'_>) -> ExpenseResult<Flow> {
    let lookup = |s: &str| -> ExpenseResult<Option<ExpenseId>> {
        if s.trim().is_empty() {
            return Ok(None);
        }
        session.manager().resolve_id(s).map(Some)
    };
    let Some(Some(id)) = p.ask("Expense id (blank to cancel)", lookup)? else {
        return Ok(Flow::Continue);
    };

    if let Some(expense) = session.manager().get(&id) {
        p.print(format_expense_details(expense))?;
    }
    if !p.confirm("Delete this expense?")? {
        p.say("Cancelled.")?;
        return Ok(Flow::Continue);
    }

    let expense = session.remove_expense(&id)?;
    p.say(format!("Deleted {}", expense.id))?;
    Ok(Flow::Continue)
}

const REPORT_MENU: &[&str] = &[
    "Monthly totals",
    "Month summary",
    "Category breakdown",
    "Budget status",
    "Statistics",
];

fn reports(session: &mut Session, p: &mut Prompter<'_>) -> ExpenseResult<Flow> {
    for (i, label) in REPORT_MENU.iter().enumerate() {
        p.say(format!("{:>3}. {}", i + 1, label))?;
    }
    let Some(choice) = p.ask("Report", |s| choose(REPORT_MENU.len(), s))? else {
        return Ok(Flow::Continue);
    };

    let expenses = session.manager().all();
    match choice {
        1 => {
            let report = MonthlyTotals::generate(expenses);
            show_report(p, report.format_terminal(), |w| report.export_csv(w))
        }
        2 => {
            let Some(month) = p.ask("Month (YYYY-MM, blank for current)", parse_month_or_current)? else {
                return Ok(Flow::Continue);
            };
            let report = MonthSummary::generate(expenses, month);
            show_report(p, report.format_terminal(), |w| report.export_csv(w))
        }
        3 => {
            let report = CategoryBreakdown::generate(expenses);
            show_report(p, report.format_terminal(), |w| report.export_csv(w))
        }
        4 => {
            let report = BudgetStatusReport::generate(expenses, session.budgets(), None);
            show_report(p, report.format_terminal(), |w| report.export_csv(w))
        }
        _ => {
            let report = Statistics::generate(expenses);
            show_report(p, report.format_terminal(), |w| report.export_csv(w))
        }
    }
}

fn choose(count: usize, input: &str) -> ExpenseResult<usize> {
    match input.trim().parse::<usize>() {
        Ok(n) if (1..=count).contains(&n) => Ok(n),
        _ => Err(ExpenseError::Validation(format!(
            "Enter a number from 1 to {}",
            count
        ))),
    }
}

fn show_report<C>(p: &mut Prompter<'_>, text: String, csv: C) -> ExpenseResult<Flow>
where
    C: FnOnce(&mut BufWriter<File>) -> ExpenseResult<()>,
{
    p.say(text)?;

    let Some(path) = p.read_line("Save as CSV (file name, blank to skip)")? else {
        return Ok(Flow::Continue);
    };
    if !path.is_empty() {
        write_csv_file(Path::new(&path), csv)?;
        p.say(format!("Report saved to {}", path))?;
    }
    Ok(Flow::Continue)
}

const BUDGET_MENU: &[&str] = &["List budgets", "Set a budget", "Remove a budget"];

fn budgets(session: &mut Session, p: &mut Prompter<'_>) -> ExpenseResult<Flow> {
    for (i, label) in BUDGET_MENU.iter().enumerate() {
        p.say(format!("{:>3}. {}", i + 1, label))?;
    }
    let Some(choice) = p.ask("Budget action", |s| choose(BUDGET_MENU.len(), s))? else {
        return Ok(Flow::Continue);
    };

    if choice == 1 {
        p.print(format_budget_list(session.budgets(), None))?;
        return Ok(Flow::Continue);
    }

    let categories = session.manager().categories().clone();
    let Some(category) = p.ask("Category", |s| parse_category(&categories, s))? else {
        return Ok(Flow::Continue);
    };
    let Some(month) = p.ask("Month (YYYY-MM, blank for current)", parse_month_or_current)? else {
        return Ok(Flow::Continue);
    };

    if choice == 3 {
        let removed = session.remove_budget(&category, month)?;
        p.say(format!("Removed budget: {}", removed))?;
        return Ok(Flow::Continue);
    }

    let Some(limit) = p.ask("Limit", parse_amount)? else {
        return Ok(Flow::Continue);
    };
    session.set_budget(&category, month, limit)?;
    p.say(format!("Budget for {} in {} set to {}", category, month, limit))?;
    Ok(Flow::Continue)
}

fn export_csv(session: &mut Session, p: &mut Prompter<'_>) -> ExpenseResult<Flow> {
    let Some(path) = p.read_line("Export file (blank for default)")? else {
        return Ok(Flow::Continue);
    };
    let path = (!path.is_empty()).then(|| PathBuf::from(path));

    let (path, count) = session.export_csv(session.manager().all(), path)?;
    p.say(format!("Exported {} expense(s) to {}", count, path.display()))?;
    Ok(Flow::Continue)
}

fn import_csv(session: &mut Session, p: &mut Prompter<'_>) -> ExpenseResult<Flow> {
    let Some(path) = p.read_line("CSV file to import")? else {
        return Ok(Flow::Continue);
    };
    if path.is_empty() {
        return Ok(Flow::Continue);
    }

    let result = session.import_csv(Path::new(&path))?;
    p.print(format_import_result(&result))?;
    Ok(Flow::Continue)
}

fn backup_now(session: &mut Session, p: &mut Prompter<'_>) -> ExpenseResult<Flow> {
    session.save()?;
    if !session.storage().store_exists() {
        p.say("Nothing to back up yet.")?;
        return Ok(Flow::Continue);
    }

    let backup = session.storage().create_backup()?;
    session.audit().log(&AuditEntry::store_event(
        Operation::Backup,
        backup.filename.clone(),
        "manual backup",
    ))?;
    p.say(format!("Backup created: {}", backup.filename))?;
    Ok(Flow::Continue)
}

fn restore(session: &mut Session, p: &mut Prompter<'_>) -> ExpenseResult<Flow> {
    let backups = session.storage().list_backups()?;
    if backups.is_empty() {
        p.say("No backups found.")?;
        return Ok(Flow::Continue);
    }
    p.print(format_backup_list(&backups, false))?;

    let lookup = |s: &str| -> ExpenseResult<Option<(String, String)>> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(None);
        }
        let id = match s.parse::<usize>() {
            Ok(n) => n
                .checked_sub(1)
                .and_then(|i| backups.get(i))
                .map(|b| b.id().to_string())
                .ok_or_else(|| ExpenseError::backup_not_found(s))?,
            Err(_) => s.to_string(),
        };
        let (_, validation) = session.storage().validate_backup(&id)?;
        Ok(Some((id, validation.summary())))
    };
    let Some(Some((id, summary))) = p.ask("Backup number or name (blank to cancel)", lookup)? else {
        return Ok(Flow::Continue);
    };
    p.say(summary)?;

    if !p.confirm("Replace all current expenses with this backup?")? {
        p.say("Cancelled.")?;
        return Ok(Flow::Continue);
    }

    let result = session.restore(&id)?;
    p.say(result.summary())?;
    Ok(Flow::Continue)
}

fn save(session: &mut Session, p: &mut Prompter<'_>) -> ExpenseResult<Flow> {
    if !session.is_dirty() {
        p.say("No unsaved changes.")?;
        return Ok(Flow::Continue);
    }
    session.save()?;
    p.say(format!("Saved {} expense(s).", session.manager().len()))?;
    Ok(Flow::Continue)
}

fn exit(_session: &mut Session, _p: &mut Prompter<'_>) -> ExpenseResult<Flow> {
    Ok(Flow::Exit)
}
