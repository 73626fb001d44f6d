//! CSV export and import of expenses
//!
//! Export writes `id,date,amount,category,description,tags`, with tags joined
//! by commas in one field. Import finds columns by header name; `id`,
//! `description` and `tags` may be absent. Each data row comes back as either
//! a parsed expense or an error tied to its line.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};

use crate::error::{ExpenseError, ExpenseResult};
use crate::models::{parse_date, parse_tags, Expense, ExpenseId, Money};

/// Header row written by [`write_expenses_csv`]
pub const CSV_HEADERS: [&str; 6] = ["id", "date", "amount", "category", "description", "tags"];

/// Write expenses as CSV, returning the number of data rows
pub fn write_expenses_csv<'a, W, I>(writer: W, expenses: I) -> ExpenseResult<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a Expense>,
{
    let mut csv = WriterBuilder::new().from_writer(writer);
    csv.write_record(CSV_HEADERS)
        .map_err(|e| ExpenseError::Export(e.to_string()))?;

    let mut rows = 0;
    for expense in expenses {
        csv.write_record([
            expense.id.full(),
            expense.date.format(crate::models::DATE_FORMAT).to_string(),
            expense.amount.to_decimal_string(),
            expense.category.clone(),
            expense.description.clone(),
            expense.tags.join(","),
        ])
        .map_err(|e| ExpenseError::Export(e.to_string()))?;
        rows += 1;
    }

    csv.flush()
        .map_err(|e| ExpenseError::Export(e.to_string()))?;
    Ok(rows)
}

/// Export expenses to a CSV file, creating parent directories as needed
pub fn export_expenses_csv<'a, I>(path: &Path, expenses: I) -> ExpenseResult<usize>
where
    I: IntoIterator<Item = &'a Expense>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            ExpenseError::Io(format!("Failed to create {}: {}", parent.display(), e))
        })?;
    }

    let file = File::create(path)
        .map_err(|e| ExpenseError::Io(format!("Failed to create {}: {}", path.display(), e)))?;

    let rows = write_expenses_csv(file, expenses)?;
    tracing::info!(path = %path.display(), rows, "exported expenses to CSV");
    Ok(rows)
}

/// Column positions found in an import header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    pub id: Option<usize>,
    pub date: usize,
    pub amount: usize,
    pub category: usize,
    pub description: Option<usize>,
    pub tags: Option<usize>,
}

impl ColumnMapping {
    /// Detect column mapping from the header record
    ///
    /// Header names are matched case-insensitively; `date`, `amount` and
    /// `category` are required.
    pub fn from_headers(headers: &StringRecord) -> ExpenseResult<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let require = |name: &str| {
            find(name).ok_or_else(|| {
                ExpenseError::Import(format!("Missing required column '{}'", name))
            })
        };

        Ok(Self {
            id: find("id"),
            date: require("date")?,
            amount: require("amount")?,
            category: require("category")?,
            description: find("description"),
            tags: find("tags"),
        })
    }
}

/// One data row read from an import file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRow {
    /// Line number in the file (the header is line 1)
    pub line: u64,
    /// The parsed expense, or why the row was rejected
    pub result: Result<Expense, String>,
}

/// Read expenses from CSV
///
/// A missing or unusable header is an `Import` error; bad data rows are
/// returned as row errors so the caller can skip them.
pub fn read_expenses_csv<R: Read>(reader: R) -> ExpenseResult<Vec<ParsedRow>> {
    let mut csv = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = csv
        .headers()
        .map_err(|e| ExpenseError::Import(format!("Failed to read CSV header: {}", e)))?
        .clone();
    let mapping = ColumnMapping::from_headers(&headers)?;

    let mut rows = Vec::new();
    for (idx, record) in csv.records().enumerate() {
        let fallback_line = idx as u64 + 2;
        let row = match record {
            Ok(record) => ParsedRow {
                line: record.position().map_or(fallback_line, |p| p.line()),
                result: parse_record(&record, &mapping),
            },
            Err(e) => ParsedRow {
                line: e.position().map_or(fallback_line, |p| p.line()),
                result: Err(format!("Unreadable row: {}", e)),
            },
        };
        rows.push(row);
    }

    Ok(rows)
}

/// Read an import file from disk
pub fn import_expenses_csv(path: &Path) -> ExpenseResult<Vec<ParsedRow>> {
    if !path.exists() {
        return Err(ExpenseError::file_not_found(path.display().to_string()));
    }

    let file = File::open(path)
        .map_err(|e| ExpenseError::Io(format!("Failed to open {}: {}", path.display(), e)))?;

    let rows = read_expenses_csv(file)?;
    tracing::debug!(path = %path.display(), rows = rows.len(), "read CSV import");
    Ok(rows)
}

/// Parse a single CSV record
fn parse_record(record: &StringRecord, mapping: &ColumnMapping) -> Result<Expense, String> {
    let field = |idx: usize| record.get(idx).unwrap_or("");
    let optional = |idx: Option<usize>| idx.and_then(|i| record.get(i)).unwrap_or("");

    let date = parse_date(field(mapping.date)).map_err(|e| e.to_string())?;
    let amount = Money::parse(field(mapping.amount)).map_err(|e| e.to_string())?;

    let id = match optional(mapping.id) {
        "" => ExpenseId::new(),
        raw => raw
            .parse::<ExpenseId>()
            .map_err(|_| format!("Invalid expense id: {}", raw))?,
    };

    let expense = Expense::with_id(
        id,
        date,
        amount,
        field(mapping.category),
        optional(mapping.description),
    )
    .map_err(|e| e.to_string())?;

    Ok(expense.with_tags(parse_tags(optional(mapping.tags))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn expense(description: &str) -> Expense {
        Expense::new(
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            Money::from_cents(2550),
            "Food",
            description,
        )
        .unwrap()
    }

    fn export_to_string(expenses: &[Expense]) -> String {
        let mut buffer = Vec::new();
        write_expenses_csv(&mut buffer, expenses).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_export_header_and_row() {
        let e = expense("Lunch");
        let output = export_to_string(std::slice::from_ref(&e));

        let mut lines = output.lines();
        assert_eq!(lines.next(), Some("id,date,amount,category,description,tags"));
        assert_eq!(
            lines.next(),
            Some(format!("{},2024-01-15,25.50,Food,Lunch,", e.id.full()).as_str())
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_export_writes_tags_column() {
        let e = expense("Lunch").with_tags(["work", "travel"]);
        let output = export_to_string(std::slice::from_ref(&e));

        assert!(output.ends_with("Food,Lunch,\"work,travel\"\n"));

        let rows = read_expenses_csv(output.as_bytes()).unwrap();
        let imported = rows[0].result.as_ref().unwrap();
        assert_eq!(imported.tags, vec!["work", "travel"]);
        assert_eq!(imported, &e);
    }

    #[test]
    fn test_import_keeps_short_ids() {
        let input = "id,date,amount,category\na1b2c3d4,2024-01-05,1.00,Food\n";
        let rows = read_expenses_csv(input.as_bytes()).unwrap();

        let expense = rows[0].result.as_ref().unwrap();
        assert_eq!(expense.id, ExpenseId::Legacy("a1b2c3d4".into()));
    }

    #[test]
    fn test_export_quotes_commas_and_quotes() {
        let output = export_to_string(&[expense("Dinner, with \"friends\"")]);
        assert!(output.contains("\"Dinner, with \"\"friends\"\"\""));
    }

    #[test]
    fn test_export_empty_is_header_only() {
        assert_eq!(export_to_string(&[]), "id,date,amount,category,description,tags\n");
    }

    #[test]
    fn test_export_then_import_preserves_ids() {
        let originals = vec![expense("Lunch"), expense("Dinner, late").with_tags(["date night"])];
        let output = export_to_string(&originals);

        let rows = read_expenses_csv(output.as_bytes()).unwrap();
        let imported: Vec<Expense> = rows.into_iter().map(|r| r.result.unwrap()).collect();

        assert_eq!(imported, originals);
    }

    #[test]
    fn test_import_reports_bad_rows_with_lines() {
        let input = "date,amount,category,description\n\
                     2024-01-05,12.50,Food,Groceries\n\
                     2024-13-01,5.00,Food,Bad month\n\
                     2024-01-06,-3.00,Food,Refund\n\
                     2024-01-07,abc,Food,Garbage\n\
                     2024-01-08,4.00,,No category\n";

        let rows = read_expenses_csv(input.as_bytes()).unwrap();

        assert_eq!(rows.len(), 5);
        assert!(rows[0].result.is_ok());
        let bad_lines: Vec<u64> = rows
            .iter()
            .filter(|r| r.result.is_err())
            .map(|r| r.line)
            .collect();
        assert_eq!(bad_lines, vec![3, 4, 5, 6]);
    }

    #[test]
    fn test_import_without_id_assigns_fresh_ids() {
        let input = "date,amount,category\n2024-01-05,1.00,Food\n2024-01-05,1.00,Food\n";
        let rows = read_expenses_csv(input.as_bytes()).unwrap();

        let a = rows[0].result.as_ref().unwrap();
        let b = rows[1].result.as_ref().unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.description, "");
    }

    #[test]
    fn test_import_reads_tags_column() {
        let input = "Date,Amount,Category,Description,Tags\n2024-01-05,$8.00,Food,Snacks,\"work, travel\"\n";
        let rows = read_expenses_csv(input.as_bytes()).unwrap();

        let expense = rows[0].result.as_ref().unwrap();
        assert_eq!(expense.tags, vec!["work", "travel"]);
        assert_eq!(expense.amount, Money::from_cents(800));
    }

    #[test]
    fn test_import_missing_required_column() {
        let err = read_expenses_csv("date,description\n2024-01-01,x\n".as_bytes()).unwrap_err();
        assert!(matches!(err, ExpenseError::Import(_)));
    }

    #[test]
    fn test_export_file_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("exports").join("out.csv");

        let rows = export_expenses_csv(&path, &[expense("Lunch")]).unwrap();

        assert_eq!(rows, 1);
        assert!(path.exists());
    }

    #[test]
    fn test_import_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = import_expenses_csv(&temp_dir.path().join("none.csv")).unwrap_err();
        assert!(err.is_not_found());
    }
}
