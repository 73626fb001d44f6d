//! Export module for the finance tracker
//!
//! CSV is the exchange format: expenses export to a spreadsheet-compatible
//! file and the same layout imports back.

pub mod csv;

pub use csv::{
    export_expenses_csv, import_expenses_csv, read_expenses_csv, write_expenses_csv,
    ColumnMapping, ParsedRow, CSV_HEADERS,
};
