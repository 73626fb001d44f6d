//! Finance Tracker - personal expense tracking from the terminal
//!
//! This library provides the core functionality for the `expense` command:
//! recording expenses, monthly category budgets, reports, CSV import and
//! export, and backups of the JSON store.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (money, months, expenses, budgets)
//! - `storage`: JSON file storage layer
//! - `services`: Business logic layer
//! - `reports`: Monthly, category, budget and statistics reports
//! - `export`: CSV export and import
//! - `display`: Terminal formatting
//! - `audit`: Audit logging system
//! - `backup`: Backup management
//! - `cli`: Command handlers and the interactive menu
//!
//! # Example
//!
//! ```rust,ignore
//! use finance_tracker::config::{paths::FinancePaths, settings::Settings};
//!
//! let paths = FinancePaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! ```

pub mod audit;
pub mod backup;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod reports;
pub mod services;
pub mod storage;

pub use error::{ExpenseError, ExpenseResult};
