//! Configuration module for the finance tracker
//!
//! This module provides configuration management including:
//! - Platform path resolution with environment and settings overrides
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::FinancePaths;
pub use settings::{BackupRetention, PathOverrides, Settings};
