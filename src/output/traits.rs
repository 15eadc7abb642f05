//! Report writer trait and types
//!
//! This module defines the trait interface for report writers and the key
//! that identifies one report artifact.

use crate::report::ReportRecord;
use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Identifies one report: a single category of a single store on a given day
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReportKey {
    pub city: String,
    pub date: NaiveDate,
    pub store_name: String,
    pub category_slug: String,
}

impl ReportKey {
    /// Date stamp used in report locations, `DD-MM-YY`
    pub fn date_stamp(&self) -> String {
        self.date.format("%d-%m-%y").to_string()
    }
}

/// Trait for report writers
///
/// Each `ReportKey` maps to a distinct artifact, so a writer never has to
/// merge two reports.
pub trait ReportWriter: Send + Sync {
    /// Writes one report, replacing any previous report with the same key
    ///
    /// # Returns
    ///
    /// The location of the written artifact
    fn write_report(&self, key: &ReportKey, records: &[ReportRecord]) -> OutputResult<PathBuf>;
}
