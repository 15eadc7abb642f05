//! JSON report files
//!
//! Reports land at `<root>/<city>/<DD-MM-YY>/<store name>/<category slug>.json`,
//! one pretty-printed JSON array per file. Distinct store names can sanitize to
//! the same component; the crawl summary lists such reused paths.

use crate::output::traits::{OutputResult, ReportKey, ReportWriter};
use crate::report::ReportRecord;
use std::path::{Path, PathBuf};

/// Writes each report as a JSON file under a root directory
#[derive(Debug, Clone)]
pub struct JsonReportWriter {
    root: PathBuf,
}

impl JsonReportWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of the report for `key`
    pub fn report_path(&self, key: &ReportKey) -> PathBuf {
        self.root
            .join(path_component(&key.city))
            .join(key.date_stamp())
            .join(path_component(&key.store_name))
            .join(format!("{}.json", path_component(&key.category_slug)))
    }
}

impl ReportWriter for JsonReportWriter {
    fn write_report(&self, key: &ReportKey, records: &[ReportRecord]) -> OutputResult<PathBuf> {
        let path = self.report_path(key);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let payload = serde_json::to_vec_pretty(records)?;
        std::fs::write(&path, payload)?;

        tracing::debug!("Wrote {} records to {}", records.len(), path.display());
        Ok(path)
    }
}

/// Makes a name safe to use as a single path component
fn path_component(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect();

    match cleaned.as_str() {
        "" | "." | ".." => "_".to_string(),
        _ => cleaned,
    }
}
