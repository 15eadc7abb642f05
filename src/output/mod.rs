//! Output module for price reports and crawl summaries
//!
//! This module handles:
//! - The `ReportWriter` seam and its JSON file implementation
//! - Keys identifying one report artifact
//! - Summaries of a city crawl

mod json_writer;
mod summary;
mod traits;

pub use json_writer::JsonReportWriter;
pub use summary::{print_summary, CrawlFailure, CrawlSummary};
pub use traits::{OutputError, OutputResult, ReportKey, ReportWriter};
