//! Output module: the dataset and everything written at the end of a run
//!
//! This module handles:
//! - Aggregating page outcomes into the final ordered dataset
//! - Writing the dataset as CSV
//! - Building, printing and exporting the run report

mod csv_output;
mod dataset;
mod markdown;
mod report;

pub use csv_output::write_csv;
pub use dataset::{Dataset, Record};
pub use markdown::{format_markdown_report, write_markdown_report};
pub use report::{print_report, CrawlReport, PageSummary};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Creates the parent directory of `path` if it is missing
pub(crate) fn ensure_parent_dir(path: &std::path::Path) -> OutputResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
