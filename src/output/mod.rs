//! Output module for the scraped results
//!
//! This module handles:
//! - Writing the ordered records as CSV or as an Excel workbook
//! - Converting an existing checkpoint without scraping
//! - Recording and printing run statistics
//!
//! The format follows the output file's extension: `.xlsx` writes a
//! workbook, anything else writes CSV.

mod csv_export;
pub mod stats;
mod traits;
mod xlsx_export;

pub use csv_export::{record_row, write_records, write_records_to, COLUMNS};
pub use stats::{print_statistics, RunStats};
pub use traits::{OutputError, OutputResult};
pub use xlsx_export::{write_workbook, SHEET_NAME};

use crate::checkpoint::read_entries;
use crate::extract::CompanyRecord;
use std::path::Path;

/// File formats the records can be written in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Xlsx,
}

impl OutputFormat {
    /// Picks the format from the file extension, ignoring case
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("xlsx") => OutputFormat::Xlsx,
            _ => OutputFormat::Csv,
        }
    }
}

/// Writes the records to `path` in the format its extension names
pub fn write_output(path: &Path, records: &[CompanyRecord]) -> OutputResult<()> {
    match OutputFormat::from_path(path) {
        OutputFormat::Csv => write_records(path, records),
        OutputFormat::Xlsx => write_workbook(path, records),
    }
}

/// Converts a checkpoint file into a CSV or workbook without scraping
///
/// Rows follow the checkpoint's entry order. Unlike resuming, an unreadable
/// checkpoint is an error here.
///
/// # Returns
///
/// * `Ok(usize)` - Number of rows written
/// * `Err(ScrapeError)` - The checkpoint could not be read or the output written
pub fn export_checkpoint(checkpoint: &Path, output: &Path) -> crate::Result<usize> {
    let records: Vec<CompanyRecord> = read_entries(checkpoint)?
        .into_iter()
        .map(|(_, record)| record)
        .collect();
    write_output(output, &records)?;
    Ok(records.len())
}
