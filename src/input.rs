//! Target list loading
//!
//! Targets come from a CSV file with a header row. The configured link column
//! must be present; every non-empty value in it becomes a target, in file order.

use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading the target list
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Input CSV must have a \"{column}\" column")]
    MissingColumn { column: String },

    #[error("Failed to read input CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One page to scrape and its position in the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Zero-based position among the loaded targets
    pub index: usize,

    /// Page URL, also the key of the target's result
    pub link: String,
}

impl Target {
    pub fn new(index: usize, link: impl Into<String>) -> Self {
        Self {
            index,
            link: link.into(),
        }
    }
}

/// Loads targets from the CSV file at `path`
///
/// # Arguments
///
/// * `path` - Path to the input CSV
/// * `column` - Header of the column holding the links
///
/// # Returns
///
/// * `Ok(Vec<Target>)` - Targets in file order
/// * `Err(InputError)` - The file could not be read or lacks the column
pub fn load_targets(path: &Path, column: &str) -> Result<Vec<Target>, InputError> {
    let file = std::fs::File::open(path)?;
    read_targets(file, column)
}

/// Reads targets from any CSV source, see [`load_targets`]
pub fn read_targets<R: Read>(source: R, column: &str) -> Result<Vec<Target>, InputError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(source);

    let position = reader
        .headers()?
        .iter()
        .position(|header| header.trim_start_matches('\u{feff}').trim() == column)
        .ok_or_else(|| InputError::MissingColumn {
            column: column.to_string(),
        })?;

    let mut links = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(link) = record.get(position).map(str::trim) {
            if !link.is_empty() {
                links.push(link.to_string());
            }
        }
    }

    Ok(links
        .into_iter()
        .enumerate()
        .map(|(index, link)| Target::new(index, link))
        .collect())
}
