//! CSV export of company records
//!
//! The header is fixed; absent fields become empty cells.

use crate::extract::CompanyRecord;
use crate::output::traits::OutputResult;
use std::io::Write;
use std::path::Path;

/// Output columns, in order
pub const COLUMNS: [&str; 10] = [
    "YC Link",
    "Active Founders",
    "Founders LinkedIn Link",
    "Status",
    "Website",
    "Primary Partner",
    "Founded Year",
    "Team Size",
    "Batch",
    "Location",
];

/// Formats one record as a row matching [`COLUMNS`]
pub fn record_row(record: &CompanyRecord) -> [String; 10] {
    fn text(value: &Option<String>) -> String {
        value.clone().unwrap_or_default()
    }
    fn number(value: Option<i64>) -> String {
        value.map(|n| n.to_string()).unwrap_or_default()
    }

    [
        record.link.clone(),
        text(&record.active_founders),
        text(&record.founders_linkedin),
        text(&record.status),
        text(&record.website),
        text(&record.primary_partner),
        number(record.founded_year),
        number(record.team_size),
        text(&record.batch),
        text(&record.location),
    ]
}

/// Writes the header and one row per record to `writer`
pub fn write_records_to<W: Write>(writer: W, records: &[CompanyRecord]) -> OutputResult<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(COLUMNS)?;
    for record in records {
        csv.write_record(record_row(record))?;
    }
    csv.flush()?;
    Ok(())
}

/// Writes the records as a CSV file at `path`, replacing any existing file
///
/// # Arguments
///
/// * `path` - Destination file
/// * `records` - Records in output order
pub fn write_records(path: &Path, records: &[CompanyRecord]) -> OutputResult<()> {
    let file = std::fs::File::create(path)?;
    write_records_to(file, records)?;
    tracing::info!("Wrote {} rows to {}", records.len(), path.display());
    Ok(())
}
