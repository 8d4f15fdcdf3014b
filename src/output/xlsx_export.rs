//! Excel workbook export of company records
//!
//! One worksheet with the same header as the CSV export. Year and team size
//! are written as numbers; absent fields are left blank.

use crate::extract::CompanyRecord;
use crate::output::csv_export::COLUMNS;
use crate::output::traits::OutputResult;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::path::Path;

/// Title of the single worksheet
pub const SHEET_NAME: &str = "YC Companies";

/// Writes the records as an `.xlsx` workbook at `path`
///
/// # Arguments
///
/// * `path` - Destination file
/// * `records` - Records in output order
pub fn write_workbook(path: &Path, records: &[CompanyRecord]) -> OutputResult<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    let bold = Format::new().set_bold();
    for (col, title) in COLUMNS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, &bold)?;
    }

    for (i, record) in records.iter().enumerate() {
        write_row(sheet, i as u32 + 1, record)?;
    }

    workbook.save(path)?;
    tracing::info!("Wrote {} rows to {}", records.len(), path.display());
    Ok(())
}

fn write_row(sheet: &mut Worksheet, row: u32, record: &CompanyRecord) -> OutputResult<()> {
    let texts = [
        (0, Some(&record.link)),
        (1, record.active_founders.as_ref()),
        (2, record.founders_linkedin.as_ref()),
        (3, record.status.as_ref()),
        (4, record.website.as_ref()),
        (5, record.primary_partner.as_ref()),
        (8, record.batch.as_ref()),
        (9, record.location.as_ref()),
    ];
    for (col, value) in texts {
        if let Some(text) = value.filter(|t| !t.is_empty()) {
            sheet.write_string(row, col, text)?;
        }
    }

    for (col, value) in [(6, record.founded_year), (7, record.team_size)] {
        if let Some(n) = value {
            sheet.write_number(row, col, n as f64)?;
        }
    }
    Ok(())
}
