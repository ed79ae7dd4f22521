// src/export/csv.rs

use super::model::EntryExport;
use crate::errors::AppResult;
use std::path::Path;

/// Write the rows as CSV with a header line.
pub fn write_csv(path: &Path, rows: &[EntryExport]) -> AppResult<()> {
    let mut wtr = ::csv::Writer::from_path(path)?;

    for row in rows {
        wtr.serialize(row)?;
    }

    wtr.flush()?;
    Ok(())
}
