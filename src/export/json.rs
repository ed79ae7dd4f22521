// src/export/json.rs

use crate::core::annotate::Annotated;
use crate::errors::AppResult;
use crate::models::TimeEntry;
use std::path::Path;

/// Write the annotated entries as pretty JSON, annotations included.
pub fn write_json(path: &Path, entries: &[Annotated<TimeEntry>]) -> AppResult<()> {
    let json = serde_json::to_string_pretty(entries)?;
    std::fs::write(path, json)?;
    Ok(())
}
