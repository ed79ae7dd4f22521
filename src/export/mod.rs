// src/export/mod.rs

//! File exports of annotated time entries.

mod csv;
mod fs_utils;
mod json;
mod model;

pub use self::csv::write_csv;
pub use self::fs_utils::ensure_writable;
pub use self::json::write_json;
pub use self::model::EntryExport;

use crate::ui::messages::success;
use clap::ValueEnum;
use std::path::Path;

/// Common completion message for exports.
pub(crate) fn notify_export_success(label: &str, count: usize, path: &Path) {
    success(format!(
        "{label} export completed: {count} entr{} → {}",
        if count == 1 { "y" } else { "ies" },
        path.display()
    ));
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}
