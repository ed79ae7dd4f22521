// src/export/model.rs

use crate::core::annotate::Annotated;
use crate::models::{Relational, TimeEntry};
use crate::utils::time::format_seconds;
use serde::Serialize;

/// Flat row for tabular exports: relation ids replaced by their labels.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct EntryExport {
    pub id: String,
    pub date: String,
    pub project: String,
    pub task: String,
    pub user: String,
    pub summary: String,
    pub duration_seconds: i64,
    pub duration: String,
}

/// Label of `relation` if resolved, else the raw id, else empty.
fn label_or_id(entry: &Annotated<TimeEntry>, relation: &str) -> String {
    entry
        .annotations
        .label(relation)
        .map(str::to_string)
        .or_else(|| entry.item.foreign_key(relation).map(str::to_string))
        .unwrap_or_default()
}

impl From<&Annotated<TimeEntry>> for EntryExport {
    fn from(entry: &Annotated<TimeEntry>) -> Self {
        Self {
            id: entry.id.clone(),
            date: entry.date.to_string(),
            project: label_or_id(entry, "project"),
            task: label_or_id(entry, "task"),
            user: label_or_id(entry, "user"),
            summary: entry.summary.clone(),
            duration_seconds: entry.duration,
            duration: format_seconds(entry.duration.max(0) as u64),
        }
    }
}
