use crate::client::{EntityClient, Order, Query};
use crate::core::annotate::{Annotated, AnnotatedEndpoint};
use crate::errors::AppResult;
use crate::export::{
    EntryExport, ExportFormat, ensure_writable, notify_export_success, write_csv, write_json,
};
use crate::models::TimeEntry;
use crate::utils::date::range_condition;
use std::path::Path;

pub struct ExportLogic;

impl ExportLogic {
    /// Annotated time entries in `range` (all when `None`), oldest first.
    pub async fn collect<C: EntityClient>(
        client: &C,
        range: &Option<String>,
    ) -> AppResult<Vec<Annotated<TimeEntry>>> {
        let condition = range_condition(range, "date")?;
        let endpoint: AnnotatedEndpoint<C, TimeEntry> =
            AnnotatedEndpoint::new(client, &["project", "task", "user"])?;
        endpoint
            .query(&Query::new(condition).order_by("date", Order::Asc))
            .await
    }

    /// Export time entries.
    ///
    /// - `range`: `None` or expressions like `YYYY`, `YYYY-MM`,
    ///   `YYYY-MM-DD` and `A:B` spans of those.
    /// - CSV rows carry relation labels; JSON keeps the full
    ///   `annotations` object of each entry.
    pub async fn export<C: EntityClient>(
        client: &C,
        format: ExportFormat,
        file: &Path,
        range: &Option<String>,
        force: bool,
    ) -> AppResult<usize> {
        let entries = Self::collect(client, range).await?;
        ensure_writable(file, force)?;

        match format {
            ExportFormat::Csv => {
                let rows: Vec<EntryExport> = entries.iter().map(EntryExport::from).collect();
                write_csv(file, &rows)?;
                notify_export_success("CSV", rows.len(), file);
            }
            ExportFormat::Json => {
                write_json(file, &entries)?;
                notify_export_success("JSON", entries.len(), file);
            }
        }

        log::info!("exported {} entries as {}", entries.len(), format.as_str());
        Ok(entries.len())
    }
}
