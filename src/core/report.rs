//! Duration totals over time entries.

use crate::client::{Aggregate, Condition, Endpoint, EntityClient};
use crate::core::annotate::lookup;
use crate::errors::AppResult;
use crate::models::TimeEntry;
use crate::schema::Collection;
use clap::ValueEnum;
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportDimension {
    Project,
    Task,
    User,
}

impl ReportDimension {
    pub fn field(&self) -> &'static str {
        match self {
            ReportDimension::Project => "project",
            ReportDimension::Task => "task",
            ReportDimension::User => "user",
        }
    }

    pub fn target(&self) -> Collection {
        match self {
            ReportDimension::Project => Collection::Project,
            ReportDimension::Task => Collection::Task,
            ReportDimension::User => Collection::User,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    /// Grouping id, `None` for entries without one.
    pub key: Option<String>,
    pub label: String,
    pub seconds: u64,
}

pub struct ReportLogic;

impl ReportLogic {
    /// Total tracked seconds per project, task or user for the entries
    /// matching `filter`, largest first.
    pub async fn totals<C: EntityClient>(
        client: &C,
        dimension: ReportDimension,
        filter: &Condition,
    ) -> AppResult<Vec<ReportRow>> {
        let groups = Endpoint::<C, TimeEntry>::new(client)
            .group_aggregate(dimension.field(), &Aggregate::sum("duration"), filter)
            .await?;

        let ids: Vec<String> = groups.iter().filter_map(|g| g.key.clone()).collect();
        let names = lookup(client, dimension.target(), &ids).await?;

        let mut rows: Vec<ReportRow> = groups
            .into_iter()
            .map(|g| {
                let label = match &g.key {
                    Some(id) => names
                        .get(id)
                        .map(|r| r.label().to_string())
                        .unwrap_or_else(|| format!("{id} (missing)")),
                    None => "(none)".to_string(),
                };
                ReportRow {
                    key: g.key,
                    label,
                    seconds: g.value.max(0.0) as u64,
                }
            })
            .collect();

        rows.sort_by(|a, b| b.seconds.cmp(&a.seconds).then_with(|| a.label.cmp(&b.label)));
        Ok(rows)
    }

    /// Tracked seconds per task for the given tasks, in one grouped query.
    pub async fn task_totals<C: EntityClient>(
        client: &C,
        task_ids: &[String],
    ) -> AppResult<HashMap<String, u64>> {
        if task_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let groups = Endpoint::<C, TimeEntry>::new(client)
            .group_aggregate(
                "task",
                &Aggregate::sum("duration"),
                &Condition::inside("task", task_ids.iter().cloned()),
            )
            .await?;

        Ok(groups
            .into_iter()
            .filter_map(|g| g.key.map(|k| (k, g.value.max(0.0) as u64)))
            .collect())
    }
}
