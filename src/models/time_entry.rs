use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Durable record of worked time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEntry {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub task: Option<String>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub summary: String,
    pub date: NaiveDate, // "YYYY-MM-DD"
    /// Worked seconds.
    pub duration: i64,
}

super::entity!(TimeEntry, TimeEntry, [task, project, user]);
