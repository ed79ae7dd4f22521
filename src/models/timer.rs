use crate::schema::Collection;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A client-local stopwatch. The registry key is held by the owning map,
/// not by the timer itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timer {
    /// `None` while paused.
    #[serde(default)]
    pub last_started: Option<DateTime<Utc>>,
    /// Seconds banked by previous running intervals.
    #[serde(default)]
    pub accumulated_seconds: u64,
    #[serde(default)]
    pub task: Option<String>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub summary: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Running,
    Paused,
}

impl Timer {
    pub fn state(&self) -> TimerState {
        if self.last_started.is_some() {
            TimerState::Running
        } else {
            TimerState::Paused
        }
    }

    pub fn is_running(&self) -> bool {
        self.last_started.is_some()
    }

    /// Elapsed seconds as seen at `now`. A start time in the future (clock
    /// moved backwards) contributes nothing; the sum saturates.
    pub fn elapsed_at(&self, now: DateTime<Utc>) -> u64 {
        let running = self
            .last_started
            .map(|started| (now - started).num_seconds().max(0) as u64)
            .unwrap_or(0);
        self.accumulated_seconds.saturating_add(running)
    }

    /// Bank the current running interval and stop.
    pub fn pause(&mut self, now: DateTime<Utc>) {
        if self.last_started.is_some() {
            self.accumulated_seconds = self.elapsed_at(now);
            self.last_started = None;
        }
    }
}

impl super::Relational for Timer {
    const COLLECTION: Collection = Collection::Timer;

    fn foreign_key(&self, field: &str) -> Option<&str> {
        match field {
            "task" => self.task.as_deref(),
            "project" => self.project.as_deref(),
            _ => None,
        }
    }
}
