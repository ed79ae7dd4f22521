//! Registry of client-local timers.
//!
//! At most one timer runs at a time: every operation that starts a timer
//! pauses the running one first, banking its elapsed seconds. Elapsed time
//! is derived from `last_started` on demand, never counted by a ticker, so
//! it stays correct across suspends and restarts. Every mutation is
//! written through to the [`TimerStore`].

use crate::client::{Endpoint, EntityClient};
use crate::core::timer_store::{TimerRegistry, TimerStore};
use crate::errors::{AppError, AppResult};
use crate::models::{TimeEntry, Timer, TimerState};
use crate::utils::time::{Clock, MAX_DURATION_SECS};
use chrono::{DateTime, Local, Utc};

/// Initial fields of a timer created with [`TimerManager::new_timer`].
#[derive(Debug, Clone, Default)]
pub struct NewTimer {
    /// Explicit key; a random UUID is used when `None`.
    pub key: Option<String>,
    pub task: Option<String>,
    pub project: Option<String>,
    pub summary: String,
}

/// Partial change merged by [`TimerManager::update`]. `None` leaves a
/// field untouched; for optional fields `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct TimerUpdate {
    pub summary: Option<String>,
    pub task: Option<Option<String>>,
    pub project: Option<Option<String>>,
    pub accumulated_seconds: Option<u64>,
    pub last_started: Option<Option<DateTime<Utc>>>,
}

pub struct TimerManager {
    timers: TimerRegistry,
    store: Box<dyn TimerStore>,
    clock: Box<dyn Clock>,
    user: Option<String>,
}

impl TimerManager {
    /// Load the registry from `store`. `user` is recorded on submitted
    /// entries.
    pub fn open(
        store: Box<dyn TimerStore>,
        clock: Box<dyn Clock>,
        user: Option<String>,
    ) -> AppResult<Self> {
        let timers = store.load()?;
        let mut manager = Self {
            timers,
            store,
            clock,
            user,
        };
        if manager.normalize() {
            manager.persist()?;
        }
        Ok(manager)
    }

    /// Repair a stored registry with several running timers: the most
    /// recently started one keeps running.
    fn normalize(&mut self) -> bool {
        let keep = self
            .timers
            .iter()
            .filter_map(|(key, t)| t.last_started.map(|started| (started, key.clone())))
            .max()
            .map(|(_, key)| key);

        let Some(keep) = keep else {
            return false;
        };

        let extra = self
            .timers
            .iter()
            .filter(|(key, t)| t.is_running() && **key != keep)
            .count();
        if extra == 0 {
            return false;
        }

        log::warn!("{extra} extra running timer(s) found in store, keeping '{keep}' running");
        let now = self.clock.now();
        self.pause_others(&keep, now);
        true
    }

    fn persist(&self) -> AppResult<()> {
        self.store.save(&self.timers)
    }

    fn not_found(key: &str) -> AppError {
        log::error!("timer '{key}' is not in the registry");
        AppError::TimerNotFound(key.to_string())
    }

    fn timer_mut(&mut self, key: &str) -> AppResult<&mut Timer> {
        self.timers.get_mut(key).ok_or_else(|| Self::not_found(key))
    }

    fn pause_others(&mut self, except: &str, now: DateTime<Utc>) {
        for (key, timer) in self.timers.iter_mut() {
            if key != except {
                timer.pause(now);
            }
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn get(&self, key: &str) -> AppResult<&Timer> {
        self.timers.get(key).ok_or_else(|| Self::not_found(key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.timers.contains_key(key)
    }

    pub fn timers(&self) -> impl Iterator<Item = (&str, &Timer)> {
        self.timers.iter().map(|(k, t)| (k.as_str(), t))
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn running(&self) -> Option<(&str, &Timer)> {
        self.timers().find(|(_, t)| t.is_running())
    }

    pub fn elapsed(&self, key: &str) -> AppResult<u64> {
        Ok(self.get(key)?.elapsed_at(self.clock.now()))
    }

    /// Key of the timer tracking `task_id`, if any.
    pub fn timer_for_task(&self, task_id: &str) -> Option<&str> {
        self.timers()
            .find(|(_, t)| t.task.as_deref() == Some(task_id))
            .map(|(k, _)| k)
    }

    /// Create a running timer, pausing whichever timer was running.
    pub fn new_timer(&mut self, initial: NewTimer) -> AppResult<String> {
        let key = initial
            .key
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        if self.timers.contains_key(&key) {
            return Err(AppError::TimerExists(key));
        }

        let now = self.clock.now();
        self.pause_others(&key, now);
        self.timers.insert(
            key.clone(),
            Timer {
                last_started: Some(now),
                accumulated_seconds: 0,
                task: initial.task,
                project: initial.project,
                summary: initial.summary,
            },
        );
        self.persist()?;
        Ok(key)
    }

    /// Pause a running timer, or resume a paused one after pausing the
    /// timer currently running. Returns the new state.
    pub fn toggle(&mut self, key: &str) -> AppResult<TimerState> {
        let now = self.clock.now();
        let state = match self.get(key)?.state() {
            TimerState::Running => {
                self.timer_mut(key)?.pause(now);
                TimerState::Paused
            }
            TimerState::Paused => {
                self.pause_others(key, now);
                self.timer_mut(key)?.last_started = Some(now);
                TimerState::Running
            }
        };
        self.persist()?;
        Ok(state)
    }

    /// Merge field changes. Clearing `last_started` stops the timer without
    /// banking; setting it makes this the running timer.
    pub fn update(&mut self, key: &str, changes: TimerUpdate) -> AppResult<()> {
        self.get(key)?;
        if let Some(secs) = changes.accumulated_seconds
            && secs > MAX_DURATION_SECS
        {
            return Err(AppError::InvalidDuration(format!("{secs}s")));
        }
        if let Some(Some(_)) = changes.last_started {
            let now = self.clock.now();
            self.pause_others(key, now);
        }

        let timer = self.timer_mut(key)?;
        if let Some(summary) = changes.summary {
            timer.summary = summary;
        }
        if let Some(task) = changes.task {
            timer.task = task;
        }
        if let Some(project) = changes.project {
            timer.project = project;
        }
        if let Some(secs) = changes.accumulated_seconds {
            timer.accumulated_seconds = secs;
        }
        if let Some(last_started) = changes.last_started {
            timer.last_started = last_started;
        }
        self.persist()
    }

    /// Drop a timer without submitting it.
    pub fn remove(&mut self, key: &str) -> AppResult<Timer> {
        let timer = self.timers.remove(key).ok_or_else(|| Self::not_found(key))?;
        self.persist()?;
        Ok(timer)
    }

    /// Turn a timer into a time entry. The timer needs a project; it is
    /// removed only once the entry has been created, so a failed insert
    /// leaves it untouched for a retry. Once the entry exists the call
    /// succeeds even if the registry cannot be saved.
    pub async fn submit<C: EntityClient>(&mut self, key: &str, client: &C) -> AppResult<TimeEntry> {
        let timer = self.get(key)?.clone();
        let project = timer
            .project
            .clone()
            .ok_or_else(|| AppError::MissingProject(key.to_string()))?;

        let now = self.clock.now();
        let elapsed = timer.elapsed_at(now);
        let duration = i64::try_from(elapsed)
            .map_err(|_| AppError::InvalidDuration(format!("{elapsed}s on timer '{key}'")))?;
        let entry = TimeEntry {
            id: String::new(),
            task: timer.task.clone(),
            project: Some(project),
            user: self.user.clone(),
            summary: timer.summary.clone(),
            date: now.with_timezone(&Local).date_naive(),
            duration,
        };

        let created = Endpoint::<C, TimeEntry>::new(client).insert(&entry).await?;

        self.timers.remove(key);
        if let Err(e) = self.persist() {
            // A stale registry would resubmit the timer on next load.
            log::warn!("saving registry after submitting '{key}' failed: {e}; retrying");
            if let Err(e) = self.persist() {
                log::error!(
                    "timer '{key}' was submitted as entry {} but the registry could not be saved: {e}",
                    created.id
                );
            }
        }
        Ok(created)
    }
}
