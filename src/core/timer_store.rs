//! Durable storage of the timer registry.

use crate::errors::AppResult;
use crate::models::Timer;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

/// Timer key → timer, as persisted.
pub type TimerRegistry = BTreeMap<String, Timer>;

pub trait TimerStore {
    /// Stored registry, empty if nothing was ever saved.
    fn load(&self) -> AppResult<TimerRegistry>;

    fn save(&self, registry: &TimerRegistry) -> AppResult<()>;
}

/// JSON file on disk. Writes go to a sibling temporary file which is then
/// renamed over the target, so a crash never leaves a truncated registry.
pub struct FileTimerStore {
    path: PathBuf,
}

impl FileTimerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TimerStore for FileTimerStore {
    fn load(&self) -> AppResult<TimerRegistry> {
        if !self.path.exists() {
            return Ok(TimerRegistry::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(TimerRegistry::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, registry: &TimerRegistry) -> AppResult<()> {
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(registry)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// In-memory store keeping the serialized JSON, so a reload goes through
/// the same serialization as the file store. Clones share the same slot.
#[derive(Clone, Default)]
pub struct MemoryTimerStore {
    slot: Rc<RefCell<Option<String>>>,
}

impl MemoryTimerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TimerStore for MemoryTimerStore {
    fn load(&self) -> AppResult<TimerRegistry> {
        match self.slot.borrow().as_deref() {
            Some(json) => Ok(serde_json::from_str(json)?),
            None => Ok(TimerRegistry::new()),
        }
    }

    fn save(&self, registry: &TimerRegistry) -> AppResult<()> {
        *self.slot.borrow_mut() = Some(serde_json::to_string(registry)?);
        Ok(())
    }
}
