//! Command handlers: each one opens what it needs from the configuration,
//! drives the async core with `block_on` and prints the outcome.

pub mod comment;
pub mod config;
pub mod entry;
pub mod export;
pub mod init;
pub mod log;
pub mod org;
pub mod project;
pub mod report;
pub mod task;
pub mod timer;
pub mod user;

use crate::client::SqliteClient;
use crate::config::Config;
use crate::core::timer::TimerManager;
use crate::core::timer_store::FileTimerStore;
use crate::db::log::ttlog;
use crate::errors::AppResult;
use crate::ui::messages::warning;
use crate::utils::time::SystemClock;

pub(crate) fn open_client(cfg: &Config) -> AppResult<SqliteClient> {
    SqliteClient::open(&cfg.database_path())
}

pub(crate) fn open_timers(cfg: &Config) -> AppResult<TimerManager> {
    TimerManager::open(
        Box::new(FileTimerStore::new(cfg.timers_path())),
        Box::new(SystemClock),
        cfg.user.clone(),
    )
}

/// Append to the internal log; a failure only warns.
pub(crate) fn audit(client: &SqliteClient, operation: &str, target: &str, message: &str) {
    if let Err(e) = ttlog(client.conn(), operation, target, message) {
        warning(format!("Failed to write internal log: {e}"));
    }
}
