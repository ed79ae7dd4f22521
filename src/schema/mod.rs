//! Collections known to the application and the static relational schema
//! linking them.

pub mod relations;

pub use relations::{Relation, relation, relations_of, resolve, validate};

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Organization,
    Project,
    Task,
    TimeEntry,
    User,
    Comment,
    Timer,
}

impl Collection {
    pub const ALL: [Collection; 7] = [
        Collection::Organization,
        Collection::Project,
        Collection::Task,
        Collection::TimeEntry,
        Collection::User,
        Collection::Comment,
        Collection::Timer,
    ];

    /// Timers live only in the local registry until submitted.
    pub fn is_remote(&self) -> bool {
        !matches!(self, Collection::Timer)
    }

    /// Storage table name, `None` for local-only collections.
    pub fn table_name(&self) -> Option<&'static str> {
        match self {
            Collection::Organization => Some("organizations"),
            Collection::Project => Some("projects"),
            Collection::Task => Some("tasks"),
            Collection::TimeEntry => Some("time_entries"),
            Collection::User => Some("users"),
            Collection::Comment => Some("comments"),
            Collection::Timer => None,
        }
    }

    pub fn remote() -> impl Iterator<Item = Collection> {
        Self::ALL.into_iter().filter(Collection::is_remote)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
