//! Entity types exchanged with the entity client, plus the local timer.

pub mod comment;
pub mod organization;
pub mod project;
pub mod task;
pub mod time_entry;
pub mod timer;
pub mod user;

pub use comment::Comment;
pub use organization::Organization;
pub use project::Project;
pub use task::{Task, TaskStatus};
pub use time_entry::TimeEntry;
pub use timer::{Timer, TimerState};
pub use user::User;

use crate::client::Record;
use crate::errors::{AppError, AppResult};
use crate::schema::Collection;
use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};

/// Anything that can sit on the base side of a relation.
pub trait Relational {
    const COLLECTION: Collection;

    /// Value of the foreign-key field `field`, `None` when absent.
    fn foreign_key(&self, field: &str) -> Option<&str>;
}

/// A record type stored behind the entity client.
pub trait Entity: Relational + Serialize + DeserializeOwned + Clone {
    fn id(&self) -> &str;

    fn into_related(self) -> Related;

    fn from_related(related: &Related) -> Option<&Self>;

    fn to_record(&self) -> AppResult<Record> {
        match serde_json::to_value(self)? {
            serde_json::Value::Object(map) => Ok(map),
            other => Err(AppError::InvalidRecord {
                collection: Self::COLLECTION,
                message: format!("expected an object, got {other}"),
            }),
        }
    }

    fn from_record(record: Record) -> AppResult<Self> {
        serde_json::from_value(serde_json::Value::Object(record)).map_err(|e| {
            AppError::InvalidRecord {
                collection: Self::COLLECTION,
                message: e.to_string(),
            }
        })
    }
}

/// A resolved related entity, whatever its collection.
#[derive(Debug, Clone, PartialEq)]
pub enum Related {
    Organization(Organization),
    Project(Project),
    Task(Task),
    TimeEntry(TimeEntry),
    User(User),
    Comment(Comment),
}

impl Related {
    pub fn from_record(collection: Collection, record: Record) -> AppResult<Self> {
        Ok(match collection {
            Collection::Organization => Organization::from_record(record)?.into_related(),
            Collection::Project => Project::from_record(record)?.into_related(),
            Collection::Task => Task::from_record(record)?.into_related(),
            Collection::TimeEntry => TimeEntry::from_record(record)?.into_related(),
            Collection::User => User::from_record(record)?.into_related(),
            Collection::Comment => Comment::from_record(record)?.into_related(),
            Collection::Timer => return Err(AppError::LocalCollection(collection)),
        })
    }

    pub fn id(&self) -> &str {
        match self {
            Related::Organization(v) => v.id(),
            Related::Project(v) => v.id(),
            Related::Task(v) => v.id(),
            Related::TimeEntry(v) => v.id(),
            Related::User(v) => v.id(),
            Related::Comment(v) => v.id(),
        }
    }

    /// Human readable label used by listings and exports.
    pub fn label(&self) -> &str {
        match self {
            Related::Organization(v) => &v.name,
            Related::Project(v) => &v.name,
            Related::Task(v) => &v.name,
            Related::TimeEntry(v) => &v.summary,
            Related::User(v) => &v.name,
            Related::Comment(v) => &v.body,
        }
    }
}

impl Serialize for Related {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Related::Organization(v) => v.serialize(serializer),
            Related::Project(v) => v.serialize(serializer),
            Related::Task(v) => v.serialize(serializer),
            Related::TimeEntry(v) => v.serialize(serializer),
            Related::User(v) => v.serialize(serializer),
            Related::Comment(v) => v.serialize(serializer),
        }
    }
}

/// Wires an entity struct into the relational machinery: collection,
/// foreign-key accessors (all `Option<String>` fields) and the `Related`
/// variant carrying it.
macro_rules! entity {
    ($ty:ident, $variant:ident, [$($fk:ident),*]) => {
        impl $crate::models::Relational for $ty {
            const COLLECTION: $crate::schema::Collection = $crate::schema::Collection::$variant;

            fn foreign_key(&self, field: &str) -> Option<&str> {
                match field {
                    $(stringify!($fk) => self.$fk.as_deref(),)*
                    _ => None,
                }
            }
        }

        impl $crate::models::Entity for $ty {
            fn id(&self) -> &str {
                &self.id
            }

            fn into_related(self) -> $crate::models::Related {
                $crate::models::Related::$variant(self)
            }

            fn from_related(related: &$crate::models::Related) -> Option<&Self> {
                match related {
                    $crate::models::Related::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

pub(crate) use entity;
