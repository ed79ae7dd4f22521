use super::Collection;
use crate::errors::{AppError, AppResult};
use std::collections::HashSet;

/// A foreign-key field on `base` referencing the `id` of `target`.
/// The relation name is the field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    pub base: Collection,
    pub field: &'static str,
    pub target: Collection,
}

const fn rel(base: Collection, field: &'static str, target: Collection) -> Relation {
    Relation {
        base,
        field,
        target,
    }
}

pub static RELATIONS: &[Relation] = &[
    rel(Collection::Project, "organization", Collection::Organization),
    rel(Collection::Task, "project", Collection::Project),
    rel(Collection::Task, "user", Collection::User),
    rel(Collection::TimeEntry, "task", Collection::Task),
    rel(Collection::TimeEntry, "project", Collection::Project),
    rel(Collection::TimeEntry, "user", Collection::User),
    rel(Collection::Comment, "task", Collection::Task),
    rel(Collection::Comment, "user", Collection::User),
    rel(Collection::Timer, "task", Collection::Task),
    rel(Collection::Timer, "project", Collection::Project),
];

pub fn relation(base: Collection, name: &str) -> Option<&'static Relation> {
    RELATIONS
        .iter()
        .find(|r| r.base == base && r.field == name)
}

pub fn relations_of(base: Collection) -> impl Iterator<Item = &'static Relation> {
    RELATIONS.iter().filter(move |r| r.base == base)
}

/// Resolve every name against the schema of `base`, failing on the first
/// one that is not declared.
pub fn resolve(base: Collection, names: &[&str]) -> AppResult<Vec<&'static Relation>> {
    names
        .iter()
        .map(|name| {
            relation(base, name).ok_or_else(|| AppError::UnknownRelation {
                collection: base,
                relation: name.to_string(),
            })
        })
        .collect()
}

/// Checked once at startup: no duplicated `(base, field)` entry and every
/// target reachable through the entity client.
pub fn validate() -> AppResult<()> {
    let mut seen = HashSet::new();
    for r in RELATIONS {
        if !seen.insert((r.base, r.field)) {
            return Err(AppError::Schema(format!(
                "relation {}.{} declared twice",
                r.base, r.field
            )));
        }
        if !r.target.is_remote() {
            return Err(AppError::Schema(format!(
                "relation {}.{} targets local collection {}",
                r.base, r.field, r.target
            )));
        }
    }
    Ok(())
}
