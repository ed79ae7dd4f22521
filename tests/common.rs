#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use rworklog::client::{Aggregate, Condition, EntityClient, GroupRow, Query, Record};
use rworklog::errors::{AppError, AppResult};
use rworklog::schema::Collection;
use serde_json::{Value, json};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::env;
use std::fs;
use std::path::PathBuf;

pub fn rwl() -> Command {
    cargo_bin_cmd!("rworklog")
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_rworklog.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// Timer registry path for a test, removed beforehand
pub fn setup_timers(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_timers.json", name));
    let p = path.to_string_lossy().to_string();
    fs::remove_file(&p).ok();
    p
}

/// Create a temporary output file path inside tempdir and ensure it's removed
pub fn temp_out(name: &str, ext: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_out.{}", name, ext));
    let p = path.to_string_lossy().to_string();
    fs::remove_file(&p).ok();
    p
}

/// `rworklog --db DB --timers TIMERS --user alice <args>`
pub fn run_ok(db: &str, timers: &str, args: &[&str]) -> String {
    let out = rwl()
        .args(["--db", db, "--timers", timers, "--user", "u-alice"])
        .args(args)
        .assert()
        .success();
    String::from_utf8_lossy(&out.get_output().stdout).to_string()
}

/// Initialize DB and add a small dataset useful for many tests:
/// one organization, one user, two projects, two tasks.
pub fn init_db_with_data(db: &str, timers: &str) {
    rwl()
        .args(["--db", db, "--timers", timers, "--test", "init"])
        .assert()
        .success();

    run_ok(db, timers, &["org", "add", "Acme", "--id", "o-acme"]);
    run_ok(db, timers, &["user", "add", "Alice", "--id", "u-alice"]);
    run_ok(db, timers, &["project", "add", "Website", "--org", "o-acme", "--id", "p-web"]);
    run_ok(db, timers, &["project", "add", "Backend", "--id", "p-api"]);
    run_ok(
        db,
        timers,
        &["task", "add", "Landing page", "--project", "p-web", "--assignee", "u-alice", "--id", "t-landing"],
    );
    run_ok(db, timers, &["task", "add", "Auth", "--project", "p-api", "--id", "t-auth"]);
}

// ---------------------------------------------------------------------
// Recording in-memory client
// ---------------------------------------------------------------------

/// One call made against the mock client.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Query(Collection, Query),
    Detail(Collection, String),
    Insert(Collection),
    Modify(Collection, String),
    Delete(Collection, String),
    Aggregate(Collection),
    GroupAggregate(Collection, String),
}

/// In-memory entity client that records every call and can be told to
/// fail on chosen collections.
#[derive(Default)]
pub struct MockClient {
    data: RefCell<HashMap<Collection, Vec<Record>>>,
    calls: RefCell<Vec<Call>>,
    failing: RefCell<HashSet<Collection>>,
    next_id: RefCell<u32>,
}

fn matches(record: &Record, condition: &Condition) -> bool {
    let field = |name: &str| record.get(name).cloned().unwrap_or(Value::Null);
    match condition {
        Condition::All => true,
        Condition::Eq(f, v) => field(f) == *v,
        Condition::In(f, values) => values.contains(&field(f)),
        Condition::IsNull(f) => field(f).is_null(),
        Condition::And(parts) => parts.iter().all(|c| matches(record, c)),
        Condition::Gt(f, v) => cmp_str(&field(f), v).is_some_and(|o| o.is_gt()),
        Condition::Gte(f, v) => cmp_str(&field(f), v).is_some_and(|o| o.is_ge()),
        Condition::Lt(f, v) => cmp_str(&field(f), v).is_some_and(|o| o.is_lt()),
        Condition::Lte(f, v) => cmp_str(&field(f), v).is_some_and(|o| o.is_le()),
    }
}

fn cmp_str(a: &Value, b: &Value) -> Option<std::cmp::Ordering> {
    match (a, b) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        _ => None,
    }
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record; it must carry an `id`.
    pub fn seed(&self, collection: Collection, record: Value) {
        if let Value::Object(map) = record {
            self.data.borrow_mut().entry(collection).or_default().push(map);
        }
    }

    pub fn fail_on(&self, collection: Collection) {
        self.failing.borrow_mut().insert(collection);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    /// Queries issued against `collection`, in order.
    pub fn queries_on(&self, collection: Collection) -> Vec<Query> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::Query(col, q) if *col == collection => Some(q.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn records(&self, collection: Collection) -> Vec<Record> {
        self.data.borrow().get(&collection).cloned().unwrap_or_default()
    }

    fn check(&self, collection: Collection) -> AppResult<()> {
        if self.failing.borrow().contains(&collection) {
            return Err(AppError::Other(format!("{collection} service unavailable")));
        }
        if !collection.is_remote() {
            return Err(AppError::LocalCollection(collection));
        }
        Ok(())
    }

    fn not_found(collection: Collection, id: &str) -> AppError {
        AppError::EntityNotFound {
            collection,
            id: id.to_string(),
        }
    }
}

impl EntityClient for MockClient {
    async fn query(&self, collection: Collection, query: &Query) -> AppResult<Vec<Record>> {
        self.calls
            .borrow_mut()
            .push(Call::Query(collection, query.clone()));
        self.check(collection)?;
        Ok(self
            .records(collection)
            .into_iter()
            .filter(|r| matches(r, &query.condition))
            .collect())
    }

    async fn detail(&self, collection: Collection, id: &str) -> AppResult<Record> {
        self.calls
            .borrow_mut()
            .push(Call::Detail(collection, id.to_string()));
        self.check(collection)?;
        self.records(collection)
            .into_iter()
            .find(|r| r.get("id") == Some(&json!(id)))
            .ok_or_else(|| Self::not_found(collection, id))
    }

    async fn insert(&self, collection: Collection, mut record: Record) -> AppResult<Record> {
        self.calls.borrow_mut().push(Call::Insert(collection));
        self.check(collection)?;
        if record.get("id").and_then(Value::as_str).unwrap_or("").is_empty() {
            let mut next = self.next_id.borrow_mut();
            *next += 1;
            record.insert("id".into(), json!(format!("gen-{}", *next)));
        }
        self.data
            .borrow_mut()
            .entry(collection)
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    async fn modify(
        &self,
        collection: Collection,
        id: &str,
        changes: Record,
    ) -> AppResult<Record> {
        self.calls
            .borrow_mut()
            .push(Call::Modify(collection, id.to_string()));
        self.check(collection)?;
        let mut data = self.data.borrow_mut();
        let record = data
            .get_mut(&collection)
            .and_then(|rows| rows.iter_mut().find(|r| r.get("id") == Some(&json!(id))))
            .ok_or_else(|| Self::not_found(collection, id))?;
        for (k, v) in changes {
            if k != "id" {
                record.insert(k, v);
            }
        }
        Ok(record.clone())
    }

    async fn delete(&self, collection: Collection, id: &str) -> AppResult<()> {
        self.calls
            .borrow_mut()
            .push(Call::Delete(collection, id.to_string()));
        self.check(collection)?;
        let mut data = self.data.borrow_mut();
        let rows = data.entry(collection).or_default();
        let before = rows.len();
        rows.retain(|r| r.get("id") != Some(&json!(id)));
        if rows.len() == before {
            return Err(Self::not_found(collection, id));
        }
        Ok(())
    }

    async fn aggregate(
        &self,
        collection: Collection,
        aggregate: &Aggregate,
        condition: &Condition,
    ) -> AppResult<f64> {
        self.calls.borrow_mut().push(Call::Aggregate(collection));
        self.check(collection)?;
        Ok(self
            .records(collection)
            .iter()
            .filter(|r| matches(r, condition))
            .filter_map(|r| r.get(&aggregate.field).and_then(Value::as_f64))
            .sum())
    }

    async fn group_aggregate(
        &self,
        collection: Collection,
        group_by: &str,
        aggregate: &Aggregate,
        condition: &Condition,
    ) -> AppResult<Vec<GroupRow>> {
        self.calls
            .borrow_mut()
            .push(Call::GroupAggregate(collection, group_by.to_string()));
        self.check(collection)?;
        let mut groups: Vec<GroupRow> = Vec::new();
        for r in self.records(collection).iter().filter(|r| matches(r, condition)) {
            let key = r.get(group_by).and_then(Value::as_str).map(str::to_string);
            let value = r.get(&aggregate.field).and_then(Value::as_f64).unwrap_or(0.0);
            match groups.iter_mut().find(|g| g.key == key) {
                Some(g) => g.value += value,
                None => groups.push(GroupRow { key, value }),
            }
        }
        Ok(groups)
    }
}
