//! Entity client backed by the local SQLite database.

use super::{Aggregate, Condition, EntityClient, GroupRow, Query, Record};
use crate::db::pool::DbPool;
use crate::db::queries;
use crate::errors::{AppError, AppResult};
use crate::schema::Collection;
use rusqlite::Connection;
use serde_json::Value;

pub struct SqliteClient {
    pool: DbPool,
}

fn table(collection: Collection) -> AppResult<&'static str> {
    collection
        .table_name()
        .ok_or(AppError::LocalCollection(collection))
}

impl SqliteClient {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn open(path: &str) -> AppResult<Self> {
        Ok(Self::new(DbPool::new(path)?))
    }

    pub fn in_memory() -> AppResult<Self> {
        Ok(Self::new(DbPool::in_memory()?))
    }

    /// Underlying connection, used by the audit log.
    pub fn conn(&self) -> &Connection {
        &self.pool.conn
    }
}

impl EntityClient for SqliteClient {
    async fn query(&self, collection: Collection, query: &Query) -> AppResult<Vec<Record>> {
        queries::select_records(self.conn(), table(collection)?, query)
    }

    async fn detail(&self, collection: Collection, id: &str) -> AppResult<Record> {
        queries::load_record(self.conn(), table(collection)?, id)?.ok_or_else(|| {
            AppError::EntityNotFound {
                collection,
                id: id.to_string(),
            }
        })
    }

    async fn insert(&self, collection: Collection, mut record: Record) -> AppResult<Record> {
        let table = table(collection)?;
        let id = match record.get("id") {
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            Some(Value::String(_)) | Some(Value::Null) | None => {
                uuid::Uuid::new_v4().to_string()
            }
            Some(other) => {
                return Err(AppError::InvalidRecord {
                    collection,
                    message: format!("id must be a string, got {other}"),
                });
            }
        };
        record.insert("id".to_string(), Value::String(id.clone()));

        queries::insert_record(self.conn(), table, &id, &record)?;
        log::debug!("inserted {collection} '{id}'");
        Ok(record)
    }

    async fn modify(
        &self,
        collection: Collection,
        id: &str,
        changes: Record,
    ) -> AppResult<Record> {
        let table = table(collection)?;
        let mut record = queries::load_record(self.conn(), table, id)?.ok_or_else(|| {
            AppError::EntityNotFound {
                collection,
                id: id.to_string(),
            }
        })?;

        for (key, value) in changes {
            if key != "id" {
                record.insert(key, value);
            }
        }

        queries::update_record(self.conn(), table, id, &record)?;
        Ok(record)
    }

    async fn delete(&self, collection: Collection, id: &str) -> AppResult<()> {
        match queries::delete_record(self.conn(), table(collection)?, id)? {
            0 => Err(AppError::EntityNotFound {
                collection,
                id: id.to_string(),
            }),
            _ => Ok(()),
        }
    }

    async fn aggregate(
        &self,
        collection: Collection,
        aggregate: &Aggregate,
        condition: &Condition,
    ) -> AppResult<f64> {
        queries::aggregate(self.conn(), table(collection)?, aggregate, condition)
    }

    async fn group_aggregate(
        &self,
        collection: Collection,
        group_by: &str,
        aggregate: &Aggregate,
        condition: &Condition,
    ) -> AppResult<Vec<GroupRow>> {
        queries::group_aggregate(
            self.conn(),
            table(collection)?,
            group_by,
            aggregate,
            condition,
        )
    }
}
