//! Entity client: the request/response surface every collection exposes,
//! plus a typed facade and the SQLite-backed implementation.

pub mod condition;
pub mod endpoint;
pub mod sqlite;

pub use condition::{Aggregate, AggregateOp, Condition, GroupRow, Order, Query};
pub use endpoint::Endpoint;
pub use sqlite::SqliteClient;

use crate::errors::AppResult;
use crate::schema::Collection;

/// A raw record as it travels through the client: a JSON object.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Per-collection operations of the entity API. Every call is an
/// asynchronous boundary; no retries happen at this level.
#[allow(async_fn_in_trait)]
pub trait EntityClient {
    async fn query(&self, collection: Collection, query: &Query) -> AppResult<Vec<Record>>;

    async fn detail(&self, collection: Collection, id: &str) -> AppResult<Record>;

    async fn insert(&self, collection: Collection, record: Record) -> AppResult<Record>;

    async fn modify(&self, collection: Collection, id: &str, changes: Record)
    -> AppResult<Record>;

    async fn delete(&self, collection: Collection, id: &str) -> AppResult<()>;

    async fn aggregate(
        &self,
        collection: Collection,
        aggregate: &Aggregate,
        condition: &Condition,
    ) -> AppResult<f64>;

    async fn group_aggregate(
        &self,
        collection: Collection,
        group_by: &str,
        aggregate: &Aggregate,
        condition: &Condition,
    ) -> AppResult<Vec<GroupRow>>;
}
