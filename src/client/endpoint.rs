use super::{Aggregate, Condition, EntityClient, GroupRow, Query, Record};
use crate::errors::AppResult;
use crate::models::Entity;
use std::marker::PhantomData;

/// Typed view of one collection of an entity client.
pub struct Endpoint<'c, C, E> {
    client: &'c C,
    _entity: PhantomData<E>,
}

impl<'c, C, E> Clone for Endpoint<'c, C, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'c, C, E> Copy for Endpoint<'c, C, E> {}

impl<'c, C: EntityClient, E: Entity> Endpoint<'c, C, E> {
    pub fn new(client: &'c C) -> Self {
        Self {
            client,
            _entity: PhantomData,
        }
    }

    pub fn client(&self) -> &'c C {
        self.client
    }

    pub async fn query(&self, query: &Query) -> AppResult<Vec<E>> {
        self.client
            .query(E::COLLECTION, query)
            .await?
            .into_iter()
            .map(E::from_record)
            .collect()
    }

    pub async fn detail(&self, id: &str) -> AppResult<E> {
        E::from_record(self.client.detail(E::COLLECTION, id).await?)
    }

    /// Fetch several ids with a single `IN` query. Order follows `ids`;
    /// unknown ids are skipped.
    pub async fn detail_many(&self, ids: &[&str]) -> AppResult<Vec<E>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let found = self
            .query(&Query::new(Condition::inside("id", ids.iter().copied())))
            .await?;
        Ok(ids
            .iter()
            .filter_map(|id| found.iter().find(|e| e.id() == *id).cloned())
            .collect())
    }

    pub async fn insert(&self, item: &E) -> AppResult<E> {
        E::from_record(self.client.insert(E::COLLECTION, item.to_record()?).await?)
    }

    pub async fn modify(&self, id: &str, changes: Record) -> AppResult<E> {
        E::from_record(self.client.modify(E::COLLECTION, id, changes).await?)
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.client.delete(E::COLLECTION, id).await
    }

    pub async fn aggregate(&self, aggregate: &Aggregate, condition: &Condition) -> AppResult<f64> {
        self.client
            .aggregate(E::COLLECTION, aggregate, condition)
            .await
    }

    pub async fn group_aggregate(
        &self,
        group_by: &str,
        aggregate: &Aggregate,
        condition: &Condition,
    ) -> AppResult<Vec<GroupRow>> {
        self.client
            .group_aggregate(E::COLLECTION, group_by, aggregate, condition)
            .await
    }
}
