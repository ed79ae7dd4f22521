//! Relational annotation: decorate a batch of base records with the
//! records their foreign keys point to, one lookup query per relation per
//! batch.

use crate::client::{Aggregate, Condition, Endpoint, EntityClient, GroupRow, Query, Record};
use crate::errors::{AppError, AppResult};
use crate::models::{Entity, Related, Relational};
use crate::schema::{self, Collection, Relation};
use futures::future::try_join_all;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::marker::PhantomData;
use std::ops::Deref;

/// Related records resolved for one item, keyed by relation name. A
/// relation whose key was absent or dangling has no entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Annotations(BTreeMap<&'static str, Related>);

impl Annotations {
    pub fn get(&self, relation: &str) -> Option<&Related> {
        self.0.get(relation)
    }

    /// Typed access: `None` when absent or of another collection.
    pub fn get_as<R: Entity>(&self, relation: &str) -> Option<&R> {
        self.get(relation).and_then(R::from_related)
    }

    pub fn label(&self, relation: &str) -> Option<&str> {
        self.get(relation).map(Related::label)
    }

    pub fn contains(&self, relation: &str) -> bool {
        self.0.contains_key(relation)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A base item plus its resolved relations. Serializes as the item's own
/// fields and an `annotations` object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotated<E> {
    #[serde(flatten)]
    pub item: E,
    pub annotations: Annotations,
}

impl<E> Deref for Annotated<E> {
    type Target = E;

    fn deref(&self) -> &E {
        &self.item
    }
}

/// Fetch the records of `target` whose id is in `ids`, keyed by id.
pub async fn lookup<C: EntityClient>(
    client: &C,
    target: Collection,
    ids: &[String],
) -> AppResult<HashMap<String, Related>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let query = Query::new(Condition::inside("id", ids.iter().cloned()));
    client
        .query(target, &query)
        .await?
        .into_iter()
        .map(|record| -> AppResult<(String, Related)> {
            let related = Related::from_record(target, record)?;
            Ok((related.id().to_string(), related))
        })
        .collect()
}

async fn resolve_relation<C: EntityClient>(
    client: &C,
    relation: &'static Relation,
    ids: &[String],
) -> AppResult<(&'static Relation, HashMap<String, Related>)> {
    match lookup(client, relation.target, ids).await {
        Ok(found) => Ok((relation, found)),
        Err(e) => Err(AppError::RelationQuery {
            relation: relation.field.to_string(),
            source: Box::new(e),
        }),
    }
}

/// The batch algorithm, usable on any batch of base items, whether it came
/// from the entity client or from local state.
#[derive(Debug, Clone)]
pub struct Annotator<E> {
    relations: Vec<&'static Relation>,
    _base: PhantomData<fn() -> E>,
}

impl<E: Relational> Annotator<E> {
    /// Fails with `UnknownRelation` if a name is not declared for the base
    /// collection.
    pub fn new(relation_names: &[&str]) -> AppResult<Self> {
        Ok(Self {
            relations: schema::resolve(E::COLLECTION, relation_names)?,
            _base: PhantomData,
        })
    }

    pub async fn annotate<C: EntityClient>(
        &self,
        client: &C,
        items: Vec<E>,
    ) -> AppResult<Vec<Annotated<E>>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        // Distinct non-absent keys per relation; relations nobody points
        // through are not queried at all.
        let lookups: Vec<(&'static Relation, Vec<String>)> = self
            .relations
            .iter()
            .map(|rel| {
                let ids: BTreeSet<&str> = items
                    .iter()
                    .filter_map(|item| item.foreign_key(rel.field))
                    .collect();
                (*rel, ids.into_iter().map(str::to_string).collect::<Vec<_>>())
            })
            .filter(|(_, ids)| !ids.is_empty())
            .collect();

        log::debug!(
            "annotating {} {} item(s) through {} relation query(ies)",
            items.len(),
            E::COLLECTION,
            lookups.len()
        );

        let resolved = try_join_all(
            lookups
                .iter()
                .map(|(rel, ids)| resolve_relation(client, *rel, ids)),
        )
        .await?;

        Ok(items
            .into_iter()
            .map(|item| {
                let mut annotations = BTreeMap::new();
                for (rel, found) in &resolved {
                    if let Some(related) = item
                        .foreign_key(rel.field)
                        .and_then(|key| found.get(key))
                    {
                        annotations.insert(rel.field, related.clone());
                    }
                }
                Annotated {
                    item,
                    annotations: Annotations(annotations),
                }
            })
            .collect())
    }
}

/// An endpoint whose reads come back annotated and whose writes pass
/// through untouched.
pub struct AnnotatedEndpoint<'c, C, E> {
    endpoint: Endpoint<'c, C, E>,
    annotator: Annotator<E>,
}

pub fn create_annotated_endpoint<'c, C: EntityClient, E: Entity>(
    client: &'c C,
    relation_names: &[&str],
) -> AppResult<AnnotatedEndpoint<'c, C, E>> {
    AnnotatedEndpoint::new(client, relation_names)
}

impl<'c, C: EntityClient, E: Entity> AnnotatedEndpoint<'c, C, E> {
    pub fn new(client: &'c C, relation_names: &[&str]) -> AppResult<Self> {
        Ok(Self {
            endpoint: Endpoint::new(client),
            annotator: Annotator::new(relation_names)?,
        })
    }

    /// The plain endpoint underneath.
    pub fn endpoint(&self) -> &Endpoint<'c, C, E> {
        &self.endpoint
    }

    pub async fn query(&self, query: &Query) -> AppResult<Vec<Annotated<E>>> {
        let items = self.endpoint.query(query).await?;
        self.annotator.annotate(self.endpoint.client(), items).await
    }

    pub async fn detail(&self, id: &str) -> AppResult<Annotated<E>> {
        let item = self.endpoint.detail(id).await?;
        self.annotator
            .annotate(self.endpoint.client(), vec![item])
            .await?
            .pop()
            .ok_or_else(|| AppError::Other(format!("annotation lost {} '{id}'", E::COLLECTION)))
    }

    pub async fn detail_many(&self, ids: &[&str]) -> AppResult<Vec<Annotated<E>>> {
        let items = self.endpoint.detail_many(ids).await?;
        self.annotator.annotate(self.endpoint.client(), items).await
    }

    pub async fn insert(&self, item: &E) -> AppResult<E> {
        self.endpoint.insert(item).await
    }

    pub async fn modify(&self, id: &str, changes: Record) -> AppResult<E> {
        self.endpoint.modify(id, changes).await
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.endpoint.delete(id).await
    }

    pub async fn aggregate(&self, aggregate: &Aggregate, condition: &Condition) -> AppResult<f64> {
        self.endpoint.aggregate(aggregate, condition).await
    }

    pub async fn group_aggregate(
        &self,
        group_by: &str,
        aggregate: &Aggregate,
        condition: &Condition,
    ) -> AppResult<Vec<GroupRow>> {
        self.endpoint
            .group_aggregate(group_by, aggregate, condition)
            .await
    }
}
