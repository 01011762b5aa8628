//! [`SeedCollection`] backed by the MongoDB driver.

use std::collections::HashMap;

use async_trait::async_trait;
use bson::{doc, Bson, Document};
use mongodb::error::ErrorKind;
use mongodb::{Collection, Database};
use tracing::debug;

use seeder_core::{SeedCollection, SeedError};

/// Collection handle over a `mongodb::Collection<Document>`.
///
/// Thin pass-through: inserts report the identifiers the server
/// acknowledged, deletes go through a single `$in` filter on `_id`, and
/// driver errors surface as [`SeedError::Store`]. Cloning is cheap and
/// shares the driver's connection pool.
#[derive(Clone)]
pub struct MongoCollection {
    collection: Collection<Document>,
}

impl MongoCollection {
    /// Wrap an existing driver collection handle.
    pub fn new(collection: Collection<Document>) -> Self {
        Self { collection }
    }

    /// Open the collection `name` within `database`.
    pub fn from_database(database: &Database, name: &str) -> Self {
        Self::new(database.collection(name))
    }

    /// The underlying driver collection.
    pub fn inner(&self) -> &Collection<Document> {
        &self.collection
    }
}

#[async_trait]
impl SeedCollection for MongoCollection {
    fn name(&self) -> &str {
        self.collection.name()
    }

    async fn insert_one(&self, doc: Document) -> Result<Bson, SeedError> {
        let result = self
            .collection
            .insert_one(doc)
            .await
            .map_err(SeedError::store)?;
        Ok(result.inserted_id)
    }

    async fn insert_many(&self, docs: Vec<Document>) -> Result<Vec<Bson>, SeedError> {
        let expected = docs.len();
        // Ids are assigned before insertion, so the batch's id set is known
        // up front even when the driver call fails mid-batch. A document
        // without a pre-assigned `_id` yields `None` and disables the
        // short-set path below.
        let batch_ids: Option<Vec<Bson>> =
            docs.iter().map(|doc| doc.get("_id").cloned()).collect();

        match self.collection.insert_many(docs).await {
            Ok(result) => Ok(ordered_ids(result.inserted_ids, expected)),
            Err(e) => {
                // An ordered bulk insert stops at the first failing
                // document, leaving everything below that index in the
                // store. Report those ids as the short set; the seeding
                // pipeline turns it into an insertion failure and rolls the
                // acknowledged subset back. Errors without per-document
                // failures (write concern) carry no stop index and
                // propagate unchanged.
                if let ErrorKind::InsertMany(ref failure) = *e.kind {
                    let stop = failure
                        .write_errors
                        .as_ref()
                        .and_then(|errors| errors.iter().map(|error| error.index).min());
                    if let Some(acknowledged) = acknowledged_prefix(batch_ids.as_deref(), stop) {
                        debug!(
                            "Insert into collection '{}' stopped after {} of {} documents: {}",
                            self.collection.name(),
                            acknowledged.len(),
                            expected,
                            e
                        );
                        return Ok(acknowledged);
                    }
                }
                Err(SeedError::store(e))
            }
        }
    }

    async fn delete_by_ids(&self, ids: &[Bson]) -> Result<u64, SeedError> {
        let result = self
            .collection
            .delete_many(doc! { "_id": { "$in": ids.to_vec() } })
            .await
            .map_err(SeedError::store)?;
        Ok(result.deleted_count)
    }

    async fn find_by_id(&self, id: &Bson) -> Result<Option<Document>, SeedError> {
        self.collection
            .find_one(doc! { "_id": id.clone() })
            .await
            .map_err(SeedError::store)
    }

    async fn count(&self) -> Result<u64, SeedError> {
        self.collection
            .count_documents(doc! {})
            .await
            .map_err(SeedError::store)
    }
}

/// Reorder the driver's index-keyed id map into batch input order.
///
/// Indexes the server never acknowledged are absent from the map and are
/// skipped, so the returned length is the acknowledged insert count.
fn ordered_ids(mut ids: HashMap<usize, Bson>, expected: usize) -> Vec<Bson> {
    (0..expected).filter_map(|index| ids.remove(&index)).collect()
}

/// Prefix of a batch's pre-assigned ids below the first failed index of an
/// ordered insert.
///
/// Returns `None` when the error carries no per-document failure index,
/// when that index falls outside the batch, or when `ids` is absent because
/// not every document carried an `_id` before the call.
fn acknowledged_prefix(ids: Option<&[Bson]>, first_failure: Option<usize>) -> Option<Vec<Bson>> {
    let ids = ids?;
    let stop = first_failure?;
    if stop >= ids.len() {
        return None;
    }
    Some(ids[..stop].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordered_ids_sorts_by_batch_index() {
        let mut ids = HashMap::new();
        ids.insert(2, Bson::Int32(2));
        ids.insert(0, Bson::Int32(0));
        ids.insert(1, Bson::Int32(1));

        assert_eq!(
            ordered_ids(ids, 3),
            vec![Bson::Int32(0), Bson::Int32(1), Bson::Int32(2)]
        );
    }

    #[test]
    fn test_ordered_ids_skips_unacknowledged_indexes() {
        let mut ids = HashMap::new();
        ids.insert(0, Bson::Int32(0));
        ids.insert(2, Bson::Int32(2));

        assert_eq!(ordered_ids(ids, 3), vec![Bson::Int32(0), Bson::Int32(2)]);
    }

    #[test]
    fn test_ordered_ids_empty_map() {
        assert!(ordered_ids(HashMap::new(), 4).is_empty());
    }

    #[test]
    fn test_acknowledged_prefix_takes_ids_below_first_failure() {
        let ids = vec![Bson::Int32(0), Bson::Int32(1), Bson::Int32(2)];

        assert_eq!(
            acknowledged_prefix(Some(&ids), Some(2)),
            Some(vec![Bson::Int32(0), Bson::Int32(1)])
        );
    }

    #[test]
    fn test_acknowledged_prefix_is_empty_when_first_document_fails() {
        let ids = vec![Bson::Int32(0), Bson::Int32(1)];

        assert_eq!(acknowledged_prefix(Some(&ids), Some(0)), Some(Vec::new()));
    }

    #[test]
    fn test_acknowledged_prefix_requires_a_failure_index() {
        let ids = vec![Bson::Int32(0)];

        assert_eq!(acknowledged_prefix(Some(&ids), None), None);
    }

    #[test]
    fn test_acknowledged_prefix_rejects_unknown_ids_and_out_of_range_index() {
        assert_eq!(acknowledged_prefix(None, Some(1)), None);

        let ids = vec![Bson::Int32(0), Bson::Int32(1)];
        assert_eq!(acknowledged_prefix(Some(&ids), Some(2)), None);
    }
}
