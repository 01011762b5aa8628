//! Collection handle trait: the storage capability a [`Seeder`] seeds into.
//!
//! The seeding pipeline only needs a handful of operations against a named
//! collection: insert one, insert a batch, delete an identifier set, and a
//! couple of read calls for verification. Backends implement
//! [`SeedCollection`] to plug into the pipeline:
//!
//! - `MemoryCollection` (this crate): in-memory store for tests and
//!   database-free runs
//! - `MongoCollection` (`seeder-mongodb` crate): the MongoDB driver
//!
//! [`Seeder`]: crate::Seeder

use async_trait::async_trait;
use bson::{Bson, Document};

use crate::error::SeedError;

/// Storage capability for one named collection of BSON documents.
///
/// Implementations report what the store acknowledged and propagate backend
/// failures via [`SeedError::Store`]; the count checks that turn a short
/// acknowledgment into [`SeedError::Insertion`] live in the seeding pipeline,
/// not in the backend.
#[async_trait]
pub trait SeedCollection: Send + Sync {
    /// Name of the underlying collection.
    fn name(&self) -> &str;

    /// Insert a single document and return its identifier.
    async fn insert_one(&self, doc: Document) -> Result<Bson, SeedError>;

    /// Insert a batch of documents.
    ///
    /// Returns the acknowledged identifiers in input order. The length of
    /// the returned vector is the store's acknowledged insert count and may
    /// be shorter than the batch on partial failure.
    async fn insert_many(&self, docs: Vec<Document>) -> Result<Vec<Bson>, SeedError>;

    /// Delete every document whose `_id` is in `ids` and return the count
    /// of documents actually removed.
    async fn delete_by_ids(&self, ids: &[Bson]) -> Result<u64, SeedError>;

    /// Look up a single document by its `_id`.
    ///
    /// Verification helper for callers and tests; the creation pipeline
    /// never reads.
    async fn find_by_id(&self, id: &Bson) -> Result<Option<Document>, SeedError>;

    /// Total number of documents in the collection.
    async fn count(&self) -> Result<u64, SeedError>;
}
