//! In-memory implementation of [`SeedCollection`].
//!
//! Backs the crate's own tests and lets applications exercise seeding
//! pipelines without a running database. Clones share one underlying store,
//! so a test can keep a handle for assertions after moving a clone into a
//! [`Seeder`](crate::Seeder).

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use bson::{Bson, Document};

use crate::collection::SeedCollection;
use crate::error::SeedError;
use crate::id::ensure_id;

struct Inner {
    name: String,
    docs: Mutex<Vec<Document>>,
}

/// In-memory document collection.
///
/// Mimics the driver-facing behavior the seeding pipeline relies on:
/// documents without an `_id` get a generated `ObjectId`, and inserting a
/// duplicate `_id` fails. Inserts before a mid-batch duplicate stay in the
/// store, matching an ordered bulk insert.
#[derive(Clone)]
pub struct MemoryCollection {
    inner: Arc<Inner>,
}

impl MemoryCollection {
    /// Create an empty collection with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        MemoryCollection {
            inner: Arc::new(Inner {
                name: name.into(),
                docs: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Snapshot of every stored document, in insertion order.
    pub fn documents(&self) -> Vec<Document> {
        self.lock().clone()
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the collection holds no documents.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Document>> {
        self.inner.docs.lock().expect("memory collection mutex poisoned")
    }

    fn store_doc(
        docs: &mut Vec<Document>,
        mut doc: Document,
        name: &str,
    ) -> Result<Bson, SeedError> {
        let id = ensure_id(&mut doc);
        if docs.iter().any(|existing| existing.get("_id") == Some(&id)) {
            return Err(SeedError::store(format!(
                "duplicate _id {id} in collection '{name}'"
            )));
        }
        docs.push(doc);
        Ok(id)
    }
}

#[async_trait]
impl SeedCollection for MemoryCollection {
    fn name(&self) -> &str {
        &self.inner.name
    }

    async fn insert_one(&self, doc: Document) -> Result<Bson, SeedError> {
        let mut docs = self.lock();
        Self::store_doc(&mut docs, doc, &self.inner.name)
    }

    async fn insert_many(&self, batch: Vec<Document>) -> Result<Vec<Bson>, SeedError> {
        let mut docs = self.lock();
        let mut ids = Vec::with_capacity(batch.len());
        for doc in batch {
            ids.push(Self::store_doc(&mut docs, doc, &self.inner.name)?);
        }
        Ok(ids)
    }

    async fn delete_by_ids(&self, ids: &[Bson]) -> Result<u64, SeedError> {
        let mut docs = self.lock();
        let before = docs.len();
        docs.retain(|doc| match doc.get("_id") {
            Some(id) => !ids.contains(id),
            None => true,
        });
        Ok((before - docs.len()) as u64)
    }

    async fn find_by_id(&self, id: &Bson) -> Result<Option<Document>, SeedError> {
        let docs = self.lock();
        Ok(docs.iter().find(|doc| doc.get("_id") == Some(id)).cloned())
    }

    async fn count(&self) -> Result<u64, SeedError> {
        Ok(self.lock().len() as u64)
    }
}
