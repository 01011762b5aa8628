//! The seeding pipeline: generate, patch, insert, and later clean records.

use bson::{Bson, Document};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::collection::SeedCollection;
use crate::error::SeedError;
use crate::id::ensure_id;
use crate::patch::{deep_merge, Patch};

/// Creates factory-generated records in one collection and remembers what it
/// inserted, so [`clean`](Seeder::clean) removes exactly those documents and
/// nothing else.
///
/// Every creation call runs the same pipeline: invoke the factory per
/// record, apply the optional [`Patch`], serialize to BSON, assign an `_id`
/// where missing, insert through the collection handle, and append the
/// acknowledged identifiers to the ledger. Record-shape errors (a patch that
/// breaks the record type) abort the call before anything reaches the store.
pub struct Seeder<T> {
    collection: Box<dyn SeedCollection>,
    factory: Box<dyn Fn() -> T + Send + Sync>,
    inserted_ids: Vec<Bson>,
    rng: StdRng,
}

impl<T> Seeder<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Create a seeder over `collection` whose records come from `factory`.
    ///
    /// The factory is invoked once per created record and must not depend on
    /// call order; randomized payloads are the typical use. Use
    /// `Seeder<bson::Document>` when patches introduce fields outside any
    /// static record type.
    ///
    /// # Example
    ///
    /// ```
    /// use seeder_core::{MemoryCollection, Seeder};
    /// use serde::{Deserialize, Serialize};
    ///
    /// #[derive(Serialize, Deserialize)]
    /// struct User {
    ///     name: String,
    /// }
    ///
    /// tokio_test::block_on(async {
    ///     let mut seeder = Seeder::new(MemoryCollection::new("users"), || User {
    ///         name: "generated".to_string(),
    ///     });
    ///
    ///     let user = seeder.one(None).await.unwrap();
    ///     assert_eq!(user.name, "generated");
    ///     assert_eq!(seeder.inserted_ids().len(), 1);
    /// });
    /// ```
    pub fn new<C, F>(collection: C, factory: F) -> Self
    where
        C: SeedCollection + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self {
            collection: Box::new(collection),
            factory: Box::new(factory),
            inserted_ids: Vec::new(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Replace the random source with one seeded from `seed`, making the
    /// counts drawn by [`random`](Seeder::random) and [`pick`](Seeder::pick)
    /// reproducible across runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// The collection handle this seeder inserts into.
    pub fn collection(&self) -> &dyn SeedCollection {
        self.collection.as_ref()
    }

    /// Identifiers of every record this seeder inserted and has not yet
    /// cleaned, in insertion order.
    pub fn inserted_ids(&self) -> &[Bson] {
        &self.inserted_ids
    }

    /// Create and insert a single record.
    ///
    /// Same pipeline as [`many`](Seeder::many) at count 1, but inserts
    /// through the handle's single-document call and returns the record
    /// directly. A [`Patch::Map`] patch sees batch index 0.
    pub async fn one(&mut self, patch: Option<Patch<T>>) -> Result<T, SeedError> {
        let (record, doc) = self.build_record(0, patch.as_ref())?;
        let id = self.collection.insert_one(doc).await?;
        debug!("Seeded 1 document into collection '{}'", self.collection.name());
        self.inserted_ids.push(id);
        Ok(record)
    }

    /// Create and insert `count` records as one batch.
    ///
    /// A count of zero returns an empty vector without invoking the factory
    /// or the store. Otherwise the batch is built in full (any record-shape
    /// error aborts before insertion), inserted via a single
    /// [`insert_many`](SeedCollection::insert_many), and the returned
    /// records carry their assigned identifiers.
    ///
    /// If the store acknowledges fewer inserts than requested, the
    /// acknowledged documents are deleted again (best effort), the ledger is
    /// left untouched, and [`SeedError::Insertion`] is returned.
    pub async fn many(
        &mut self,
        count: usize,
        patch: Option<Patch<T>>,
    ) -> Result<Vec<T>, SeedError> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let mut records = Vec::with_capacity(count);
        let mut docs = Vec::with_capacity(count);
        for index in 0..count {
            let (record, doc) = self.build_record(index, patch.as_ref())?;
            records.push(record);
            docs.push(doc);
        }

        let ids = self.insert_batch(docs).await?;
        self.inserted_ids.extend(ids);
        Ok(records)
    }

    /// Create a uniformly random number of records in `[min, max)`.
    ///
    /// Fails with [`SeedError::InvalidRange`] when `max <= min`, before any
    /// factory or store work. A drawn count of zero behaves like
    /// `many(0, ..)`.
    pub async fn random(
        &mut self,
        min: usize,
        max: usize,
        patch: Option<Patch<T>>,
    ) -> Result<Vec<T>, SeedError> {
        let count = self.random_count(min, max)?;
        self.many(count, patch).await
    }

    /// Create a random number of records in `[min, max)` and single out one
    /// of them.
    ///
    /// The patch is applied to the standout record only; the rest of the
    /// batch is inserted as the factory produced it. All records land in the
    /// store and the ledger.
    ///
    /// # Returns
    ///
    /// `(Some(standout), crowd)` with the crowd in creation order, or
    /// `(None, vec![])` when the drawn count is zero (possible whenever
    /// `min` is 0).
    pub async fn pick(
        &mut self,
        min: usize,
        max: usize,
        patch: Option<Patch<T>>,
    ) -> Result<(Option<T>, Vec<T>), SeedError> {
        let count = self.random_count(min, max)?;
        if count == 0 {
            return Ok((None, Vec::new()));
        }
        let picked = self.random_count(0, count)?;

        let mut records = Vec::with_capacity(count);
        let mut docs = Vec::with_capacity(count);
        for index in 0..count {
            let applied = if index == picked { patch.as_ref() } else { None };
            let (record, doc) = self.build_record(index, applied)?;
            records.push(record);
            docs.push(doc);
        }

        let ids = self.insert_batch(docs).await?;
        self.inserted_ids.extend(ids);

        let standout = records.remove(picked);
        Ok((Some(standout), records))
    }

    /// Delete every record this seeder inserted and clear the ledger.
    ///
    /// Issues one delete for the exact tracked identifiers, never a broader
    /// filter, so documents created outside this seeder survive. Records
    /// already removed externally are skipped without error, which makes a
    /// lower-than-ledger deleted count normal and `clean` idempotent. An
    /// empty ledger short-circuits without a store call.
    ///
    /// Returns the number of documents the store actually deleted.
    pub async fn clean(&mut self) -> Result<u64, SeedError> {
        if self.inserted_ids.is_empty() {
            return Ok(0);
        }

        let deleted = self.collection.delete_by_ids(&self.inserted_ids).await?;
        debug!(
            "Cleaned {} of {} tracked documents from collection '{}'",
            deleted,
            self.inserted_ids.len(),
            self.collection.name()
        );
        self.inserted_ids.clear();
        Ok(deleted)
    }

    /// Build one record: factory, patch, serialize, assign the identifier,
    /// and round-trip back into `T` so the caller gets the record exactly as
    /// stored.
    fn build_record(
        &self,
        index: usize,
        patch: Option<&Patch<T>>,
    ) -> Result<(T, Document), SeedError> {
        let record = (self.factory)();
        let mut doc = match patch {
            Some(Patch::Map(apply)) => bson::to_document(&apply(record, index))?,
            Some(Patch::Merge(fields)) => {
                let mut doc = bson::to_document(&record)?;
                deep_merge(&mut doc, fields);
                doc
            }
            None => bson::to_document(&record)?,
        };
        ensure_id(&mut doc);
        let record = bson::from_document(doc.clone())?;
        Ok((record, doc))
    }

    /// Insert a prepared batch and enforce the acknowledged-count contract.
    async fn insert_batch(&self, docs: Vec<Document>) -> Result<Vec<Bson>, SeedError> {
        let expected = docs.len();
        let ids = self.collection.insert_many(docs).await?;
        if ids.len() != expected {
            warn!(
                "Collection '{}' acknowledged {} of {} inserts, deleting the acknowledged documents",
                self.collection.name(),
                ids.len(),
                expected
            );
            if let Err(e) = self.collection.delete_by_ids(&ids).await {
                warn!(
                    "Rollback delete in collection '{}' failed: {}",
                    self.collection.name(),
                    e
                );
            }
            return Err(SeedError::Insertion {
                expected,
                inserted: ids.len(),
            });
        }

        debug!(
            "Seeded {} documents into collection '{}'",
            expected,
            self.collection.name()
        );
        Ok(ids)
    }

    fn random_count(&mut self, min: usize, max: usize) -> Result<usize, SeedError> {
        if max <= min {
            return Err(SeedError::InvalidRange { min, max });
        }
        Ok(self.rng.gen_range(min..max))
    }
}
