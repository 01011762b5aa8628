//! Error types for seeding operations.

use thiserror::Error;

/// Boxed error type for failures reported by a collection backend.
pub type StoreError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while seeding or cleaning records.
#[derive(Debug, Error)]
pub enum SeedError {
    /// The store acknowledged fewer inserted records than requested.
    ///
    /// The ledger is left untouched for the failing call; identifiers from
    /// earlier successful calls remain tracked.
    #[error("store acknowledged {inserted} of {expected} inserted seed records")]
    Insertion {
        /// Number of records the call tried to insert.
        expected: usize,
        /// Number of records the store acknowledged.
        inserted: usize,
    },

    /// A sampling range was empty: `max` must be strictly greater than `min`.
    #[error("invalid sample range [{min}, {max}): max must be greater than min")]
    InvalidRange {
        /// Lower bound (inclusive).
        min: usize,
        /// Upper bound (exclusive).
        max: usize,
    },

    /// A generated or patched record did not serialize to a BSON document.
    #[error("failed to serialize seed record: {0}")]
    Serialize(#[from] bson::ser::Error),

    /// An inserted document did not deserialize back into the record type.
    #[error("failed to deserialize seeded document: {0}")]
    Deserialize(#[from] bson::de::Error),

    /// Error reported by the collection backend, propagated unchanged.
    #[error("collection error: {0}")]
    Store(#[source] StoreError),
}

impl SeedError {
    /// Wrap a backend error in [`SeedError::Store`].
    pub fn store(err: impl Into<StoreError>) -> Self {
        SeedError::Store(err.into())
    }
}
