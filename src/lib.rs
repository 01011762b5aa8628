//! doc-seeder
//!
//! Test-fixture seeding for document stores: factory-generated records,
//! deep-merge patches, identifier tracking, and cleanup that removes exactly
//! what was seeded.
//!
//! The `seeder-core` crate carries the store-agnostic pipeline together with
//! an in-memory backend; `seeder-mongodb` plugs in the MongoDB driver. This
//! crate re-exports both and adds the [`testing`] helpers used by the
//! integration tests.
//!
//! # Example
//!
//! ```
//! use bson::doc;
//! use doc_seeder::{MemoryCollection, Patch, Seeder};
//!
//! tokio_test::block_on(async {
//!     let mut posts = Seeder::new(MemoryCollection::new("posts"), || {
//!         doc! { "title": "generated", "draft": true }
//!     });
//!
//!     // Three posts, all published via a deep-merge patch.
//!     let published = posts
//!         .many(3, Some(Patch::merge(doc! { "draft": false })))
//!         .await
//!         .unwrap();
//!     assert_eq!(published.len(), 3);
//!
//!     // Remove exactly what this seeder created.
//!     let deleted = posts.clean().await.unwrap();
//!     assert_eq!(deleted, 3);
//! });
//! ```

pub mod testing;

pub use seeder_core::{
    deep_merge, ensure_id, MemoryCollection, Patch, SeedCollection, SeedError, Seeder, SeederMap,
    StoreError,
};
pub use seeder_mongodb::{seeder, MongoCollection};
