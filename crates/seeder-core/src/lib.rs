//! Test-fixture seeding for document stores
//!
//! Creates factory-generated records in a collection, tracks every inserted
//! identifier, and later removes exactly those records again. Built for test
//! suites that need per-test fixture data with reliable cleanup.
//!
//! # Architecture
//!
//! - [`Seeder`] runs the creation pipeline: factory call, optional
//!   [`Patch`], identifier assignment, batch insert, ledger bookkeeping.
//! - [`SeedCollection`] is the storage capability trait. [`MemoryCollection`]
//!   is the bundled in-memory backend; the `seeder-mongodb` crate plugs in
//!   the MongoDB driver.
//! - [`SeederMap`] aggregates named seeders so a whole test database is
//!   cleaned with one call.
//!
//! Record types are anything `Serialize + DeserializeOwned` whose BSON form
//! is a document; `bson::Document` itself is the free-form mode.

mod collection;
mod error;
mod id;
mod map;
mod memory;
mod patch;
mod seeder;

pub use collection::SeedCollection;
pub use error::{SeedError, StoreError};
pub use id::ensure_id;
pub use map::SeederMap;
pub use memory::MemoryCollection;
pub use patch::{deep_merge, Patch};
pub use seeder::Seeder;
