//! Named collections of seeders cleaned as a unit.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::SeedError;
use crate::seeder::Seeder;

/// Named set of [`Seeder`]s sharing one record type, cleaned as a unit.
///
/// The usual shape is one seeder per collection of a test database, torn
/// down with a single [`clean`](SeederMap::clean) call after the test.
/// Use `T = bson::Document` when the collections hold different record
/// shapes.
pub struct SeederMap<T> {
    seeders: HashMap<String, Seeder<T>>,
}

impl<T> SeederMap<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Create an empty map.
    pub fn new() -> Self {
        Self {
            seeders: HashMap::new(),
        }
    }

    /// Register `seeder` under `name`.
    ///
    /// Returns the previous seeder under that name, if any; a replaced
    /// seeder keeps its ledger, so clean it separately if it already
    /// inserted records.
    pub fn insert(&mut self, name: impl Into<String>, seeder: Seeder<T>) -> Option<Seeder<T>> {
        self.seeders.insert(name.into(), seeder)
    }

    /// Look up a seeder by name.
    pub fn get(&self, name: &str) -> Option<&Seeder<T>> {
        self.seeders.get(name)
    }

    /// Look up a seeder by name for creation and cleanup calls.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Seeder<T>> {
        self.seeders.get_mut(name)
    }

    /// Names of every registered seeder, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.seeders.keys().map(String::as_str)
    }

    /// Number of registered seeders.
    pub fn len(&self) -> usize {
        self.seeders.len()
    }

    /// Whether the map holds no seeders.
    pub fn is_empty(&self) -> bool {
        self.seeders.is_empty()
    }

    /// Clean every member seeder and return the total deleted count.
    ///
    /// Members are cleaned sequentially and the first error propagates.
    /// Member cleans are idempotent, so re-calling after a partial failure
    /// finishes the remaining ledgers without touching records that are
    /// already gone.
    pub async fn clean(&mut self) -> Result<u64, SeedError> {
        let mut total = 0;
        for (name, seeder) in self.seeders.iter_mut() {
            let deleted = seeder.clean().await?;
            debug!("Cleaned {} documents via seeder '{}'", deleted, name);
            total += deleted;
        }
        Ok(total)
    }
}

impl<T> Default for SeederMap<T>
where
    T: Serialize + DeserializeOwned,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use bson::{doc, Document};

    use super::*;
    use crate::memory::MemoryCollection;

    fn document_seeder(store: &MemoryCollection, n: i32) -> Seeder<Document> {
        Seeder::new(store.clone(), move || doc! { "n": n })
    }

    #[tokio::test]
    async fn test_get_mut_reaches_named_seeder() {
        let users = MemoryCollection::new("users");
        let mut map = SeederMap::new();
        map.insert("users", document_seeder(&users, 1));

        map.get_mut("users").unwrap().many(2, None).await.unwrap();

        assert_eq!(users.len(), 2);
        assert_eq!(map.get("users").unwrap().inserted_ids().len(), 2);
        assert!(map.get_mut("missing").is_none());
    }

    #[tokio::test]
    async fn test_clean_empties_every_member() {
        let users = MemoryCollection::new("users");
        let posts = MemoryCollection::new("posts");
        let mut map = SeederMap::new();
        map.insert("users", document_seeder(&users, 1));
        map.insert("posts", document_seeder(&posts, 2));

        map.get_mut("users").unwrap().many(3, None).await.unwrap();
        map.get_mut("posts").unwrap().many(2, None).await.unwrap();

        let deleted = map.clean().await.unwrap();

        assert_eq!(deleted, 5);
        assert!(users.is_empty());
        assert!(posts.is_empty());
        assert!(map.get("users").unwrap().inserted_ids().is_empty());
        assert!(map.get("posts").unwrap().inserted_ids().is_empty());
    }

    #[tokio::test]
    async fn test_names_and_len() {
        let mut map = SeederMap::new();
        assert!(map.is_empty());

        map.insert("users", document_seeder(&MemoryCollection::new("users"), 1));
        map.insert("posts", document_seeder(&MemoryCollection::new("posts"), 2));

        assert_eq!(map.len(), 2);
        let mut names: Vec<&str> = map.names().collect();
        names.sort_unstable();
        assert_eq!(names, vec!["posts", "users"]);
    }

    #[tokio::test]
    async fn test_insert_replaces_previous_seeder() {
        let store = MemoryCollection::new("users");
        let mut map = SeederMap::new();
        assert!(map.insert("users", document_seeder(&store, 1)).is_none());

        let replaced = map.insert("users", document_seeder(&store, 2));

        assert!(replaced.is_some());
        assert_eq!(map.len(), 1);
    }
}
