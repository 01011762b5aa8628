//! End-to-end seeding scenarios against the in-memory backend.

use bson::{doc, Document};
use doc_seeder::{MemoryCollection, Patch, SeedCollection, Seeder, SeederMap};
use rand::Rng;

/// Initialize logging for tests
fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .try_init();
}

fn user_factory() -> Document {
    let mut rng = rand::thread_rng();
    doc! {
        "name": format!("user_{}", rng.gen_range(0..100_000_i32)),
        "age": rng.gen_range(18..80_i32),
        "active": true,
    }
}

fn post_factory() -> Document {
    let mut rng = rand::thread_rng();
    doc! {
        "title": format!("post_{}", rng.gen_range(0..100_000_i32)),
        "draft": true,
        "views": 0_i32,
    }
}

#[tokio::test]
async fn test_linked_collections_seed_and_clean() {
    init_logging();

    let users_store = MemoryCollection::new("users");
    let posts_store = MemoryCollection::new("posts");

    let mut fixtures = SeederMap::new();
    fixtures.insert("users", Seeder::new(users_store.clone(), user_factory));
    fixtures.insert("posts", Seeder::new(posts_store.clone(), post_factory));

    let author = fixtures.get_mut("users").unwrap().one(None).await.unwrap();
    let author_id = author.get("_id").unwrap().clone();

    let posts = fixtures
        .get_mut("posts")
        .unwrap()
        .many(3, Some(Patch::merge(doc! { "author_id": author_id.clone() })))
        .await
        .unwrap();

    assert_eq!(posts.len(), 3);
    assert!(posts.iter().all(|p| p.get("author_id") == Some(&author_id)));
    assert_eq!(users_store.len(), 1);
    assert_eq!(posts_store.len(), 3);

    let deleted = fixtures.clean().await.unwrap();
    assert_eq!(deleted, 4);
    assert!(users_store.is_empty());
    assert!(posts_store.is_empty());
}

#[tokio::test]
async fn test_patch_can_add_fields_outside_factory_shape() {
    init_logging();

    let store = MemoryCollection::new("posts");
    let mut posts = Seeder::new(store.clone(), post_factory);

    let tagged = posts
        .one(Some(Patch::merge(
            doc! { "fixture_tag": "smoke", "views": 10 },
        )))
        .await
        .unwrap();

    assert_eq!(tagged.get_str("fixture_tag").unwrap(), "smoke");
    assert_eq!(tagged.get_i32("views").unwrap(), 10);
    assert!(tagged.get_bool("draft").unwrap());
    assert_eq!(store.documents()[0].get_str("fixture_tag").unwrap(), "smoke");
}

#[tokio::test]
async fn test_featured_post_workflow() {
    init_logging();

    let store = MemoryCollection::new("posts");
    let mut posts = Seeder::new(store.clone(), post_factory).with_seed(7);

    let (featured, rest) = posts
        .pick(
            2,
            6,
            Some(Patch::merge(doc! { "featured": true, "draft": false })),
        )
        .await
        .unwrap();

    let featured = featured.expect("range [2, 6) always draws at least two");
    assert!(featured.get_bool("featured").unwrap());
    assert!(!featured.get_bool("draft").unwrap());
    assert!(rest.iter().all(|p| p.get("featured").is_none()));
    assert_eq!(store.len(), rest.len() + 1);
    assert_eq!(posts.inserted_ids().len(), rest.len() + 1);

    // Only tracked documents disappear on clean.
    store.insert_one(doc! { "title": "untracked" }).await.unwrap();
    let deleted = posts.clean().await.unwrap();
    assert_eq!(deleted as usize, rest.len() + 1);
    assert_eq!(store.len(), 1);
    assert_eq!(store.documents()[0].get_str("title").unwrap(), "untracked");
}

#[tokio::test]
async fn test_random_batch_with_indexed_map_patch() {
    init_logging();

    let store = MemoryCollection::new("users");
    let mut users = Seeder::new(store.clone(), user_factory);

    let created = users
        .random(
            1,
            5,
            Some(Patch::map(|mut user: Document, index| {
                user.insert("rank", index as i64);
                user
            })),
        )
        .await
        .unwrap();

    assert!((1..5).contains(&created.len()));
    for (index, user) in created.iter().enumerate() {
        assert_eq!(user.get_i64("rank").unwrap(), index as i64);
    }
}
