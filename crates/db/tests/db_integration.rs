//! Database integration tests.
//!
//! Most tests run against a migrated in-memory SQLite database, so the
//! constraints and cascades under test are the real ones. The PostgreSQL
//! tests need a running instance:
//!
//!   `cargo test --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `guarda_test`)
//!   `TEST_DB_PASSWORD` (default: `guarda_test`)
//!   `TEST_DB_NAME` (default: `guarda_test`)

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use guarda_common::AppError;
use guarda_db::{
    entities::{
        city, comment, knowledge,
        memory::{self, MemoryKind},
        posting::{self, PostingType},
        profile, state,
    },
    repositories::{
        CityRepository, CommentRepository, CurtidaRepository, KnowledgeRepository, MemoryFilter,
        MemoryRepository, PostingRepository, ProfileRepository,
    },
    test_utils::{TestDatabase, TestDbConfig},
};
use sea_orm::{ConnectionTrait, DatabaseConnection, Set};

struct Seed {
    db: Arc<DatabaseConnection>,
    city_id: String,
    profile_id: String,
    memory_id: String,
}

async fn seed() -> Seed {
    let db = TestDatabase::sqlite_memory().await.unwrap().connection();
    let now = Utc::now();

    let cities = CityRepository::new(Arc::clone(&db));
    cities
        .create_state(state::ActiveModel {
            id: Set("mg".to_string()),
            name: Set("Minas Gerais".to_string()),
            abbreviation: Set("MG".to_string()),
        })
        .await
        .unwrap();
    cities
        .create(city::ActiveModel {
            id: Set("bh".to_string()),
            name: Set("Belo Horizonte".to_string()),
            state_id: Set("mg".to_string()),
            slug: Set(Some("belo-horizonte-mg".to_string())),
            created_at: Set(now.into()),
        })
        .await
        .unwrap();

    ProfileRepository::new(Arc::clone(&db))
        .create(profile::ActiveModel {
            id: Set("p1".to_string()),
            external_auth_id: Set("auth|p1".to_string()),
            display_name: Set("P1".to_string()),
            role: Set(profile::Role::Member),
            created_at: Set(now.into()),
            ..Default::default()
        })
        .await
        .unwrap();

    MemoryRepository::new(Arc::clone(&db))
        .create(memory::ActiveModel {
            id: Set("m1".to_string()),
            kind: Set(MemoryKind::Place),
            name: Set("Mercado Central".to_string()),
            city_id: Set("bh".to_string()),
            owner_id: Set("p1".to_string()),
            tags: Set(serde_json::json!([])),
            created_at: Set(now.into()),
            ..Default::default()
        })
        .await
        .unwrap();

    Seed {
        db,
        city_id: "bh".to_string(),
        profile_id: "p1".to_string(),
        memory_id: "m1".to_string(),
    }
}

async fn insert_posting(seed: &Seed, id: &str, parent_id: Option<&str>) -> posting::Model {
    tokio::time::sleep(Duration::from_millis(2)).await;
    PostingRepository::new(Arc::clone(&seed.db))
        .create(posting::ActiveModel {
            id: Set(id.to_string()),
            owner_id: Set(seed.profile_id.clone()),
            city_id: Set(seed.city_id.clone()),
            memory_id: Set(None),
            parent_id: Set(parent_id.map(ToString::to_string)),
            posting_type: Set(PostingType::Text),
            text: Set(Some("oi".to_string())),
            url: Set(None),
            permalink: Set(format!("perma-{id}")),
            score: Set(0),
            created_at: Set(Utc::now().into()),
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn test_duplicate_like_is_conflict() {
    let seed = seed().await;
    let likes = CurtidaRepository::new(Arc::clone(&seed.db));

    likes.create(&seed.memory_id, &seed.profile_id).await.unwrap();
    let second = likes.create(&seed.memory_id, &seed.profile_id).await;

    assert!(matches!(second, Err(AppError::Conflict(_))));
    assert_eq!(likes.count_by_memory(&seed.memory_id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_duplicate_knowledge_is_conflict() {
    let seed = seed().await;
    let post = insert_posting(&seed, "root", None).await;
    let repo = KnowledgeRepository::new(Arc::clone(&seed.db));

    let marker = |id: &str| knowledge::ActiveModel {
        id: Set(id.to_string()),
        profile_id: Set(seed.profile_id.clone()),
        posting_id: Set(post.id.clone()),
        created_at: Set(Utc::now().into()),
    };

    repo.create(marker("k1")).await.unwrap();
    let second = repo.create(marker("k2")).await;

    assert!(matches!(second, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn test_duplicate_permalink_is_conflict() {
    let seed = seed().await;
    insert_posting(&seed, "a", None).await;

    let result = PostingRepository::new(Arc::clone(&seed.db))
        .create(posting::ActiveModel {
            id: Set("b".to_string()),
            owner_id: Set(seed.profile_id.clone()),
            city_id: Set(seed.city_id.clone()),
            memory_id: Set(None),
            parent_id: Set(None),
            posting_type: Set(PostingType::Text),
            text: Set(Some("dup".to_string())),
            url: Set(None),
            permalink: Set("perma-a".to_string()),
            score: Set(0),
            created_at: Set(Utc::now().into()),
        })
        .await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn test_comment_needs_exactly_one_target() {
    let seed = seed().await;

    let result = CommentRepository::new(Arc::clone(&seed.db))
        .create(comment::ActiveModel {
            id: Set("c1".to_string()),
            memory_id: Set(None),
            legacy_person_id: Set(None),
            author_id: Set(seed.profile_id.clone()),
            text: Set("orphan".to_string()),
            created_at: Set(Utc::now().into()),
        })
        .await;

    assert!(matches!(result, Err(AppError::Database(_))));
}

#[tokio::test]
async fn test_reassignment_commits_as_a_unit() {
    let seed = seed().await;
    let repo = PostingRepository::new(Arc::clone(&seed.db));

    insert_posting(&seed, "root", None).await;
    insert_posting(&seed, "r1", Some("root")).await;
    insert_posting(&seed, "r2", Some("root")).await;
    insert_posting(&seed, "r3", Some("root")).await;

    let deleted = repo.delete_with_reassignment("root").await.unwrap();

    assert_eq!(deleted.posting.id, "root");
    assert_eq!(deleted.promoted_root_id.as_deref(), Some("r1"));
    assert_eq!(deleted.reparented, 2);

    let promoted = repo.get_by_id("r1").await.unwrap();
    assert_eq!(promoted.parent_id, None);
    assert_eq!(promoted.score, 2);
    for id in ["r2", "r3"] {
        let reply = repo.get_by_id(id).await.unwrap();
        assert_eq!(reply.parent_id.as_deref(), Some("r1"));
    }
    assert!(repo.find_by_id("root").await.unwrap().is_none());
}

#[tokio::test]
async fn test_failed_reassignment_rolls_back() {
    let seed = seed().await;
    let repo = PostingRepository::new(Arc::clone(&seed.db));

    insert_posting(&seed, "root", None).await;
    insert_posting(&seed, "r1", Some("root")).await;
    insert_posting(&seed, "r2", Some("root")).await;

    // The promotion and re-parenting run before the delete aborts.
    seed.db
        .execute_unprepared(
            "CREATE TRIGGER block_root_delete BEFORE DELETE ON posting \
             WHEN old.id = 'root' \
             BEGIN SELECT RAISE(ABORT, 'root delete blocked'); END",
        )
        .await
        .unwrap();

    let result = repo.delete_with_reassignment("root").await;
    assert!(matches!(result, Err(AppError::Database(_))));

    for id in ["r1", "r2"] {
        let reply = repo.get_by_id(id).await.unwrap();
        assert_eq!(reply.parent_id.as_deref(), Some("root"));
    }
    assert!(repo.find_by_id("root").await.unwrap().is_some());
}

#[tokio::test]
async fn test_reassignment_of_missing_posting() {
    let seed = seed().await;
    let repo = PostingRepository::new(Arc::clone(&seed.db));

    let result = repo.delete_with_reassignment("ghost").await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_search_treats_wildcards_as_text() {
    let seed = seed().await;
    let memories = MemoryRepository::new(Arc::clone(&seed.db));

    memories
        .create(memory::ActiveModel {
            id: Set("m2".to_string()),
            kind: Set(MemoryKind::Place),
            name: Set("Bar 100% Mineiro".to_string()),
            city_id: Set(seed.city_id.clone()),
            owner_id: Set(seed.profile_id.clone()),
            tags: Set(serde_json::json!([])),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        })
        .await
        .unwrap();

    let search = |needle: &str| MemoryFilter {
        search: Some(needle.to_string()),
        ..Default::default()
    };

    let found = memories.find_by_city(&seed.city_id, &search("%")).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, "m2");

    let found = memories.find_by_city(&seed.city_id, &search("_")).await.unwrap();
    assert!(found.is_empty());

    let found = memories.find_by_city(&seed.city_id, &search("MERCADO")).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, seed.memory_id);
}

#[tokio::test]
async fn test_grouped_counts() {
    let seed = seed().await;
    let memories = MemoryRepository::new(Arc::clone(&seed.db));

    CurtidaRepository::new(Arc::clone(&seed.db))
        .create(&seed.memory_id, &seed.profile_id)
        .await
        .unwrap();

    let ids = vec![seed.memory_id.clone(), "other".to_string()];
    let likes = memories.count_likes_by_memory(&ids).await.unwrap();
    let comments = memories.count_comments_by_memory(&ids).await.unwrap();

    assert_eq!(likes.get("m1"), Some(&1));
    assert!(!likes.contains_key("other"));
    assert!(comments.is_empty());
}

#[tokio::test]
async fn test_favorite_city_insert_is_idempotent() {
    let seed = seed().await;
    let profiles = ProfileRepository::new(Arc::clone(&seed.db));

    assert!(profiles.add_favorite_city("p1", "bh").await.unwrap());
    assert!(!profiles.add_favorite_city("p1", "bh").await.unwrap());

    let favorites = profiles.find_favorite_cities("p1").await.unwrap();
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0].id, "bh");
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_postgres_connection_and_migrations() {
    let db = TestDatabase::postgres().await.expect("Failed to connect");

    let result = db
        .connection()
        .execute(sea_orm::Statement::from_string(
            sea_orm::DatabaseBackend::Postgres,
            "SELECT count(*) FROM posting".to_string(),
        ))
        .await;

    assert!(result.is_ok(), "Query failed: {:?}", result.err());
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(config.database_url().starts_with("postgres://"));
}
