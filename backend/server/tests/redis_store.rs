//! Runs against a live Redis. Set `REDIS_URL` and pass `--ignored`.
use std::env;

use giya_server::database::{DocumentStore, RedisStore, StoreError, init_redis};
use serde_json::json;
use uuid::Uuid;

async fn store() -> Option<RedisStore> {
    let Ok(url) = env::var("REDIS_URL") else {
        eprintln!("REDIS_URL not set, skipping");
        return None;
    };

    Some(RedisStore::new(init_redis(&url).await.unwrap()))
}

/// Fresh collection per test so runs never see each other's records.
fn collection() -> String {
    format!("test-{}", Uuid::new_v4().simple())
}

#[tokio::test]
#[ignore = "needs a live Redis at REDIS_URL"]
async fn test_redis_replace_never_upserts() {
    let Some(store) = store().await else { return };
    let collection = collection();

    let replaced = store
        .replace(&collection, "missing", json!({ "name": "Ghost" }))
        .await
        .unwrap();

    assert!(!replaced);
    assert!(store.find_by_id(&collection, "missing").await.unwrap().is_none());
    assert!(store.find_all(&collection).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "needs a live Redis at REDIS_URL"]
async fn test_redis_insert_replace_delete() {
    let Some(store) = store().await else { return };
    let collection = collection();

    store.insert(&collection, "a", json!({ "name": "Oak" })).await.unwrap();

    let duplicate = store.insert(&collection, "a", json!({ "name": "Teak" })).await;
    assert!(matches!(duplicate, Err(StoreError::DuplicateId { .. })));

    let replaced = store
        .replace(&collection, "a", json!({ "name": "Walnut" }))
        .await
        .unwrap();
    assert!(replaced);
    assert_eq!(
        store.find_by_id(&collection, "a").await.unwrap(),
        Some(json!({ "name": "Walnut" }))
    );

    assert!(store.delete(&collection, "a").await.unwrap());
    assert!(!store.delete(&collection, "a").await.unwrap());

    // A replace after the delete must not bring the record back.
    let replaced = store
        .replace(&collection, "a", json!({ "name": "Revived" }))
        .await
        .unwrap();
    assert!(!replaced);
    assert!(store.find_all(&collection).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "needs a live Redis at REDIS_URL"]
async fn test_redis_find_all_keeps_insertion_order() {
    let Some(store) = store().await else { return };
    let collection = collection();

    for id in ["c", "a", "b", "d"] {
        store.insert(&collection, id, json!({ "id": id })).await.unwrap();
    }
    store.delete(&collection, "b").await.unwrap();
    store.replace(&collection, "c", json!({ "id": "c2" })).await.unwrap();

    let documents = store.find_all(&collection).await.unwrap();

    assert_eq!(
        documents,
        vec![json!({ "id": "c2" }), json!({ "id": "a" }), json!({ "id": "d" })]
    );

    for id in ["c", "a", "d"] {
        store.delete(&collection, id).await.unwrap();
    }
}
