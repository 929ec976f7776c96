use std::{collections::HashMap, sync::RwLock};

use async_trait::async_trait;
use indexmap::IndexMap;

use crate::database::{Document, DocumentStore, StoreError};

/// Process-local store. Collections keep insertion order.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, IndexMap<String, Document>>>,
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_all(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().map_err(|_| StoreError::Poisoned)?;

        Ok(collections
            .get(collection)
            .map(|documents| documents.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().map_err(|_| StoreError::Poisoned)?;

        Ok(collections
            .get(collection)
            .and_then(|documents| documents.get(id))
            .cloned())
    }

    async fn insert(
        &self,
        collection: &str,
        id: &str,
        document: Document,
    ) -> Result<(), StoreError> {
        let mut collections = self.collections.write().map_err(|_| StoreError::Poisoned)?;
        let documents = collections.entry(collection.to_string()).or_default();

        if documents.contains_key(id) {
            return Err(StoreError::DuplicateId {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }

        documents.insert(id.to_string(), document);
        Ok(())
    }

    async fn replace(
        &self,
        collection: &str,
        id: &str,
        document: Document,
    ) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().map_err(|_| StoreError::Poisoned)?;

        match collections
            .get_mut(collection)
            .and_then(|documents| documents.get_mut(id))
        {
            Some(existing) => {
                *existing = document;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().map_err(|_| StoreError::Poisoned)?;

        Ok(collections
            .get_mut(collection)
            .and_then(|documents| documents.shift_remove(id))
            .is_some())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_replace_never_upserts() {
        let store = MemoryStore::default();

        let replaced = store.replace("products", "missing", json!({})).await.unwrap();

        assert!(!replaced);
        assert!(store.find_all("products").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_rejected() {
        let store = MemoryStore::default();
        store.insert("users", "a", json!({ "n": 1 })).await.unwrap();

        let err = store.insert("users", "a", json!({ "n": 2 })).await.unwrap_err();

        assert!(matches!(err, StoreError::DuplicateId { .. }));
        assert_eq!(
            store.find_by_id("users", "a").await.unwrap(),
            Some(json!({ "n": 1 }))
        );
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let store = MemoryStore::default();
        store.insert("services", "a", json!({})).await.unwrap();

        assert!(store.delete("services", "a").await.unwrap());
        assert!(!store.delete("services", "a").await.unwrap());
    }

    #[tokio::test]
    async fn test_find_all_keeps_insertion_order() {
        let store = MemoryStore::default();
        for id in ["a", "b", "c"] {
            store.insert("projects", id, json!({ "id": id })).await.unwrap();
        }
        store.delete("projects", "b").await.unwrap();

        let ids: Vec<_> = store
            .find_all("projects")
            .await
            .unwrap()
            .into_iter()
            .map(|d| d["id"].as_str().unwrap().to_string())
            .collect();

        assert_eq!(ids, ["a", "c"]);
    }
}
