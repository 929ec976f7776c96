//! # Content Repository
//!
//! Create, read, update and delete over the document store, one
//! `Repository<E>` per entity type. Identity and timestamps are assigned
//! here, never by the store and never by the client.
//!
//! - `list_all` is newest first by `createdAt`, ties broken by insertion order
//! - `update` refreshes `updatedAt` and never creates a missing record
//! - `delete` of a missing record is `NotFound`, so a second delete fails cleanly
use std::{cmp::Reverse, marker::PhantomData, sync::Arc};

use chrono::Utc;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::{
    database::{DocumentStore, StoreError},
    models::{
        Entity,
        user::{self, User, normalize_email},
    },
};

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("A user with email {0} already exists")]
    DuplicateEmail(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Record could not be encoded: {0}")]
    Encoding(#[from] serde_json::Error),
}

pub type RepoResult<T> = Result<T, RepositoryError>;

pub struct Repository<E> {
    store: Arc<dyn DocumentStore>,
    entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Repository<E> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            entity: PhantomData,
        }
    }

    pub async fn list_all(&self) -> RepoResult<Vec<E>> {
        let documents = self.store.find_all(E::COLLECTION).await?;

        let mut records: Vec<E> = documents
            .into_iter()
            .rev()
            .filter_map(|document| match serde_json::from_value(document) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(collection = E::COLLECTION, error = %e, "Skipping unreadable document");
                    None
                }
            })
            .collect();

        records.sort_by_key(|record| Reverse(record.created_at()));

        Ok(records)
    }

    pub async fn get_by_id(&self, id: &str) -> RepoResult<E> {
        let document = self
            .store
            .find_by_id(E::COLLECTION, id)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        Ok(serde_json::from_value(document)?)
    }

    pub async fn create(&self, fields: E::Fields) -> RepoResult<E> {
        let record = E::create(Uuid::new_v4().to_string(), fields, Utc::now());

        self.store
            .insert(E::COLLECTION, record.id(), serde_json::to_value(&record)?)
            .await?;

        Ok(record)
    }

    pub async fn update(&self, id: &str, fields: E::Fields) -> RepoResult<E> {
        let mut record = self.get_by_id(id).await?;
        record.apply(fields, Utc::now());

        let replaced = self
            .store
            .replace(E::COLLECTION, id, serde_json::to_value(&record)?)
            .await?;

        // Deleted between the read and the write.
        if !replaced {
            return Err(RepositoryError::NotFound);
        }

        Ok(record)
    }

    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        if !self.store.delete(E::COLLECTION, id).await? {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

pub struct UserRepository {
    store: Arc<dyn DocumentStore>,
}

impl UserRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Case-insensitive lookup.
    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let email = normalize_email(email);

        for document in self.store.find_all(user::COLLECTION).await? {
            let user: User = match serde_json::from_value(document) {
                Ok(user) => user,
                Err(e) => {
                    warn!(collection = user::COLLECTION, error = %e, "Skipping unreadable user");
                    continue;
                }
            };

            if user.email == email {
                return Ok(Some(user));
            }
        }

        Ok(None)
    }

    pub async fn insert(&self, email: &str, password_hash: String, role: &str) -> RepoResult<User> {
        let email = normalize_email(email);

        if self.find_by_email(&email).await?.is_some() {
            return Err(RepositoryError::DuplicateEmail(email));
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            email,
            password: password_hash,
            role: role.to_string(),
            created_at: Utc::now(),
        };

        self.store
            .insert(user::COLLECTION, &user.id, serde_json::to_value(&user)?)
            .await?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        memory::MemoryStore,
        models::{Project, Service, Testimonial},
    };

    fn store() -> Arc<dyn DocumentStore> {
        Arc::new(MemoryStore::default())
    }

    fn testimonial(name: &str) -> <Testimonial as Entity>::Fields {
        Testimonial::validate(json!({
            "name": name,
            "role": "Client",
            "content": "Great work",
            "rating": 5,
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_list_all_newest_first() {
        let repository = Repository::<Testimonial>::new(store());

        for name in ["A", "B", "C"] {
            repository.create(testimonial(name)).await.unwrap();
        }

        let names: Vec<_> = repository
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();

        assert_eq!(names, ["C", "B", "A"]);
    }

    #[tokio::test]
    async fn test_list_all_empty() {
        let repository = Repository::<Project>::new(store());
        assert!(repository.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let store = store();
        let repository = Repository::<Testimonial>::new(store.clone());

        let err = repository.update("missing", testimonial("A")).await.unwrap_err();

        assert!(matches!(err, RepositoryError::NotFound));
        assert!(store.find_all(Testimonial::COLLECTION).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_keeps_identity_and_refreshes_timestamp() {
        let repository = Repository::<Service>::new(store());
        let fields = |title: &str| {
            Service::validate(json!({
                "title": title,
                "icon": "🛠",
                "description": "Repairs",
                "features": ["Polish"],
                "process": ["Inspect", "Fix"],
            }))
            .unwrap()
        };

        let created = repository.create(fields("Restoration")).await.unwrap();
        let updated = repository.update(&created.id, fields("Repair")).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(repository.get_by_id(&created.id).await.unwrap().title, "Repair");
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let repository = Repository::<Testimonial>::new(store());
        let created = repository.create(testimonial("A")).await.unwrap();

        repository.delete(&created.id).await.unwrap();
        let err = repository.delete(&created.id).await.unwrap_err();

        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_user_email_is_case_insensitive() {
        let users = UserRepository::new(store());
        users
            .insert("Admin@Giya.com", "hash".to_string(), "admin")
            .await
            .unwrap();

        let found = users.find_by_email("  admin@GIYA.com").await.unwrap().unwrap();
        assert_eq!(found.email, "admin@giya.com");

        let err = users
            .insert("admin@giya.com", "hash".to_string(), "admin")
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::DuplicateEmail(_)));
    }

    #[tokio::test]
    async fn test_unreadable_user_does_not_block_login() {
        let store = store();
        store
            .insert(user::COLLECTION, "broken", json!({ "email": 42 }))
            .await
            .unwrap();

        let users = UserRepository::new(store);
        users
            .insert("admin@giya.com", "hash".to_string(), "admin")
            .await
            .unwrap();

        let found = users.find_by_email("admin@giya.com").await.unwrap();
        assert_eq!(found.map(|u| u.email).as_deref(), Some("admin@giya.com"));
        assert!(users.find_by_email("nobody@giya.com").await.unwrap().is_none());
    }
}
