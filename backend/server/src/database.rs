//! # Document Store
//!
//! Schema-flexible persistence for the five record collections: users,
//! products, projects, services and testimonials.
//!
//! ## Redis layout
//!
//! - One hash per collection, `giya:<collection>`
//! - Field is the record identity, value is the JSON document
//! - `giya:<collection>:order` is a sorted set of ids scored by an insertion
//!   sequence taken from `giya:<collection>:seq`
//! - Every write is a script, so the hash and the order set change together
//! - Replacement only writes when the field already exists, so an update
//!   racing a delete never recreates the record
//!
//! ## Connection URLs
//!
//! - `redis://host:port` or `rediss://host:port` for Redis
//! - `memory://` for the in-process store (tests, local development)
use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use redis::{
    AsyncCommands, Client, RedisError, Script,
    aio::{ConnectionManager, ConnectionManagerConfig},
};
use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::memory::MemoryStore;

pub type Document = Value;

const KEY_PREFIX: &str = "giya";

// KEYS: documents hash, order zset, sequence counter. ARGV: id, json.
const INSERT_NEW: &str = r#"
if redis.call('HSETNX', KEYS[1], ARGV[1], ARGV[2]) == 0 then
    return 0
end
local seq = redis.call('INCR', KEYS[3])
redis.call('ZADD', KEYS[2], seq, ARGV[1])
return 1
"#;

// KEYS: documents hash. ARGV: id, json.
const REPLACE_EXISTING: &str = r#"
if redis.call('HEXISTS', KEYS[1], ARGV[1]) == 1 then
    redis.call('HSET', KEYS[1], ARGV[1], ARGV[2])
    return 1
end
return 0
"#;

// KEYS: documents hash, order zset. ARGV: id.
const DELETE_EXISTING: &str = r#"
redis.call('ZREM', KEYS[2], ARGV[1])
return redis.call('HDEL', KEYS[1], ARGV[1])
"#;

// KEYS: documents hash, order zset. Documents in insertion order.
const FIND_ORDERED: &str = r#"
local ids = redis.call('ZRANGE', KEYS[2], 0, -1)
local documents = {}
for _, id in ipairs(ids) do
    local document = redis.call('HGET', KEYS[1], id)
    if document then
        table.insert(documents, document)
    end
end
return documents
"#;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] RedisError),

    #[error("Stored document is not valid JSON: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("Duplicate id {id} in {collection}")]
    DuplicateId { collection: String, id: String },

    #[error("Store lock poisoned")]
    Poisoned,

    #[error("Unsupported database URL: {0}")]
    UnsupportedUrl(String),
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find_all(&self, collection: &str) -> Result<Vec<Document>, StoreError>;

    async fn find_by_id(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, StoreError>;

    async fn insert(
        &self,
        collection: &str,
        id: &str,
        document: Document,
    ) -> Result<(), StoreError>;

    /// Returns `false` without writing when `id` is absent.
    async fn replace(
        &self,
        collection: &str,
        id: &str,
        document: Document,
    ) -> Result<bool, StoreError>;

    /// Returns `false` when `id` is absent.
    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError>;
}

pub async fn connect(database_url: &str) -> Result<Arc<dyn DocumentStore>, StoreError> {
    if database_url.starts_with("memory://") {
        info!("Using in-memory document store");
        return Ok(Arc::new(MemoryStore::default()));
    }

    if database_url.starts_with("redis://") || database_url.starts_with("rediss://") {
        let connection = init_redis(database_url).await?;
        return Ok(Arc::new(RedisStore::new(connection)));
    }

    Err(StoreError::UnsupportedUrl(database_url.to_string()))
}

pub async fn init_redis(redis_url: &str) -> Result<ConnectionManager, StoreError> {
    let config = ConnectionManagerConfig::new()
        .set_number_of_retries(1)
        .set_connection_timeout(Duration::from_millis(500));

    let client = Client::open(redis_url)?;
    let mut connection_manager = client.get_connection_manager_with_config(config).await?;

    let _: String = redis::cmd("PING").query_async(&mut connection_manager).await?;
    info!("Connected to Redis");

    Ok(connection_manager)
}

pub struct RedisStore {
    connection: ConnectionManager,
    insert_new: Script,
    replace_existing: Script,
    delete_existing: Script,
    find_ordered: Script,
}

impl RedisStore {
    pub fn new(connection: ConnectionManager) -> Self {
        Self {
            connection,
            insert_new: Script::new(INSERT_NEW),
            replace_existing: Script::new(REPLACE_EXISTING),
            delete_existing: Script::new(DELETE_EXISTING),
            find_ordered: Script::new(FIND_ORDERED),
        }
    }
}

fn collection_key(collection: &str) -> String {
    format!("{KEY_PREFIX}:{collection}")
}

fn order_key(collection: &str) -> String {
    format!("{KEY_PREFIX}:{collection}:order")
}

fn sequence_key(collection: &str) -> String {
    format!("{KEY_PREFIX}:{collection}:seq")
}

#[async_trait]
impl DocumentStore for RedisStore {
    async fn find_all(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let mut connection = self.connection.clone();

        let raw: Vec<String> = self
            .find_ordered
            .key(collection_key(collection))
            .key(order_key(collection))
            .invoke_async(&mut connection)
            .await?;

        raw.iter()
            .map(|json| serde_json::from_str(json).map_err(StoreError::from))
            .collect()
    }

    async fn find_by_id(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, StoreError> {
        let mut connection = self.connection.clone();
        let raw: Option<String> = connection.hget(collection_key(collection), id).await?;

        raw.map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(StoreError::from)
    }

    async fn insert(
        &self,
        collection: &str,
        id: &str,
        document: Document,
    ) -> Result<(), StoreError> {
        let mut connection = self.connection.clone();
        let json = serde_json::to_string(&document)?;

        let inserted: i64 = self
            .insert_new
            .key(collection_key(collection))
            .key(order_key(collection))
            .key(sequence_key(collection))
            .arg(id)
            .arg(json)
            .invoke_async(&mut connection)
            .await?;

        if inserted == 0 {
            return Err(StoreError::DuplicateId {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }

        Ok(())
    }

    async fn replace(
        &self,
        collection: &str,
        id: &str,
        document: Document,
    ) -> Result<bool, StoreError> {
        let mut connection = self.connection.clone();
        let json = serde_json::to_string(&document)?;

        let replaced: i64 = self
            .replace_existing
            .key(collection_key(collection))
            .arg(id)
            .arg(json)
            .invoke_async(&mut connection)
            .await?;

        Ok(replaced == 1)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        let mut connection = self.connection.clone();

        let removed: i64 = self
            .delete_existing
            .key(collection_key(collection))
            .key(order_key(collection))
            .arg(id)
            .invoke_async(&mut connection)
            .await?;

        Ok(removed > 0)
    }
}
