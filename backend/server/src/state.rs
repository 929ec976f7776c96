use std::sync::Arc;

use chrono::Duration;

use super::{
    config::Config,
    credentials::Credentials,
    database::{DocumentStore, StoreError, connect},
};

/// Shared, immutable per-process state. Records live only in the store.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn DocumentStore>,
    pub credentials: Credentials,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Arc<Self>, StoreError> {
        let store = connect(&config.database_url).await?;

        Ok(Self::with_store(config, store))
    }

    pub fn with_store(config: Config, store: Arc<dyn DocumentStore>) -> Arc<Self> {
        let credentials = Credentials::new(
            config.jwt_secret.as_bytes(),
            Duration::hours(config.token_ttl_hours),
        );

        Arc::new(Self {
            config,
            store,
            credentials,
        })
    }
}
