//! # Admin Seeding
//!
//! One-shot creation of the admin account the panel logs in with. Running it
//! again is harmless: an existing account with the same email is left as is,
//! password included.
use std::sync::Arc;

use anyhow::{Context, Result};
use giya_server::{
    credentials::hash_password,
    database::DocumentStore,
    models::user::{ADMIN_ROLE, normalize_email},
    repository::{RepositoryError, UserRepository},
};
use tokio::task::spawn_blocking;
use tracing::info;

pub const DEFAULT_EMAIL: &str = "admin@giya.com";
pub const DEFAULT_PASSWORD: &str = "giya@123";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Created,
    AlreadyExists,
}

pub async fn seed_admin(
    store: Arc<dyn DocumentStore>,
    email: &str,
    password: &str,
) -> Result<SeedOutcome> {
    let email = normalize_email(email);
    anyhow::ensure!(!email.is_empty(), "Admin email must not be empty");
    anyhow::ensure!(!password.is_empty(), "Admin password must not be empty");

    let users = UserRepository::new(store);

    if users.find_by_email(&email).await?.is_some() {
        info!(email = %email, "Admin user already exists");
        return Ok(SeedOutcome::AlreadyExists);
    }

    let password = password.to_string();
    let hashed = spawn_blocking(move || hash_password(&password))
        .await
        .context("Password hashing task failed")??;

    match users.insert(&email, hashed, ADMIN_ROLE).await {
        Ok(user) => {
            info!(email = %user.email, id = %user.id, "Admin user created");
            Ok(SeedOutcome::Created)
        }
        Err(RepositoryError::DuplicateEmail(_)) => {
            info!(email = %email, "Admin user already exists");
            Ok(SeedOutcome::AlreadyExists)
        }
        Err(e) => Err(e).context("Failed to create admin user"),
    }
}
