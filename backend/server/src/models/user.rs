use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const ADMIN_ROLE: &str = "admin";

pub const COLLECTION: &str = "users";

/// Stored account. Created by the seeding command, read at login.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    /// Argon2 PHC string, never the plaintext.
    pub password: String,
    #[serde(default = "default_role")]
    pub role: String,
    pub created_at: DateTime<Utc>,
}

fn default_role() -> String {
    ADMIN_ROLE.to_string()
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
