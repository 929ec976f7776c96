use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error("Token signing failed: {0}")]
    Sign(#[source] jsonwebtoken::errors::Error),

    #[error("Invalid or expired token")]
    InvalidToken,
}

/// Decoded session token payload.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Claims {
    pub id: String,
    pub email: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(id: String, email: String, role: String, expires_in: Duration) -> Self {
        let now = Utc::now();

        Self {
            id,
            email,
            role,
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
        }
    }
}

pub struct Credentials {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    token_ttl: Duration,
}

impl Credentials {
    pub fn new(secret: &[u8], token_ttl: Duration) -> Self {
        let mut validation = Validation::default();
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            token_ttl,
        }
    }

    pub fn issue(&self, id: &str, email: &str, role: &str) -> Result<String, CredentialError> {
        let claims = Claims::new(
            id.to_string(),
            email.to_string(),
            role.to_string(),
            self.token_ttl,
        );

        self.sign(&claims)
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, CredentialError> {
        encode(&Header::default(), claims, &self.encoding_key).map_err(CredentialError::Sign)
    }

    /// Signature and expiry check.
    pub fn authenticate(&self, token: &str) -> Result<Claims, CredentialError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| CredentialError::InvalidToken)
    }
}

pub fn hash_password(plaintext: &str) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CredentialError::Hash(e.to_string()))
}

/// Same parameters as every stored hash, so checking against it costs the same.
static UNKNOWN_USER_HASH: LazyLock<String> =
    LazyLock::new(|| hash_password("giya-unknown-user").unwrap_or_default());

/// Login check. A missing account is verified against a stand-in hash so it
/// takes as long as a wrong password.
pub fn verify_login(plaintext: &str, stored: Option<&str>) -> bool {
    match stored {
        Some(hashed) => verify_password(plaintext, hashed),
        None => {
            verify_password(plaintext, &UNKNOWN_USER_HASH);
            false
        }
    }
}

/// A stored hash that does not parse never verifies.
pub fn verify_password(plaintext: &str, hashed: &str) -> bool {
    PasswordHash::new(hashed)
        .map(|parsed| {
            Argon2::default()
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}
