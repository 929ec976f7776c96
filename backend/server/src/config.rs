use std::{env, fmt::Display, fs::read_to_string, path::PathBuf, str::FromStr};

use thiserror::Error;
use tracing::{info, warn};

const DEV_JWT_SECRET: &str = "giya-furniture-dev-secret-change-me";

#[derive(Error, Debug)]
#[error("Invalid {key} value: {reason}")]
pub struct ConfigError {
    key: &'static str,
    reason: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub uploads_dir: PathBuf,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub cors_origin: String,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self {
            port: try_load("PORT", "5000")?,
            database_url: try_load("DATABASE_URL", "redis://127.0.0.1:6379")?,
            uploads_dir: try_load("UPLOADS_DIR", "uploads")?,
            jwt_secret: read_secret("JWT_SECRET", DEV_JWT_SECRET),
            token_ttl_hours: try_load("TOKEN_TTL_HOURS", "24")?,
            cors_origin: try_load("CORS_ORIGIN", "*")?,
        })
    }

    /// Settings for tests and local tooling: in-memory store, fixed secret.
    pub fn local(uploads_dir: impl Into<PathBuf>) -> Self {
        Self {
            port: 0,
            database_url: "memory://".to_string(),
            uploads_dir: uploads_dir.into(),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            token_ttl_hours: 24,
            cors_origin: "*".to_string(),
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        info!("Environment variable {key} not found, using default");
    })
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e: T::Err| {
            warn!("Invalid {key} value: {e}");

            ConfigError {
                key,
                reason: e.to_string(),
            }
        })
}

fn read_secret(secret_name: &str, default: &str) -> String {
    let path = format!("/run/secrets/{secret_name}");

    read_to_string(&path)
        .map(|s| s.trim().to_string())
        .or_else(|_| env::var(secret_name))
        .unwrap_or_else(|_| {
            warn!("Secret {secret_name} not found in {path} or environment, using development default");
            default.to_string()
        })
}
