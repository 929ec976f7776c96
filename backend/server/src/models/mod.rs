//! # Content Model
//!
//! Record shapes for the catalog collections, plus the rules that turn an
//! untrusted JSON payload into the validated fields of a record.
//!
//! ## Payload rules
//!
//! - Required strings must be present and non-blank, stored trimmed
//! - Required lists must be present and non-empty
//! - Optional lists default to `[]`, optional mappings to `{}`
//! - Optional text treats `""` as absent
//! - `_id`, `id`, `createdAt`, `updatedAt` from the client are ignored
//!
//! Writes replace every editable field, so `PUT` carries the whole record.
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;

pub mod fields;
pub mod product;
pub mod project;
pub mod service;
pub mod testimonial;
pub mod user;

pub use product::{Availability, Product};
pub use project::Project;
pub use service::Service;
pub use testimonial::{Rating, Testimonial};
pub use user::User;

/// Insertion-ordered string mapping, displayed to clients in that order.
pub type Attributes = IndexMap<String, String>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required fields")]
    MissingFields,

    #[error("{0}")]
    Invalid(String),
}

/// A record type living in its own collection.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Collection name, also the URL segment under `/api`.
    const COLLECTION: &'static str;

    /// Display name used in client messages, e.g. `"Product not found"`.
    const NAME: &'static str;

    /// Validated, editable fields of the record.
    type Fields: Send + 'static;

    fn validate(payload: Value) -> Result<Self::Fields, ValidationError>;

    fn create(id: String, fields: Self::Fields, now: DateTime<Utc>) -> Self;

    /// Replaces the editable fields and refreshes `updatedAt` where the entity has one.
    fn apply(&mut self, fields: Self::Fields, now: DateTime<Utc>);

    fn id(&self) -> &str;

    fn created_at(&self) -> DateTime<Utc>;
}

/// `updatedAt` never precedes `createdAt`, even if the clock steps back.
pub(crate) fn touch(created_at: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    now.max(created_at)
}
