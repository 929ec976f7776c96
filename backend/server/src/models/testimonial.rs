use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    Entity, ValidationError,
    fields::{draft, integer, required_text},
};

/// Star rating, always within 1..=5.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[serde(try_from = "i64", into = "i64")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: i64 = 1;
    pub const MAX: i64 = 5;

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Rating {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Rating(value as u8))
        } else {
            Err(ValidationError::Invalid(format!(
                "Rating must be between {} and {}",
                Self::MIN,
                Self::MAX
            )))
        }
    }
}

impl From<Rating> for i64 {
    fn from(rating: Rating) -> Self {
        rating.0 as i64
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Testimonial {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub role: String,
    pub content: String,
    pub rating: Rating,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct TestimonialDraft {
    name: Option<String>,
    role: Option<String>,
    content: Option<String>,
    rating: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct TestimonialFields {
    pub name: String,
    pub role: String,
    pub content: String,
    pub rating: Rating,
}

impl Entity for Testimonial {
    const COLLECTION: &'static str = "testimonials";
    const NAME: &'static str = "Testimonial";

    type Fields = TestimonialFields;

    fn validate(payload: Value) -> Result<TestimonialFields, ValidationError> {
        let d: TestimonialDraft = draft(payload)?;

        let name = required_text(d.name)?;
        let role = required_text(d.role)?;
        let content = required_text(d.content)?;
        let rating = Rating::try_from(integer(d.rating, "rating")?)?;

        Ok(TestimonialFields {
            name,
            role,
            content,
            rating,
        })
    }

    fn create(id: String, f: TestimonialFields, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: f.name,
            role: f.role,
            content: f.content,
            rating: f.rating,
            created_at: now,
        }
    }

    // No updatedAt on testimonials.
    fn apply(&mut self, f: TestimonialFields, _now: DateTime<Utc>) {
        self.name = f.name;
        self.role = f.role;
        self.content = f.content;
        self.rating = f.rating;
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
