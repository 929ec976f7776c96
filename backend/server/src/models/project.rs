use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    Attributes, Entity, ValidationError,
    fields::{draft, integer, list, optional_text, required_list, required_text},
    touch,
};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub category: String,
    pub location: String,
    pub year: i32,
    pub image: String,
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
    pub description: String,
    pub services: Vec<String>,
    pub highlights: Vec<String>,
    pub stats: Attributes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct ProjectDraft {
    title: Option<String>,
    category: Option<String>,
    location: Option<String>,
    year: Option<Value>,
    image: Option<String>,
    images: Option<Vec<String>>,
    video: Option<String>,
    description: Option<String>,
    services: Option<Vec<String>>,
    highlights: Option<Vec<String>>,
    stats: Option<Attributes>,
    client: Option<String>,
    budget: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ProjectFields {
    pub title: String,
    pub category: String,
    pub location: String,
    pub year: i32,
    pub image: String,
    pub images: Vec<String>,
    pub video: Option<String>,
    pub description: String,
    pub services: Vec<String>,
    pub highlights: Vec<String>,
    pub stats: Attributes,
    pub client: Option<String>,
    pub budget: Option<String>,
}

fn year(value: Option<Value>) -> Result<i32, ValidationError> {
    let year = integer(value, "year")?;

    i32::try_from(year)
        .ok()
        .filter(|y| *y > 0)
        .ok_or_else(|| ValidationError::Invalid(format!("Invalid year {year}")))
}

impl Entity for Project {
    const COLLECTION: &'static str = "projects";
    const NAME: &'static str = "Project";

    type Fields = ProjectFields;

    fn validate(payload: Value) -> Result<ProjectFields, ValidationError> {
        let d: ProjectDraft = draft(payload)?;

        Ok(ProjectFields {
            title: required_text(d.title)?,
            category: required_text(d.category)?,
            location: required_text(d.location)?,
            year: year(d.year)?,
            image: required_text(d.image)?,
            images: list(d.images),
            video: optional_text(d.video),
            description: required_text(d.description)?,
            services: required_list(d.services)?,
            highlights: required_list(d.highlights)?,
            stats: d.stats.ok_or(ValidationError::MissingFields)?,
            client: optional_text(d.client),
            budget: optional_text(d.budget),
        })
    }

    fn create(id: String, f: ProjectFields, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: f.title,
            category: f.category,
            location: f.location,
            year: f.year,
            image: f.image,
            images: f.images,
            video: f.video,
            description: f.description,
            services: f.services,
            highlights: f.highlights,
            stats: f.stats,
            client: f.client,
            budget: f.budget,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, f: ProjectFields, now: DateTime<Utc>) {
        self.title = f.title;
        self.category = f.category;
        self.location = f.location;
        self.year = f.year;
        self.image = f.image;
        self.images = f.images;
        self.video = f.video;
        self.description = f.description;
        self.services = f.services;
        self.highlights = f.highlights;
        self.stats = f.stats;
        self.client = f.client;
        self.budget = f.budget;
        self.updated_at = touch(self.created_at, now);
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
