use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    Entity, ValidationError,
    fields::{draft, required_list, required_text},
    touch,
};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    /// Short label or emoji.
    pub icon: String,
    pub description: String,
    pub features: Vec<String>,
    /// Ordered steps.
    pub process: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct ServiceDraft {
    title: Option<String>,
    icon: Option<String>,
    description: Option<String>,
    features: Option<Vec<String>>,
    process: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct ServiceFields {
    pub title: String,
    pub icon: String,
    pub description: String,
    pub features: Vec<String>,
    pub process: Vec<String>,
}

impl Entity for Service {
    const COLLECTION: &'static str = "services";
    const NAME: &'static str = "Service";

    type Fields = ServiceFields;

    fn validate(payload: Value) -> Result<ServiceFields, ValidationError> {
        let d: ServiceDraft = draft(payload)?;

        Ok(ServiceFields {
            title: required_text(d.title)?,
            icon: required_text(d.icon)?,
            description: required_text(d.description)?,
            features: required_list(d.features)?,
            process: required_list(d.process)?,
        })
    }

    fn create(id: String, f: ServiceFields, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: f.title,
            icon: f.icon,
            description: f.description,
            features: f.features,
            process: f.process,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, f: ServiceFields, now: DateTime<Utc>) {
        self.title = f.title;
        self.icon = f.icon;
        self.description = f.description;
        self.features = f.features;
        self.process = f.process;
        self.updated_at = touch(self.created_at, now);
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_process_order_is_kept() {
        let fields = Service::validate(json!({
            "title": "Custom Design",
            "icon": "🪑",
            "description": "Made to measure.",
            "features": ["3D renders"],
            "process": ["Consult", "Design", "Build", "Deliver"],
        }))
        .unwrap();

        assert_eq!(fields.process, ["Consult", "Design", "Build", "Deliver"]);
    }

    #[test]
    fn test_missing_process() {
        let err = Service::validate(json!({
            "title": "Custom Design",
            "icon": "🪑",
            "description": "Made to measure.",
            "features": ["3D renders"],
        }))
        .unwrap_err();

        assert_eq!(err, ValidationError::MissingFields);
    }
}
