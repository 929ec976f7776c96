use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    Attributes, Entity, ValidationError,
    fields::{attributes, display_text, draft, list, optional_text, required_list, required_text},
    touch,
};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Availability {
    #[default]
    InStock,
    OutOfStock,
    PreOrder,
}

impl FromStr for Availability {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "in-stock" => Ok(Availability::InStock),
            "out-of-stock" => Ok(Availability::OutOfStock),
            "pre-order" => Ok(Availability::PreOrder),
            other => Err(ValidationError::Invalid(format!(
                "Invalid availability '{other}', expected in-stock, out-of-stock or pre-order"
            ))),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub category: String,
    pub price: String,
    pub image: String,
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
    pub description: String,
    pub features: Vec<String>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub availability: Availability,
    pub specifications: Attributes,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct ProductDraft {
    name: Option<String>,
    category: Option<String>,
    price: Option<Value>,
    image: Option<String>,
    images: Option<Vec<String>>,
    video: Option<String>,
    description: Option<String>,
    features: Option<Vec<String>>,
    sizes: Option<Vec<String>>,
    colors: Option<Vec<String>>,
    availability: Option<String>,
    specifications: Option<Attributes>,
}

#[derive(Debug, Clone)]
pub struct ProductFields {
    pub name: String,
    pub category: String,
    pub price: String,
    pub image: String,
    pub images: Vec<String>,
    pub video: Option<String>,
    pub description: String,
    pub features: Vec<String>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub availability: Availability,
    pub specifications: Attributes,
}

impl Entity for Product {
    const COLLECTION: &'static str = "products";
    const NAME: &'static str = "Product";

    type Fields = ProductFields;

    fn validate(payload: Value) -> Result<ProductFields, ValidationError> {
        let d: ProductDraft = draft(payload)?;

        let availability = match optional_text(d.availability) {
            Some(value) => value.parse()?,
            None => Availability::default(),
        };

        Ok(ProductFields {
            name: required_text(d.name)?,
            category: required_text(d.category)?,
            price: display_text(d.price, "price")?,
            image: required_text(d.image)?,
            images: list(d.images),
            video: optional_text(d.video),
            description: required_text(d.description)?,
            features: required_list(d.features)?,
            sizes: list(d.sizes),
            colors: list(d.colors),
            availability,
            specifications: attributes(d.specifications),
        })
    }

    fn create(id: String, f: ProductFields, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: f.name,
            category: f.category,
            price: f.price,
            image: f.image,
            images: f.images,
            video: f.video,
            description: f.description,
            features: f.features,
            sizes: f.sizes,
            colors: f.colors,
            availability: f.availability,
            specifications: f.specifications,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, f: ProductFields, now: DateTime<Utc>) {
        self.name = f.name;
        self.category = f.category;
        self.price = f.price;
        self.image = f.image;
        self.images = f.images;
        self.video = f.video;
        self.description = f.description;
        self.features = f.features;
        self.sizes = f.sizes;
        self.colors = f.colors;
        self.availability = f.availability;
        self.specifications = f.specifications;
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

    fn payload() -> Value {
        json!({
            "name": "Teak Dining Table",
            "category": "Dining",
            "price": "₹85,000",
            "image": "/uploads/optimized-table.webp",
            "description": "Six-seater in solid teak.",
            "features": ["Solid teak", "Hand polished"],
        })
    }

    #[test]
    fn test_defaults() {
        let fields = Product::validate(payload()).unwrap();

        assert_eq!(fields.availability, Availability::InStock);
        assert!(fields.images.is_empty());
        assert!(fields.sizes.is_empty());
        assert!(fields.colors.is_empty());
        assert!(fields.specifications.is_empty());
        assert_eq!(fields.video, None);
    }

    #[test]
    fn test_availability_values() {
        for (raw, expected) in [
            ("in-stock", Availability::InStock),
            ("out-of-stock", Availability::OutOfStock),
            ("pre-order", Availability::PreOrder),
        ] {
            let mut body = payload();
            body["availability"] = json!(raw);
            assert_eq!(Product::validate(body).unwrap().availability, expected);
        }

        let mut body = payload();
        body["availability"] = json!("discontinued");
        assert!(matches!(Product::validate(body), Err(ValidationError::Invalid(_))));
    }

    #[test]
    fn test_features_must_be_a_list() {
        let mut body = payload();
        body["features"] = json!("Solid teak");
        assert!(matches!(Product::validate(body), Err(ValidationError::Invalid(_))));

        let mut body = payload();
        body.as_object_mut().unwrap().remove("features");
        assert_eq!(Product::validate(body).unwrap_err(), ValidationError::MissingFields);
    }

    #[test]
    fn test_specifications_keep_order() {
        let mut body = payload();
        body["specifications"] = json!({ "Width": "180 cm", "Depth": "90 cm", "Height": "76 cm" });

        let fields = Product::validate(body).unwrap();
        let keys: Vec<_> = fields.specifications.keys().cloned().collect();

        assert_eq!(keys, ["Width", "Depth", "Height"]);
    }

    #[test]
    fn test_serialized_shape() {
        let now = Utc::now();
        let product = Product::create("p1".into(), Product::validate(payload()).unwrap(), now);
        let value = serde_json::to_value(&product).unwrap();

        assert_eq!(value["_id"], "p1");
        assert_eq!(value["availability"], "in-stock");
        assert!(value.get("createdAt").is_some());
        assert!(value.get("updatedAt").is_some());
        assert!(value.get("video").is_none());
    }

    #[test]
    fn test_apply_refreshes_updated_at() {
        let created = Utc::now();
        let fields = Product::validate(payload()).unwrap();
        let mut product = Product::create("p1".into(), fields, created);

        let later = created + chrono::Duration::seconds(5);
        product.apply(Product::validate(payload()).unwrap(), later);
        assert_eq!(product.updated_at, later);

        let earlier = created - chrono::Duration::seconds(5);
        product.apply(Product::validate(payload()).unwrap(), earlier);
        assert_eq!(product.updated_at, created);
    }
}
