#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use giya_server::{
    build_router,
    config::Config,
    credentials::hash_password,
    database::DocumentStore,
    memory::MemoryStore,
    models::user::ADMIN_ROLE,
    repository::UserRepository,
    state::AppState,
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::{TempDir, tempdir};
use tower::ServiceExt;

pub const ADMIN_EMAIL: &str = "admin@giya.com";
pub const ADMIN_PASSWORD: &str = "giya@123";

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::default()))
    }

    pub fn with_store(store: Arc<dyn DocumentStore>) -> Self {
        let dir = tempdir().unwrap();
        let config = Config::local(dir.path().join("uploads"));
        let state = AppState::with_store(config, store);

        Self {
            router: build_router(state.clone()),
            state,
            dir,
        }
    }

    pub async fn seed_admin(&self) {
        let hashed = hash_password(ADMIN_PASSWORD).unwrap();

        UserRepository::new(self.state.store.clone())
            .insert(ADMIN_EMAIL, hashed, ADMIN_ROLE)
            .await
            .unwrap();
    }

    pub fn token(&self, role: &str) -> String {
        self.state
            .credentials
            .issue("test-user", "someone@giya.com", role)
            .unwrap()
    }

    pub fn admin_token(&self) -> String {
        self.token(ADMIN_ROLE)
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| json!(String::from_utf8_lossy(&bytes)))
        };

        (status, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn write(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send(request).await
    }
}

pub fn product_payload(name: &str) -> Value {
    json!({
        "name": name,
        "category": "Tables",
        "price": "45000",
        "image": "/uploads/optimized-table.webp",
        "description": "Solid teak dining table",
        "features": ["Hand finished", "Seats six"],
    })
}

pub fn project_payload(title: &str) -> Value {
    json!({
        "title": title,
        "category": "Residential",
        "location": "Kochi",
        "year": 2023,
        "image": "/uploads/optimized-villa.webp",
        "description": "Full interior fit-out",
        "services": ["Interior design"],
        "highlights": ["Custom wardrobes"],
        "stats": {},
    })
}

pub fn service_payload(title: &str) -> Value {
    json!({
        "title": title,
        "icon": "ruler",
        "description": "Made to measure furniture",
        "features": ["Site visit"],
        "process": ["Measure", "Design", "Build"],
    })
}

pub fn testimonial_payload(name: &str) -> Value {
    json!({
        "name": name,
        "role": "Homeowner",
        "content": "Beautiful work, delivered on time.",
        "rating": 5,
    })
}

/// Valid create payload for `collection`, labelled with `label`.
pub fn payload_for(collection: &str, label: &str) -> Value {
    match collection {
        "products" => product_payload(label),
        "projects" => project_payload(label),
        "services" => service_payload(label),
        "testimonials" => testimonial_payload(label),
        other => panic!("unknown collection {other}"),
    }
}

/// Field that carries the label in each payload.
pub fn label_field(collection: &str) -> &'static str {
    match collection {
        "products" | "testimonials" => "name",
        _ => "title",
    }
}
