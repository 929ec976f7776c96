//! Documentation of the Giya Furniture content API.
//!
//! # General Infrastructure
//! - One axum server, the admin panel and the public site both talk to it
//! - Reads are public, every write needs an admin session token
//! - Records live in the document store, uploaded media on local disk
//! - Uploaded media is served as static files from `/uploads`
//!
//!
//!
//! # Routes
//!
//! | Method | Path | Gate |
//! |---|---|---|
//! | `GET` | `/` | none |
//! | `POST` | `/api/auth/login` | none |
//! | `GET` | `/api/auth/verify` | token |
//! | `GET` | `/api/{products,projects,services,testimonials}[/:id]` | none |
//! | `POST` | `/api/{products,projects,services,testimonials}` | token + admin |
//! | `PUT`, `DELETE` | `/api/{products,projects,services,testimonials}/:id` | token + admin |
//! | `POST` | `/api/upload` | token + admin |
//! | `GET` | `/uploads/*` | none |
//!
//! Every error body is `{"error": "<message>"}`.
//!
//!
//!
//! # Notes
//!
//! ## Redis as the document store
//! Each collection is one Redis hash keyed by record id with the JSON record
//! as the value. Collections are small (a furniture catalogue, a portfolio)
//! so listing reads the whole hash and sorts in process.
//!
//! `DATABASE_URL=memory://` swaps in a process-local store. Nothing persists
//! across restarts with it, it exists for local work and tests.
//!
//!
//!
//! # Setup
//!
//! Seed the admin account once.
//! ```sh
//! cargo run -p giya-seed -- --email admin@giya.com --password giya@123
//! ```
//!
//! Run the server.
//! ```sh
//! RUST_LOG=info cargo run -p giya-backend
//! ```
//!
//! View current docs.
//! ```sh
//! cargo doc --open
//! ```
use std::{sync::Arc, time::Duration};

use axum::{
    Json, Router,
    http::{
        HeaderValue, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::get,
};
use serde_json::{Value, json};
use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod credentials;
pub mod database;
pub mod error;
pub mod media;
pub mod memory;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod state;

use config::Config;
use error::StartupError;
use models::{Product, Project, Service, Testimonial};
use routes::{auth, content, upload};
use state::AppState;

pub async fn start_server() -> Result<(), StartupError> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Loading config...");
    let config = Config::load()?;

    info!("Initializing state...");
    let state = AppState::new(config).await?;

    info!("Starting server...");
    let app = build_router(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutting down...");

    Ok(())
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .nest("/auth", auth::router(&state))
        .nest("/products", content::router::<Product>(&state))
        .nest("/projects", content::router::<Project>(&state))
        .nest("/services", content::router::<Service>(&state))
        .nest("/testimonials", content::router::<Testimonial>(&state))
        .nest("/upload", upload::router(&state));

    Router::new()
        .route("/", get(root_handler))
        .nest("/api", api)
        .nest_service(media::PUBLIC_PREFIX, ServeDir::new(&state.config.uploads_dir))
        .layer(cors_layer(&state.config.cors_origin))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root_handler() -> Json<Value> {
    Json(json!({ "message": "Giya Furniture API" }))
}

fn cors_layer(origin: &str) -> CorsLayer {
    let allow_origin = match origin {
        "*" => AllowOrigin::from(Any),
        exact => match HeaderValue::from_str(exact) {
            Ok(value) => AllowOrigin::exact(value),
            Err(_) => {
                warn!("CORS_ORIGIN {exact} is not a valid header value, allowing any origin");
                AllowOrigin::from(Any)
            }
        },
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
