use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
};
use serde_json::{Value, json};
use tracing::error;

use crate::{
    error::AppError,
    middleware::{authenticate_token, require_admin},
    models::Entity,
    repository::{Repository, RepositoryError},
    state::AppState,
};

/// `GET /`, `GET /:id` public; `POST /`, `PUT /:id`, `DELETE /:id` admin only.
pub fn router<E: Entity>(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    let public = Router::new()
        .route("/", get(list::<E>))
        .route("/:id", get(fetch::<E>));

    let admin = Router::new()
        .route("/", post(create::<E>))
        .route("/:id", put(update::<E>).delete(remove::<E>))
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state.clone(), authenticate_token));

    public.merge(admin)
}

fn singular<E: Entity>() -> String {
    E::NAME.to_lowercase()
}

/// Maps a repository failure to the client. Internal causes are logged, never sent.
fn reject<E: Entity>(err: RepositoryError, action: &str) -> AppError {
    match err {
        RepositoryError::NotFound => AppError::NotFound(format!("{} not found", E::NAME)),
        other => {
            error!(collection = E::COLLECTION, error = %other, "Failed to {action}");
            AppError::Internal(format!("Failed to {action}"))
        }
    }
}

async fn list<E: Entity>(State(state): State<Arc<AppState>>) -> Result<Json<Vec<E>>, AppError> {
    let records = Repository::<E>::new(state.store.clone())
        .list_all()
        .await
        .map_err(|e| reject::<E>(e, &format!("fetch {}", E::COLLECTION)))?;

    Ok(Json(records))
}

async fn fetch<E: Entity>(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<E>, AppError> {
    let record = Repository::<E>::new(state.store.clone())
        .get_by_id(&id)
        .await
        .map_err(|e| reject::<E>(e, &format!("fetch {}", singular::<E>())))?;

    Ok(Json(record))
}

async fn create<E: Entity>(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<E>), AppError> {
    let Json(payload) = payload?;
    let fields = E::validate(payload)?;

    let record = Repository::<E>::new(state.store.clone())
        .create(fields)
        .await
        .map_err(|e| reject::<E>(e, &format!("create {}", singular::<E>())))?;

    Ok((StatusCode::CREATED, Json(record)))
}

async fn update<E: Entity>(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<E>, AppError> {
    let Json(payload) = payload?;
    let fields = E::validate(payload)?;

    let record = Repository::<E>::new(state.store.clone())
        .update(&id, fields)
        .await
        .map_err(|e| reject::<E>(e, &format!("update {}", singular::<E>())))?;

    Ok(Json(record))
}

async fn remove<E: Entity>(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    Repository::<E>::new(state.store.clone())
        .delete(&id)
        .await
        .map_err(|e| reject::<E>(e, &format!("delete {}", singular::<E>())))?;

    Ok(Json(json!({ "message": format!("{} deleted successfully", E::NAME) })))
}
