use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::{State, rejection::JsonRejection},
    middleware::from_fn_with_state,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::task::spawn_blocking;
use tracing::{error, info};

use crate::{
    credentials::{Claims, verify_login},
    error::AppError,
    middleware::authenticate_token,
    models::fields::optional_text,
    repository::UserRepository,
    state::AppState,
};

// Same answer for unknown email and wrong password.
const INVALID_CREDENTIALS: &str = "Invalid credentials";
const LOGIN_FAILED: &str = "Login failed";

pub fn router(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new().route("/login", post(login_handler)).route(
        "/verify",
        get(verify_handler).route_layer(from_fn_with_state(state.clone(), authenticate_token)),
    )
}

#[derive(Deserialize)]
pub struct LoginRequest {
    email: Option<String>,
    password: Option<String>,
}

#[derive(Serialize)]
pub struct SessionUser {
    id: String,
    email: String,
    role: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    user: SessionUser,
    token: String,
}

fn login_failed(cause: impl std::fmt::Display) -> AppError {
    error!(error = %cause, "Login failed");
    AppError::Internal(LOGIN_FAILED.to_string())
}

pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(request) = payload?;

    // Passwords are not trimmed, only checked for presence.
    let (Some(email), Some(password)) = (
        optional_text(request.email),
        request.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::Validation("Email and password are required".to_string()));
    };

    let user = UserRepository::new(state.store.clone())
        .find_by_email(&email)
        .await
        .map_err(login_failed)?;

    // Unknown emails still pay for a hash check.
    let hashed = user.as_ref().map(|user| user.password.clone());
    let matches = spawn_blocking(move || verify_login(&password, hashed.as_deref()))
        .await
        .map_err(login_failed)?;

    let user = match user {
        Some(user) if matches => user,
        _ => return Err(AppError::Unauthorized(INVALID_CREDENTIALS)),
    };

    let token = state
        .credentials
        .issue(&user.id, &user.email, &user.role)
        .map_err(login_failed)?;

    info!(user = %user.email, "Admin logged in");

    Ok(Json(LoginResponse {
        user: SessionUser {
            id: user.id,
            email: user.email,
            role: user.role,
        },
        token,
    }))
}

pub async fn verify_handler(Extension(claims): Extension<Claims>) -> Json<Value> {
    Json(json!({ "user": claims }))
}
