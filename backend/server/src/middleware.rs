//! # Authorization
//!
//! Two gates applied per route, never globally:
//!
//! 1. `authenticate_token` reads `Authorization: Bearer <token>`, verifies it
//!    and attaches the decoded [`Claims`] to the request. Missing, invalid or
//!    expired tokens stop here with 401.
//! 2. `require_admin` runs after the first gate and stops anything whose
//!    role is not `admin` with 403.
//!
//! Handlers read the session with `Extension<Claims>`.
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::{credentials::Claims, error::AppError, models::user::ADMIN_ROLE, state::AppState};

const TOKEN_REQUIRED: &str = "Access token required";
const TOKEN_INVALID: &str = "Invalid or expired token";

pub fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

pub async fn authenticate_token(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request).ok_or(AppError::Unauthorized(TOKEN_REQUIRED))?;

    let claims = state.credentials.authenticate(token).map_err(|e| {
        debug!(error = %e, "Rejected token");
        AppError::Unauthorized(TOKEN_INVALID)
    })?;

    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

pub async fn require_admin(request: Request, next: Next) -> Result<Response, AppError> {
    let is_admin = request
        .extensions()
        .get::<Claims>()
        .map(|claims| claims.role == ADMIN_ROLE);

    match is_admin {
        None => Err(AppError::Unauthorized(TOKEN_REQUIRED)),
        Some(false) => Err(AppError::Forbidden),
        Some(true) => Ok(next.run(request).await),
    }
}
