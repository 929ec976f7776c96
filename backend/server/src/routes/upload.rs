use std::{path::Path, sync::Arc};

use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Multipart, State,
        multipart::{Field, MultipartRejection},
    },
    middleware::{from_fn, from_fn_with_state},
    routing::post,
};
use serde::Serialize;
use tokio::{
    fs::{self, File},
    io::AsyncWriteExt,
    task::spawn_blocking,
};
use tracing::{error, info, warn};

use crate::{
    error::AppError,
    media::{MediaKind, optimize_image, public_url, upload_name},
    middleware::{authenticate_token, require_admin},
    state::AppState,
};

const NO_FILE: &str = "No file received";
const UPLOAD_FAILED: &str = "Failed to upload file";

/// `POST /`, admin only. One multipart field named `file`.
pub fn router(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(upload_handler))
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state.clone(), authenticate_token))
        .layer(DefaultBodyLimit::disable())
}

#[derive(Serialize)]
pub struct UploadResponse {
    url: String,
    message: &'static str,
    #[serde(rename = "type")]
    kind: MediaKind,
}

fn upload_failed(cause: impl std::fmt::Display) -> AppError {
    error!(error = %cause, "Upload failed");
    AppError::Internal(UPLOAD_FAILED.to_string())
}

pub async fn upload_handler(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let mut multipart = multipart.map_err(|e| {
        warn!(error = %e, "Rejected upload body");
        AppError::Validation(NO_FILE.to_string())
    })?;

    loop {
        let field = multipart.next_field().await.map_err(|e| {
            warn!(error = %e, "Malformed multipart body");
            AppError::Validation(NO_FILE.to_string())
        })?;

        match field {
            Some(field) if field.name() == Some("file") => return receive(&state, field).await,
            Some(_) => continue,
            None => return Err(AppError::Validation(NO_FILE.to_string())),
        }
    }
}

async fn receive(state: &AppState, mut field: Field<'_>) -> Result<Json<UploadResponse>, AppError> {
    let kind = field
        .content_type()
        .and_then(MediaKind::from_mime)
        .ok_or_else(|| AppError::Validation("Unsupported file type".to_string()))?;

    let uploads_dir = state.config.uploads_dir.clone();
    fs::create_dir_all(&uploads_dir).await.map_err(upload_failed)?;

    let file_name = upload_name(field.file_name());
    let path = uploads_dir.join(&file_name);

    if let Err(e) = write_field(&mut field, &path).await {
        discard(&path).await;
        return Err(e);
    }

    match kind {
        MediaKind::Video => {
            info!(file = %file_name, "Stored video upload");

            Ok(Json(UploadResponse {
                url: public_url(&file_name),
                message: "Video uploaded successfully",
                kind,
            }))
        }
        MediaKind::Image => {
            let source = path.clone();
            let optimized = spawn_blocking(move || optimize_image(&source, &uploads_dir))
                .await
                .map_err(upload_failed)
                .and_then(|result| result.map_err(upload_failed));

            let optimized = match optimized {
                Ok(name) => name,
                Err(e) => {
                    discard(&path).await;
                    return Err(e);
                }
            };

            info!(file = %optimized, "Stored optimized image");

            Ok(Json(UploadResponse {
                url: public_url(&optimized),
                message: "Image uploaded and optimized successfully",
                kind,
            }))
        }
    }
}

/// Streams the field to disk chunk by chunk.
async fn write_field(field: &mut Field<'_>, path: &Path) -> Result<(), AppError> {
    let mut file = File::create(path).await.map_err(upload_failed)?;

    while let Some(chunk) = field.chunk().await.map_err(upload_failed)? {
        file.write_all(&chunk).await.map_err(upload_failed)?;
    }

    file.flush().await.map_err(upload_failed)
}

async fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %path.display(), error = %e, "Failed to remove partial upload");
        }
    }
}
