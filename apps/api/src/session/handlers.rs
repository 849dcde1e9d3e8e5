//! Axum route handlers for the Session API: lifecycle, project details and photos.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use chrono::Local;
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::photo::{EvidencePhoto, PhotoFormat, PhotoSummary};
use crate::session::models::PhotoUploadOutcome;
use crate::session::{ProjectInfo, SessionSummary};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct PhotoListResponse {
    pub photos: Vec<PhotoSummary>,
}

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<CreateSessionResponse>) {
    let summary = state.sessions.create(Local::now().naive_local()).await;
    (
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            session_id: summary.session_id,
        }),
    )
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSummary>, AppError> {
    Ok(Json(state.sessions.summary(id).await?))
}

/// DELETE /api/v1/sessions/:id
///
/// Starts over: the session, its uploads and any drafted notice are discarded.
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/sessions/:id/project
pub async fn handle_update_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(project): Json<ProjectInfo>,
) -> Result<Json<SessionSummary>, AppError> {
    Ok(Json(state.sessions.update_project(id, project).await?))
}

/// POST /api/v1/sessions/:id/photos
///
/// Every multipart part carrying a file is treated as a photo. Photos beyond
/// the five-photo limit are dropped and counted in the response.
pub async fn handle_upload_photos(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<PhotoUploadOutcome>, AppError> {
    // Fail fast on unknown sessions before buffering any image data.
    state.sessions.summary(id).await?;

    let captured_at = Local::now().naive_local();
    let mut photos = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        let content_type = field.content_type().map(str::to_string);
        let Some(file_name) = field
            .file_name()
            .map(str::to_string)
            .or_else(|| is_image(content_type.as_deref()).then(|| "photo".to_string()))
        else {
            continue;
        };

        let data = field.bytes().await?;
        if data.is_empty() {
            warn!("Skipping empty photo part '{file_name}'");
            continue;
        }
        let format = PhotoFormat::detect(content_type.as_deref(), Some(&file_name));
        photos.push(EvidencePhoto::new(file_name, format, data, captured_at));
    }

    if photos.is_empty() {
        return Err(AppError::Validation(
            "at least one image file is required".to_string(),
        ));
    }

    Ok(Json(state.sessions.add_photos(id, photos).await?))
}

/// DELETE /api/v1/sessions/:id/photos/:index
pub async fn handle_remove_photo(
    State(state): State<AppState>,
    Path((id, index)): Path<(Uuid, usize)>,
) -> Result<Json<PhotoListResponse>, AppError> {
    let photos = state.sessions.remove_photo(id, index).await?;
    Ok(Json(PhotoListResponse { photos }))
}

fn is_image(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| ct.starts_with("image/"))
}
