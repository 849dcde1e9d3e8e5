//! Axum route handlers for the Notice API: drafting, PDF download and mail hand-off.

use anyhow::anyhow;
use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::{Local, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::notice::delivery::{content_disposition, download_filename, mailto_href};
use crate::notice::models::{NoticeContext, NoticeDocument};
use crate::render::render_notice_pdf;
use crate::session::RenderInputs;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct MailtoResponse {
    pub href: String,
}

/// POST /api/v1/sessions/:id/notice
///
/// Drafts the notice from a snapshot of the session. The session stays
/// editable meanwhile; if it changes before drafting finishes, the result is
/// discarded and 409 is returned.
pub async fn handle_generate_notice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<NoticeDocument>, AppError> {
    let snapshot = state.sessions.begin_generation(id).await?;
    let issued_at = Local::now().naive_local();

    // Drafting runs detached so a dropped request still clears the in-flight flag.
    let drafter = state.drafter.clone();
    let sessions = state.sessions.clone();
    let task = tokio::spawn(async move {
        let ctx = NoticeContext {
            project_name: snapshot.project.project_name,
            gc_name: snapshot.project.gc_name,
            note: snapshot.project.note,
            photos: snapshot.photos,
            facts: Some(snapshot.facts),
            issued_at,
        };
        let document = drafter.draft_notice(&ctx).await;
        sessions
            .finish_generation(id, snapshot.revision, document)
            .await
    });

    match task.await {
        Ok(result) => {
            let document = result?;
            info!(
                session_id = %id,
                backend = document.backend.as_str(),
                length = document.body_text.len(),
                "Notice drafted"
            );
            Ok(Json(document))
        }
        Err(e) => {
            state.sessions.abort_generation(id).await;
            Err(AppError::Internal(anyhow!("Notice drafting task failed: {e}")))
        }
    }
}

/// GET /api/v1/sessions/:id/notice/pdf
///
/// Renders the drafted notice and the current photos. Not cached.
pub async fn handle_download_pdf(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let RenderInputs {
        project_name,
        document,
        photos,
    } = state.sessions.render_inputs(id).await?;

    let bytes = tokio::task::spawn_blocking(move || render_notice_pdf(&document.body_text, &photos))
        .await
        .map_err(|e| anyhow!("Render task panicked: {e}"))??;

    let filename = download_filename(&project_name, Utc::now().date_naive());
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                content_disposition(&filename),
            ),
        ],
        bytes,
    ))
}

/// GET /api/v1/sessions/:id/notice/mailto
pub async fn handle_mailto(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MailtoResponse>, AppError> {
    let project_name = state.sessions.notice_project_name(id).await?;
    Ok(Json(MailtoResponse {
        href: mailto_href(&project_name),
    }))
}
