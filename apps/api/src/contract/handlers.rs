//! Axum route handler for contract upload.

use anyhow::anyhow;
use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use chrono::Local;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::contract::{extract_contract_text, ContractFacts, Extraction};
use crate::errors::AppError;
use crate::session::ContractUpload;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ContractUploadResponse {
    pub file_name: String,
    /// `{"source": "extracted" | "defaulted", "value": {...}}`
    pub facts: Extraction<ContractFacts>,
    pub text_length: usize,
}

/// POST /api/v1/sessions/:id/contract
///
/// Reads the `file` part, extracts its text and derives contract facts.
/// An unreadable PDF never fails the request: it yields the default facts.
pub async fn handle_upload_contract(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<ContractUploadResponse>, AppError> {
    state.sessions.summary(id).await?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            let file_name = field.file_name().unwrap_or("contract.pdf").to_string();
            upload = Some((file_name, field.bytes().await?));
            break;
        }
    }
    let (file_name, data) = upload
        .ok_or_else(|| AppError::Validation("multipart field 'file' is required".to_string()))?;
    if data.is_empty() {
        return Err(AppError::Validation("contract file is empty".to_string()));
    }

    let full_text = tokio::task::spawn_blocking(move || extract_contract_text(&data))
        .await
        .map_err(|e| anyhow!("Contract extraction task panicked: {e}"))?
        .unwrap_or_else(|e| {
            warn!("Contract '{file_name}' unreadable, using default facts: {e}");
            String::new()
        });

    let facts = state.drafter.extract_contract_facts(&full_text).await;
    info!(
        session_id = %id,
        text_length = full_text.len(),
        extracted = facts.is_extracted(),
        backend = state.drafter.backend().as_str(),
        "Contract analyzed"
    );

    let response = ContractUploadResponse {
        file_name: file_name.clone(),
        facts: facts.clone(),
        text_length: full_text.chars().count(),
    };
    state
        .sessions
        .set_contract(
            id,
            ContractUpload {
                file_name,
                full_text,
                facts_extracted: facts.is_extracted(),
                facts: facts.into_inner(),
                uploaded_at: Local::now().naive_local(),
            },
        )
        .await?;

    Ok(Json(response))
}
