use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use uuid::Uuid;

use crate::contract::ContractFacts;
use crate::models::photo::{EvidencePhoto, PhotoSet, PhotoSummary};
use crate::notice::models::NoticeDocument;

/// Project metadata typed into the form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub project_name: String,
    pub gc_name: String,
    #[serde(default)]
    pub note: String,
}

impl ProjectInfo {
    /// Names are stored trimmed; the note keeps its inner formatting.
    pub fn normalized(self) -> Self {
        Self {
            project_name: self.project_name.trim().to_string(),
            gc_name: self.gc_name.trim().to_string(),
            note: self.note.trim().to_string(),
        }
    }
}

/// An uploaded contract and the facts derived from it.
#[derive(Debug, Clone)]
pub struct ContractUpload {
    pub file_name: String,
    pub full_text: String,
    pub facts: ContractFacts,
    /// False when every field fell back to its default.
    pub facts_extracted: bool,
    pub uploaded_at: NaiveDateTime,
}

/// A drafted notice together with the input revision it was drafted from.
#[derive(Debug, Clone)]
pub struct DraftedNotice {
    pub document: NoticeDocument,
    pub revision: u64,
}

/// All state for one notice being prepared. Lives in memory only.
#[derive(Debug, Clone)]
pub struct NoticeSession {
    pub id: Uuid,
    pub project: ProjectInfo,
    pub photos: PhotoSet,
    pub contract: Option<ContractUpload>,
    pub notice: Option<DraftedNotice>,
    /// Bumped on every change to the drafting inputs.
    pub revision: u64,
    /// Set while a generation is in flight.
    pub generating: bool,
    pub created_at: NaiveDateTime,
    /// Last access through the store.
    pub touched_at: Instant,
}

impl NoticeSession {
    pub fn new(created_at: NaiveDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            project: ProjectInfo::default(),
            photos: PhotoSet::default(),
            contract: None,
            notice: None,
            revision: 0,
            generating: false,
            created_at,
            touched_at: Instant::now(),
        }
    }

    pub fn bump_revision(&mut self) {
        self.revision += 1;
    }

    /// Reasons generation cannot start, in form order. Empty when ready.
    /// The contract is optional: without one the default facts are used.
    pub fn missing_inputs(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.project.project_name.is_empty() {
            missing.push("project name");
        }
        if self.project.gc_name.is_empty() {
            missing.push("GC name");
        }
        if self.photos.is_empty() {
            missing.push("at least one photo");
        }
        missing
    }

    /// Facts used for drafting: the uploaded contract's, or the defaults.
    pub fn drafting_facts(&self) -> ContractFacts {
        self.contract
            .as_ref()
            .map(|c| c.facts.clone())
            .unwrap_or_default()
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            session_id: self.id,
            project: self.project.clone(),
            photos: self.photos.summaries(),
            contract: self.contract.as_ref().map(|c| ContractSummary {
                file_name: c.file_name.clone(),
                facts: c.facts.clone(),
                facts_extracted: c.facts_extracted,
                text_length: c.full_text.chars().count(),
            }),
            notice: self.notice.as_ref().map(|n| NoticeSummary {
                body_text: n.document.body_text.clone(),
                issued_at: n.document.issued_at,
                backend: n.document.backend,
                stale: n.revision != self.revision,
            }),
            revision: self.revision,
            generating: self.generating,
            created_at: self.created_at,
        }
    }
}

/// Inputs captured when a generation starts. Drafting runs on this copy
/// while the session stays editable.
#[derive(Debug, Clone)]
pub struct GenerationSnapshot {
    pub revision: u64,
    pub project: ProjectInfo,
    pub photos: Vec<EvidencePhoto>,
    pub facts: ContractFacts,
}

// ────────────────────────────────────────────────────────────────────────────
// Response views
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub project: ProjectInfo,
    pub photos: Vec<PhotoSummary>,
    pub contract: Option<ContractSummary>,
    pub notice: Option<NoticeSummary>,
    pub revision: u64,
    pub generating: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContractSummary {
    pub file_name: String,
    pub facts: ContractFacts,
    pub facts_extracted: bool,
    pub text_length: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct NoticeSummary {
    pub body_text: String,
    pub issued_at: NaiveDateTime,
    pub backend: crate::notice::models::DrafterBackend,
    /// True when inputs changed after this notice was drafted.
    pub stale: bool,
}

/// Result of a photo upload batch.
#[derive(Debug, Clone, Serialize)]
pub struct PhotoUploadOutcome {
    pub accepted: usize,
    /// Photos beyond the five-photo limit, not stored.
    pub dropped: usize,
    pub photos: Vec<PhotoSummary>,
}
