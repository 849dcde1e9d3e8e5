use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::contract::ContractFacts;
use crate::models::photo::EvidencePhoto;

/// Which drafting strategy produced a notice or a set of contract facts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrafterBackend {
    /// Rule-based extraction and the fixed letter template.
    Template,
    /// Text-completion model.
    Llm,
}

impl DrafterBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            DrafterBackend::Template => "template",
            DrafterBackend::Llm => "llm",
        }
    }
}

/// Everything a drafter needs to write one notice.
///
/// `issued_at` stamps the header and discovery lines; it is an input so that
/// template drafting is a pure function of this struct.
#[derive(Debug, Clone)]
pub struct NoticeContext {
    pub project_name: String,
    pub gc_name: String,
    pub note: String,
    pub photos: Vec<EvidencePhoto>,
    pub facts: Option<ContractFacts>,
    pub issued_at: NaiveDateTime,
}

/// A fully rendered plain-text notice. Immutable once drafted.
#[derive(Debug, Clone, Serialize)]
pub struct NoticeDocument {
    pub body_text: String,
    pub issued_at: NaiveDateTime,
    pub backend: DrafterBackend,
}
