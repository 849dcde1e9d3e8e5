use serde::{Deserialize, Serialize};

/// Maximum number of clauses carried in a `ContractFacts` record.
pub const MAX_RELEVANT_CLAUSES: usize = 3;

/// Timing phrase used whenever the contract does not state one.
pub const DEFAULT_NOTICE_WINDOW: &str = "48 hours";

/// Required notice elements used whenever the contract does not list any.
pub const DEFAULT_NOTICE_REQUIREMENTS: [&str; 5] = [
    "Written notice to General Contractor",
    "Description of the change or condition",
    "Date and time of discovery",
    "Photographic evidence where applicable",
    "Request for direction or change order",
];

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// A numbered contract provision relevant to change-order notice obligations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clause {
    pub number: String,
    pub title: String,
    pub text: String,
}

/// Structured facts derived from a contract. Immutable once produced.
///
/// Invariants: `notice_window` is non-empty, `notice_requirements` is non-empty,
/// `relevant_clauses` holds between 1 and `MAX_RELEVANT_CLAUSES` entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractFacts {
    pub notice_window: String,
    pub notice_requirements: Vec<String>,
    pub relevant_clauses: Vec<Clause>,
}

impl Default for ContractFacts {
    fn default() -> Self {
        Self {
            notice_window: DEFAULT_NOTICE_WINDOW.to_string(),
            notice_requirements: default_notice_requirements(),
            relevant_clauses: default_clauses(),
        }
    }
}

/// Outcome of a best-effort extraction.
///
/// `Extracted` carries a value found in the source text; `Defaulted` carries the
/// canned fallback substituted because nothing matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", content = "value", rename_all = "snake_case")]
pub enum Extraction<T> {
    Extracted(T),
    Defaulted(T),
}

impl<T> Extraction<T> {
    pub fn is_extracted(&self) -> bool {
        matches!(self, Extraction::Extracted(_))
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self, Extraction::Defaulted(_))
    }

    pub fn value(&self) -> &T {
        match self {
            Extraction::Extracted(v) | Extraction::Defaulted(v) => v,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Extraction::Extracted(v) | Extraction::Defaulted(v) => v,
        }
    }
}

/// Per-field result of running the contract rules over a text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractAnalysis {
    pub notice_window: Extraction<String>,
    pub notice_requirements: Extraction<Vec<String>>,
    pub relevant_clauses: Extraction<Vec<Clause>>,
}

impl ContractAnalysis {
    /// True when at least one field came from the contract text itself.
    pub fn any_extracted(&self) -> bool {
        self.notice_window.is_extracted()
            || self.notice_requirements.is_extracted()
            || self.relevant_clauses.is_extracted()
    }

    /// Collapses the per-field tags into a single tagged `ContractFacts`.
    ///
    /// The record is `Extracted` if any field was; fully-defaulted records stay `Defaulted`.
    pub fn into_facts(self) -> Extraction<ContractFacts> {
        let extracted = self.any_extracted();
        let facts = ContractFacts {
            notice_window: self.notice_window.into_inner(),
            notice_requirements: self.notice_requirements.into_inner(),
            relevant_clauses: self.relevant_clauses.into_inner(),
        };
        if extracted {
            Extraction::Extracted(facts)
        } else {
            Extraction::Defaulted(facts)
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Defaults
// ────────────────────────────────────────────────────────────────────────────

pub fn default_notice_requirements() -> Vec<String> {
    DEFAULT_NOTICE_REQUIREMENTS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// The general change-order clause and the notice-requirements clause.
pub fn default_clauses() -> Vec<Clause> {
    vec![
        Clause {
            number: "7.3".to_string(),
            title: "Change Orders".to_string(),
            text: "Subcontractor shall provide written notice of any changes in scope, \
                   unforeseen conditions, or additional work within the time specified in \
                   the contract. Failure to provide timely notice may result in waiver of claims."
                .to_string(),
        },
        Clause {
            number: "7.3.1".to_string(),
            title: "Notice Requirements".to_string(),
            text: "Written notice must include: (a) description of the change or condition; \
                   (b) date of discovery; (c) photographic evidence; (d) estimated impact on \
                   schedule and cost; (e) request for direction."
                .to_string(),
        },
    ]
}
