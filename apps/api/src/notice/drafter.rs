//! Notice Drafting: pluggable, trait-based strategy for deriving contract facts and notice text.
//!
//! Default: `TemplateDrafter` (rule-based extraction + fixed letter template; pure-Rust,
//! deterministic, fully testable).
//! Alternative: `LlmDrafter` (text-completion model), which falls back to the template
//! path on any transport or parse failure so callers never see an error.
//!
//! `AppState` holds an `Arc<dyn NoticeDrafter>`, chosen at startup via `DRAFTING_BACKEND`.

use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Deserialize;
use tracing::{info, warn};

use crate::contract::models::{
    default_clauses, default_notice_requirements, ContractAnalysis, DEFAULT_NOTICE_WINDOW,
    MAX_RELEVANT_CLAUSES,
};
use crate::contract::{analyze_contract, Clause, ContractFacts, Extraction};
use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, PLAIN_TEXT_SYSTEM};
use crate::llm_client::{CallOptions, LlmClient};
use crate::notice::assembler::{assemble_notice, format_date, format_time};
use crate::notice::models::{DrafterBackend, NoticeContext, NoticeDocument};
use crate::notice::prompts::{
    CONTRACT_ANALYSIS_PROMPT_TEMPLATE, CONTRACT_ANALYSIS_SYSTEM, CONTRACT_TEXT_MAX_CHARS,
    DEFAULT_CONTRACT_INFORMATION, DEFAULT_PROMPT_DESCRIPTION, NOTICE_DRAFT_PROMPT_TEMPLATE,
    NOTICE_DRAFT_SYSTEM, PROMPT_CLAUSE_MAX_CHARS,
};

const CONTRACT_ANALYSIS_OPTIONS: CallOptions = CallOptions {
    temperature: 0.3,
    max_tokens: 4096,
};

const NOTICE_DRAFT_OPTIONS: CallOptions = CallOptions {
    temperature: 0.4,
    max_tokens: 1500,
};

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([a-z_]+)\}").expect("valid placeholder regex"));

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// The drafting strategy. Implement this to swap backends without touching
/// assembly, rendering, or handler code.
///
/// Implementations never fail: every error path degrades to a usable result.
#[async_trait]
pub trait NoticeDrafter: Send + Sync {
    fn backend(&self) -> DrafterBackend;

    /// Derives contract facts from extracted contract text.
    async fn extract_contract_facts(&self, contract_text: &str) -> Extraction<ContractFacts>;

    /// Writes the notice body for `ctx`.
    async fn draft_notice(&self, ctx: &NoticeContext) -> NoticeDocument;
}

/// Builds the drafter selected by configuration. `llm` is required for `Llm`;
/// without it the template drafter is used.
pub fn build_drafter(backend: DrafterBackend, llm: Option<LlmClient>) -> Arc<dyn NoticeDrafter> {
    match (backend, llm) {
        (DrafterBackend::Llm, Some(llm)) => Arc::new(LlmDrafter::new(llm)),
        (DrafterBackend::Llm, None) => {
            warn!("LLM drafting requested without a client; using template drafter");
            Arc::new(TemplateDrafter)
        }
        (DrafterBackend::Template, _) => Arc::new(TemplateDrafter),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// TemplateDrafter (default)
// ────────────────────────────────────────────────────────────────────────────

/// Rule-based contract extraction plus the fixed six-section letter.
pub struct TemplateDrafter;

#[async_trait]
impl NoticeDrafter for TemplateDrafter {
    fn backend(&self) -> DrafterBackend {
        DrafterBackend::Template
    }

    async fn extract_contract_facts(&self, contract_text: &str) -> Extraction<ContractFacts> {
        analyze_contract(contract_text).into_facts()
    }

    async fn draft_notice(&self, ctx: &NoticeContext) -> NoticeDocument {
        NoticeDocument {
            body_text: assemble_notice(ctx),
            issued_at: ctx.issued_at,
            backend: DrafterBackend::Template,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// LlmDrafter
// ────────────────────────────────────────────────────────────────────────────

/// Drafts via the text-completion model; degrades to `TemplateDrafter` on failure.
pub struct LlmDrafter {
    llm: LlmClient,
    fallback: TemplateDrafter,
}

impl LlmDrafter {
    pub fn new(llm: LlmClient) -> Self {
        Self {
            llm,
            fallback: TemplateDrafter,
        }
    }
}

#[async_trait]
impl NoticeDrafter for LlmDrafter {
    fn backend(&self) -> DrafterBackend {
        DrafterBackend::Llm
    }

    async fn extract_contract_facts(&self, contract_text: &str) -> Extraction<ContractFacts> {
        if contract_text.trim().is_empty() {
            // Nothing for the model to read; rules yield the full default record.
            return self.fallback.extract_contract_facts(contract_text).await;
        }

        let truncated: String = contract_text.chars().take(CONTRACT_TEXT_MAX_CHARS).collect();
        let prompt = CONTRACT_ANALYSIS_PROMPT_TEMPLATE.replace("{contract_text}", &truncated);
        let system = format!("{CONTRACT_ANALYSIS_SYSTEM}\n\n{JSON_ONLY_SYSTEM}");

        match self
            .llm
            .call_json::<CompletionFacts>(&prompt, &system, CONTRACT_ANALYSIS_OPTIONS)
            .await
        {
            Ok(raw) => {
                let facts = raw.into_analysis().into_facts();
                info!(extracted = facts.is_extracted(), "Contract facts returned by LLM");
                facts
            }
            Err(e) => {
                warn!("LLM contract analysis failed, falling back to rules: {e}");
                self.fallback.extract_contract_facts(contract_text).await
            }
        }
    }

    async fn draft_notice(&self, ctx: &NoticeContext) -> NoticeDocument {
        let prompt = build_draft_prompt(ctx);
        let system = format!("{NOTICE_DRAFT_SYSTEM}\n\n{PLAIN_TEXT_SYSTEM}");

        match self
            .llm
            .call_text(&prompt, &system, NOTICE_DRAFT_OPTIONS)
            .await
        {
            Ok(body_text) => NoticeDocument {
                body_text,
                issued_at: ctx.issued_at,
                backend: DrafterBackend::Llm,
            },
            Err(e) => {
                warn!("LLM notice drafting failed, falling back to template: {e}");
                self.fallback.draft_notice(ctx).await
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Completion payloads
// ────────────────────────────────────────────────────────────────────────────

/// Contract facts as returned by the model. Every field is optional; gaps are
/// filled with the same defaults the rules use.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CompletionFacts {
    #[serde(alias = "noticeWindow")]
    notice_window: Option<String>,
    #[serde(alias = "noticeRequirements")]
    notice_requirements: Option<Vec<String>>,
    #[serde(alias = "relevantClauses")]
    relevant_clauses: Option<Vec<Clause>>,
}

impl CompletionFacts {
    /// Tags each field `Extracted` when the model supplied a usable value and
    /// `Defaulted` when it was missing or empty.
    fn into_analysis(self) -> ContractAnalysis {
        let notice_window = self
            .notice_window
            .map(|w| w.trim().to_string())
            .filter(|w| !w.is_empty());

        let notice_requirements = self
            .notice_requirements
            .map(|reqs| {
                reqs.into_iter()
                    .map(|r| r.trim().to_string())
                    .filter(|r| !r.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|reqs| !reqs.is_empty());

        let relevant_clauses = self
            .relevant_clauses
            .filter(|clauses| !clauses.is_empty())
            .map(|mut clauses| {
                clauses.truncate(MAX_RELEVANT_CLAUSES);
                clauses
            });

        ContractAnalysis {
            notice_window: tag(notice_window, || DEFAULT_NOTICE_WINDOW.to_string()),
            notice_requirements: tag(notice_requirements, default_notice_requirements),
            relevant_clauses: tag(relevant_clauses, default_clauses),
        }
    }
}

fn tag<T>(value: Option<T>, default: impl FnOnce() -> T) -> Extraction<T> {
    match value {
        Some(v) => Extraction::Extracted(v),
        None => Extraction::Defaulted(default()),
    }
}

/// Substitutes `{name}` placeholders in a single pass, so text already
/// substituted is never scanned again. Unknown names are left as written.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            values
                .iter()
                .find(|(name, _)| *name == &caps[1])
                .map(|(_, value)| value.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn build_draft_prompt(ctx: &NoticeContext) -> String {
    let description = if ctx.note.is_empty() {
        DEFAULT_PROMPT_DESCRIPTION
    } else {
        ctx.note.as_str()
    };

    let contract_information = match &ctx.facts {
        Some(facts) => {
            let clauses = facts
                .relevant_clauses
                .iter()
                .map(|c| {
                    let excerpt: String = c.text.chars().take(PROMPT_CLAUSE_MAX_CHARS).collect();
                    format!("  * {} - {}: {}...", c.number, c.title, excerpt)
                })
                .collect::<Vec<_>>()
                .join("\n");
            format!(
                "- Notice Window: {}\n- Required Notice Elements: {}\n- Relevant Contract Clauses:\n{}",
                facts.notice_window,
                facts.notice_requirements.join(", "),
                clauses
            )
        }
        None => DEFAULT_CONTRACT_INFORMATION.to_string(),
    };

    let supporting_documentation = ctx
        .photos
        .iter()
        .enumerate()
        .map(|(i, photo)| {
            format!(
                "- Photo_{:02}.jpg – Field evidence captured {}",
                i + 1,
                photo.captured_at.format("%B %-d, %Y at %-I:%M %p")
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let date = format_date(&ctx.issued_at);
    let time = format_time(&ctx.issued_at);
    fill_template(
        NOTICE_DRAFT_PROMPT_TEMPLATE,
        &[
            ("project_name", ctx.project_name.as_str()),
            ("gc_name", ctx.gc_name.as_str()),
            ("date", date.as_str()),
            ("time", time.as_str()),
            ("description", description),
            ("contract_information", contract_information.as_str()),
            ("supporting_documentation", supporting_documentation.as_str()),
        ],
    )
}
