//! Notice Assembler: renders the fixed six-section change order notice.
//!
//! Pure string templating: identical inputs (including timestamps) always yield
//! byte-identical text. No input validation happens here; blank-field policy
//! belongs to the caller.

use chrono::NaiveDateTime;

use crate::contract::ContractFacts;
use crate::models::photo::EvidencePhoto;
use crate::notice::models::NoticeContext;

pub const NOTICE_TITLE: &str = "CHANGE ORDER NOTICE";

/// Section divider: 68 heavy horizontal box-drawing characters.
pub const DIVIDER: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

pub const DEFAULT_NOTE: &str = "Field conditions differ from contract documents, requiring \
    additional work and/or materials not included in the original scope.";

/// Clause text quoted in the contract reference block is cut to this many characters.
const CLAUSE_QUOTE_MAX_CHARS: usize = 200;

const DATE_FORMAT: &str = "%B %-d, %Y";
const TIME_FORMAT: &str = "%-I:%M %p";
const EVIDENCE_TIMESTAMP_FORMAT: &str = "%B %-d, %Y - %-I:%M:%S %p";

const DEFAULT_CONTRACT_REFERENCES: &str = r#"Relevant Contract Provisions:

Section 7.3 - Change Orders
"Subcontractor shall provide written notice of any changes in scope, unforeseen conditions, or additional work within the time specified in the contract."

Section 7.3.1 - Notice Requirements
"Written notice must include: (a) description of the change or condition; (b) date of discovery; (c) photographic evidence; (d) estimated impact on schedule and cost."

Notice Requirements Met:
  1. Written notice to General Contractor
  2. Description of the change or condition
  3. Date and time of discovery
  4. Photographic evidence where applicable
  5. Request for direction or change order"#;

// ────────────────────────────────────────────────────────────────────────────
// Public API
// ────────────────────────────────────────────────────────────────────────────

/// Renders the complete notice text for `ctx`.
pub fn assemble_notice(ctx: &NoticeContext) -> String {
    let date = format_date(&ctx.issued_at);
    let time = format_time(&ctx.issued_at);

    let note = if ctx.note.is_empty() {
        DEFAULT_NOTE
    } else {
        ctx.note.as_str()
    };

    let compliance_line = ctx
        .facts
        .as_ref()
        .map(|facts| {
            let sections = facts
                .relevant_clauses
                .iter()
                .map(|c| format!("Section {}", c.number))
                .collect::<Vec<_>>()
                .join(", ");
            format!("This notice complies with {sections} of the Contract.")
        })
        .unwrap_or_default();

    let contract_references = match &ctx.facts {
        Some(facts) => contract_references(facts),
        None => DEFAULT_CONTRACT_REFERENCES.to_string(),
    };

    let timeframe_line = match &ctx.facts {
        Some(facts) if !facts.notice_window.is_empty() => format!(
            "This notice is submitted within the {} requirement specified in the Contract.",
            facts.notice_window
        ),
        _ => "This notice is submitted within the contractually required timeframe.".to_string(),
    };

    let notice = format!(
        "
{NOTICE_TITLE}

Date: {date}
Time: {time}
Project: {project}
To: {gc}
From: [Subcontractor Name - Electrical]

RE: NOTICE OF CHANGED CONDITION / REQUEST FOR DIRECTION

{DIVIDER}

1. PURPOSE OF NOTICE

This notice is submitted in accordance with the Contract requirements to preserve our rights to compensation and time extension for changed conditions encountered in the field.

{compliance_line}

2. DESCRIPTION OF CHANGE

{note}

Discovery Date: {date}
Discovery Time: {time}

3. FIELD EVIDENCE

{photo_count} photograph(s) attached documenting the condition.

Evidence timestamps:
{evidence_lines}

All photographic evidence was captured at the time of discovery and is submitted as part of this notice.

4. CONTRACT REFERENCE

{contract_references}

5. REQUEST FOR DIRECTION

We respectfully request:

  a) Acknowledgment of receipt of this notice
  b) Direction on how to proceed with the changed condition
  c) Authorization to proceed with additional work, if required
  d) Discussion of schedule and cost impacts

6. RESERVATION OF RIGHTS

This notice is submitted to preserve our rights under the Contract. We reserve the right to submit a detailed cost and schedule impact analysis upon receipt of direction.

{timeframe_line}

{DIVIDER}

ATTACHMENTS:
{attachment_lines}

This notice is submitted in good faith and in accordance with the Contract requirements.
",
        project = ctx.project_name,
        gc = ctx.gc_name,
        photo_count = ctx.photos.len(),
        evidence_lines = evidence_lines(&ctx.photos),
        attachment_lines = attachment_lines(&ctx.photos),
    );

    notice.trim().to_string()
}

pub fn format_date(at: &NaiveDateTime) -> String {
    at.format(DATE_FORMAT).to_string()
}

pub fn format_time(at: &NaiveDateTime) -> String {
    at.format(TIME_FORMAT).to_string()
}

// ────────────────────────────────────────────────────────────────────────────
// Section builders
// ────────────────────────────────────────────────────────────────────────────

fn evidence_lines(photos: &[EvidencePhoto]) -> String {
    photos
        .iter()
        .enumerate()
        .map(|(i, photo)| {
            format!(
                "  Photo {}: {}",
                i + 1,
                photo.captured_at.format(EVIDENCE_TIMESTAMP_FORMAT)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn attachment_lines(photos: &[EvidencePhoto]) -> String {
    (1..=photos.len())
        .map(|i| format!("  - Photo {i}: Field Evidence"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn contract_references(facts: &ContractFacts) -> String {
    let mut references = String::from("Relevant Contract Provisions:\n\n");

    for clause in &facts.relevant_clauses {
        references.push_str(&format!("Section {} - {}\n", clause.number, clause.title));
        let quoted: String = clause.text.chars().take(CLAUSE_QUOTE_MAX_CHARS).collect();
        let ellipsis = if clause.text.chars().count() > CLAUSE_QUOTE_MAX_CHARS {
            "..."
        } else {
            ""
        };
        references.push_str(&format!("\"{quoted}{ellipsis}\"\n\n"));
    }

    if !facts.notice_requirements.is_empty() {
        references.push_str("Notice Requirements Met:\n");
        for (i, requirement) in facts.notice_requirements.iter().enumerate() {
            references.push_str(&format!("  {}. {}\n", i + 1, requirement));
        }
    }

    references.trim().to_string()
}
