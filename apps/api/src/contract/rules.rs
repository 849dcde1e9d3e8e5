//! Contract Rules: pattern-based extraction of notice obligations from contract text.
//!
//! Three independent rules, each with its own fallback:
//! - notice window: first match of three timing phrasings, else "48 hours"
//! - notice requirements: list items under a "notice ... requirements:" heading
//! - relevant clauses: "Section/Article/Clause <n>" headers naming changes or notice
//!
//! Every rule returns an `Extraction`, so callers can tell a confident match from
//! a substituted default. No rule can fail; empty or garbage input yields defaults.
//!
//! Known limitation: clause headers must use the exact `(Section|Article|Clause) <number>`
//! prefix followed by one of the listed keywords. Contracts structured any other way
//! always receive the default clauses.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::contract::models::{
    default_clauses, default_notice_requirements, Clause, ContractAnalysis, Extraction,
    DEFAULT_NOTICE_WINDOW, MAX_RELEVANT_CLAUSES,
};

/// Clause bodies are cut to this many characters before paragraph splitting.
const CLAUSE_TEXT_MAX_CHARS: usize = 500;

// ────────────────────────────────────────────────────────────────────────────
// Patterns
// ────────────────────────────────────────────────────────────────────────────

static NOTICE_WINDOW_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)within\s+(\d+)\s+(days?|hours?)",
        r"(?i)(\d+)\s+(day|hour)\s+notice",
        r"(?i)notice\s+within\s+(\d+)\s+(days?|hours?)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("notice window pattern must compile"))
    .collect()
});

static REQUIREMENTS_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)notice.*?requirements?.*?[:.]\s*")
        .expect("requirements heading pattern must compile")
});

/// Ends a requirements span: blank line, numbered subsection, or the next article/section.
static REQUIREMENTS_TERMINATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\n\n|\d+\.\d+|article|section")
        .expect("requirements terminator pattern must compile")
});

/// Bullet (`•`, `-`) or numbered (`1.`) list marker at span start or after whitespace.
static LIST_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|\s)(?:•|-|\d+\.)\s+").expect("list marker pattern must compile")
});

static CLAUSE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(?:Section|Article|Clause)\s+([\d.]+)\s*[:\-]?\s*(Change Orders?|Changes?|Modifications?|Extra Work)",
        r"(?i)(?:Section|Article|Clause)\s+([\d.]+)\s*[:\-]?\s*(Notice|Notification)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("clause header pattern must compile"))
    .collect()
});

// ────────────────────────────────────────────────────────────────────────────
// Public API
// ────────────────────────────────────────────────────────────────────────────

/// Runs all three rules over `text`. The rules never short-circuit one another.
pub fn analyze_contract(text: &str) -> ContractAnalysis {
    let analysis = ContractAnalysis {
        notice_window: extract_notice_window(text),
        notice_requirements: extract_notice_requirements(text),
        relevant_clauses: extract_relevant_clauses(text),
    };

    debug!(
        window_extracted = analysis.notice_window.is_extracted(),
        requirements_extracted = analysis.notice_requirements.is_extracted(),
        clauses_extracted = analysis.relevant_clauses.is_extracted(),
        "Contract rules applied"
    );

    analysis
}

/// Returns the first phrase matched by the timing patterns, tried in order.
pub fn extract_notice_window(text: &str) -> Extraction<String> {
    NOTICE_WINDOW_PATTERNS
        .iter()
        .find_map(|pattern| pattern.find(text))
        .map(|m| Extraction::Extracted(m.as_str().to_string()))
        .unwrap_or_else(|| Extraction::Defaulted(DEFAULT_NOTICE_WINDOW.to_string()))
}

/// Extracts list items from the span following a notice-requirements heading.
pub fn extract_notice_requirements(text: &str) -> Extraction<Vec<String>> {
    let items = requirements_span(text)
        .map(split_list_items)
        .unwrap_or_default();

    if items.is_empty() {
        Extraction::Defaulted(default_notice_requirements())
    } else {
        Extraction::Extracted(items)
    }
}

/// Collects change-order and notice clause headers, capped at `MAX_RELEVANT_CLAUSES`.
///
/// All matches of the change-order pattern come first (in offset order), then
/// all matches of the notice pattern.
pub fn extract_relevant_clauses(text: &str) -> Extraction<Vec<Clause>> {
    let clauses: Vec<Clause> = CLAUSE_PATTERNS
        .iter()
        .flat_map(|pattern| pattern.captures_iter(text))
        .take(MAX_RELEVANT_CLAUSES)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(Clause {
                number: caps.get(1)?.as_str().to_string(),
                title: caps.get(2)?.as_str().to_string(),
                text: first_paragraph(&text[whole.start()..]),
            })
        })
        .collect();

    if clauses.is_empty() {
        Extraction::Defaulted(default_clauses())
    } else {
        Extraction::Extracted(clauses)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

/// The text between the requirements heading and the first terminator.
/// Without a terminator there is no span.
fn requirements_span(text: &str) -> Option<&str> {
    let heading = REQUIREMENTS_HEADING.find(text)?;
    let rest = &text[heading.end()..];
    let end = REQUIREMENTS_TERMINATOR.find(rest)?;
    Some(&rest[..end.start()])
}

/// Splits a span into trimmed items, one per list marker. Text before the first
/// marker is an introduction, not an item.
fn split_list_items(span: &str) -> Vec<String> {
    let markers: Vec<_> = LIST_MARKER.find_iter(span).collect();

    markers
        .iter()
        .enumerate()
        .map(|(i, marker)| {
            let end = markers.get(i + 1).map_or(span.len(), |next| next.start());
            span[marker.end()..end].trim()
        })
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// First paragraph of at most `CLAUSE_TEXT_MAX_CHARS` characters.
fn first_paragraph(from: &str) -> String {
    let window: String = from.chars().take(CLAUSE_TEXT_MAX_CHARS).collect();
    window
        .split("\n\n")
        .next()
        .unwrap_or_default()
        .to_string()
}
