// Shared prompt constants and prompt-building utilities.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// System prompt fragment for documents that are rendered verbatim into a PDF.
pub const PLAIN_TEXT_SYSTEM: &str = "Respond with the finished document only, as plain text. \
    Do NOT use markdown formatting, code fences, or commentary before or after the document. \
    Number top-level sections as \"1. TITLE\" in upper case.";
