// All LLM prompt constants for the Notice module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Contract text sent for analysis is cut to this many characters.
pub const CONTRACT_TEXT_MAX_CHARS: usize = 15_000;

/// Clause text quoted in the drafting prompt is cut to this many characters.
pub const PROMPT_CLAUSE_MAX_CHARS: usize = 150;

/// System prompt for contract analysis. Append `JSON_ONLY_SYSTEM` before sending.
pub const CONTRACT_ANALYSIS_SYSTEM: &str = r#"You are an expert construction contract analyst. Your job is to extract key information about change order notice requirements from subcontractor agreements.

Extract the following information:
1. Notice timing window (e.g., "48 hours", "3 days", "within 5 days")
2. List of notice requirements (what must be included in the notice)
3. Relevant contract clauses (article/section numbers, titles, and key text)

Focus on:
- Change order procedures
- Notice requirements for delays, changes, or unforeseen conditions
- Time extension procedures
- Documentation requirements
- Any clauses about preserving rights or avoiding waivers

Return your response as valid JSON with this exact structure:
{
  "notice_window": "string",
  "notice_requirements": ["string", "string"],
  "relevant_clauses": [
    {
      "number": "string",
      "title": "string",
      "text": "string"
    }
  ]
}"#;

/// Contract analysis prompt. Replace `{contract_text}` before sending.
pub const CONTRACT_ANALYSIS_PROMPT_TEMPLATE: &str =
    "Analyze this subcontractor agreement and extract notice requirements:\n\n{contract_text}";

/// System prompt for notice drafting. Append `PLAIN_TEXT_SYSTEM` before sending.
pub const NOTICE_DRAFT_SYSTEM: &str = r#"You are an expert construction contract administrator specializing in change order documentation for electrical subcontractors.

Your job is to generate professional, contract-compliant written notices that:
1. Follow formal business letter format
2. Reference specific contract clauses and requirements
3. Preserve the subcontractor's rights to compensation and time extension
4. Include all required elements per the contract
5. Maintain a professional, non-adversarial tone
6. Are clear, concise, and legally defensible

The notice should follow this structure:
- Subject line clearly stating it's a written notice
- Project identification
- Date and timestamp
- Notice type and contract reference
- Description of the delay/change event
- Estimated schedule impact
- Contractual basis (citing specific articles)
- List of attached supporting documentation
- Subcontractor signature block

Use formal construction industry language. Be specific about contract references. Make it clear this is to preserve rights and request direction, not to make accusations."#;

/// Notice drafting prompt. Replace every `{placeholder}` before sending.
pub const NOTICE_DRAFT_PROMPT_TEMPLATE: &str = r#"Generate a written notice of changed condition and request for direction with the following details:

PROJECT INFORMATION:
- Project Name: {project_name}
- General Contractor: {gc_name}
- Date: {date}
- Time: {time}

CHANGE DESCRIPTION:
{description}

CONTRACT INFORMATION:
{contract_information}

SUPPORTING DOCUMENTATION:
{supporting_documentation}

Generate a complete, professional written notice that cites the specific contract articles and preserves the subcontractor's rights. The notice should be formal but not adversarial."#;

/// Description used in the drafting prompt when the field note is empty.
pub const DEFAULT_PROMPT_DESCRIPTION: &str = "Unanticipated site condition encountered that was \
    not reasonably identifiable from contract documents";

/// Contract information used in the drafting prompt when no facts are available.
pub const DEFAULT_CONTRACT_INFORMATION: &str =
    "Standard subcontractor agreement with 48-hour notice requirement";
