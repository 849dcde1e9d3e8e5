// Contract ingestion: PDF text extraction and rule-based fact extraction.
// Text extraction is CPU-bound and must run inside tokio::task::spawn_blocking.

pub mod extract;
pub mod handlers;
pub mod models;
pub mod rules;

pub use extract::{extract_contract_text, ExtractionError};
pub use models::{Clause, ContractAnalysis, ContractFacts, Extraction};
pub use rules::analyze_contract;
