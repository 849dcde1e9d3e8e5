//! Contract text extraction from PDF bytes.
//!
//! `pdf_extract` can panic on malformed input instead of returning an error, so
//! every call runs under `catch_unwind` and panics surface as `ExtractionError`.

use std::panic::{self, AssertUnwindSafe};

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("PDF text extraction failed: {0}")]
    Pdf(String),

    #[error("PDF text extraction panicked (malformed document)")]
    Panicked,
}

/// Extracts the text of every page in page order.
///
/// Pages are joined with `\n`. Within a page, whitespace runs are collapsed to a
/// single space: layout-derived line breaks are not meaningful for rule matching.
/// Image-only PDFs produce empty (or whitespace-only) text, not an error.
pub fn extract_contract_text(data: &[u8]) -> Result<String, ExtractionError> {
    let pages = extract_pages(data)?;
    debug!(pages = pages.len(), "Extracted contract text");

    Ok(pages
        .iter()
        .map(|page| collapse_whitespace(page))
        .collect::<Vec<_>>()
        .join("\n"))
}

fn extract_pages(data: &[u8]) -> Result<Vec<String>, ExtractionError> {
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(data)
    }));

    match result {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(ExtractionError::Pdf(e.to_string())),
        Err(_) => Err(ExtractionError::Panicked),
    }
}

fn collapse_whitespace(page: &str) -> String {
    page.split_whitespace().collect::<Vec<_>>().join(" ")
}
