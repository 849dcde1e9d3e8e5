// Document rendering: notice text + evidence photos → PDF bytes.
// CPU-bound (image decode, stream compression); callers run it inside
// tokio::task::spawn_blocking.

pub mod font_metrics;
pub mod layout;
pub mod pdf_writer;

use thiserror::Error;
use tracing::info;

use crate::models::photo::EvidencePhoto;
use layout::layout_text;
use pdf_writer::{add_photo_pages, PdfBuilder};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF serialization failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("PDF write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Renders the notice: text pages first, then one page per renderable photo.
pub fn render_notice_pdf(body_text: &str, photos: &[EvidencePhoto]) -> Result<Vec<u8>, RenderError> {
    let mut builder = PdfBuilder::new();
    for page in layout_text(body_text) {
        builder.add_text_page(&page)?;
    }
    let text_pages = builder.page_count();
    let photo_pages = add_photo_pages(&mut builder, photos);

    let bytes = builder.finish()?;
    info!(
        text_pages,
        photo_pages,
        skipped = photos.len() - photo_pages,
        size = bytes.len(),
        "Notice PDF rendered"
    );
    Ok(bytes)
}
