//! Text layout for the notice pages: line classification, greedy word wrap and
//! pagination. Pure functions over encoded text; the PDF writer only draws the
//! positioned lines produced here.

use once_cell::sync::Lazy;
use regex::Regex;

use super::font_metrics::{encode_win_ansi, Font};
use crate::notice::assembler::{DIVIDER, NOTICE_TITLE};

/// US Letter, in points.
pub const PAGE_WIDTH: f32 = 612.0;
pub const PAGE_HEIGHT: f32 = 792.0;
pub const MARGIN: f32 = 50.0;
pub const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;

/// A new page starts once the cursor drops below this line.
const BOTTOM_LIMIT: f32 = MARGIN + 50.0;
/// Extra advance added to the font size for every drawn line.
const LEADING: f32 = 4.0;
const BLANK_LINE_ADVANCE: f32 = 8.0;
const HEADING_SPACE_AFTER: f32 = 4.0;

static SECTION_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.\s+[A-Z]").expect("valid section heading regex"));

// ────────────────────────────────────────────────────────────────────────────
// Line styles
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    /// The notice title or a divider rule.
    Title,
    /// A numbered section heading such as `1. PROJECT INFORMATION`.
    Heading,
    Body,
    Blank,
}

impl LineStyle {
    pub fn classify(line: &str) -> Self {
        if line.trim().is_empty() {
            LineStyle::Blank
        } else if line.contains(NOTICE_TITLE) || line.contains(DIVIDER) {
            LineStyle::Title
        } else if SECTION_HEADING.is_match(line) {
            LineStyle::Heading
        } else {
            LineStyle::Body
        }
    }

    pub fn font(&self) -> Font {
        match self {
            LineStyle::Title | LineStyle::Heading => Font::Bold,
            LineStyle::Body | LineStyle::Blank => Font::Regular,
        }
    }

    pub fn size_pt(&self) -> f32 {
        match self {
            LineStyle::Title => 14.0,
            LineStyle::Heading => 11.0,
            LineStyle::Body | LineStyle::Blank => 10.0,
        }
    }

    fn space_after(&self) -> f32 {
        match self {
            LineStyle::Heading => HEADING_SPACE_AFTER,
            _ => 0.0,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Positioned output
// ────────────────────────────────────────────────────────────────────────────

/// One line of WinAnsi-encoded text at its baseline position.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub font: Font,
    pub size_pt: f32,
    pub x: f32,
    pub y: f32,
    pub text: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextPage {
    pub lines: Vec<PlacedLine>,
}

/// Lays out the notice body into pages. Always returns at least one page.
pub fn layout_text(body: &str) -> Vec<TextPage> {
    let mut pages = vec![TextPage::default()];
    let mut y = PAGE_HEIGHT - MARGIN;

    for line in body.split('\n') {
        let style = LineStyle::classify(line);
        if style == LineStyle::Blank {
            y -= BLANK_LINE_ADVANCE;
            continue;
        }

        let font = style.font();
        let size = style.size_pt();
        for wrapped in wrap_line(&encode_win_ansi(line), font, size, CONTENT_WIDTH) {
            if y < BOTTOM_LIMIT {
                pages.push(TextPage::default());
                y = PAGE_HEIGHT - MARGIN;
            }
            if let Some(page) = pages.last_mut() {
                page.lines.push(PlacedLine {
                    font,
                    size_pt: size,
                    x: MARGIN,
                    y,
                    text: wrapped,
                });
            }
            y -= size + LEADING;
        }
        y -= style.space_after();
    }

    pages
}

/// Greedy wrap on single spaces. Words are never split; an over-long word
/// sits alone on its line. Leading spaces are kept as part of the first line.
pub fn wrap_line(text: &[u8], font: Font, size_pt: f32, max_width: f32) -> Vec<Vec<u8>> {
    let metrics = font.metrics();
    let mut lines = Vec::new();
    let mut current: Option<Vec<u8>> = None;

    for word in text.split(|&b| b == b' ') {
        current = Some(match current.take() {
            None => word.to_vec(),
            Some(mut line) => {
                let candidate = metrics.width_pt(&line, size_pt)
                    + metrics.width_pt(b" ", size_pt)
                    + metrics.width_pt(word, size_pt);
                if candidate > max_width && line.iter().any(|&b| b != b' ') {
                    lines.push(line);
                    word.to_vec()
                } else {
                    line.push(b' ');
                    line.extend_from_slice(word);
                    line
                }
            }
        });
    }

    if let Some(line) = current {
        if !line.is_empty() {
            lines.push(line);
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_title_and_divider() {
        assert_eq!(LineStyle::classify(NOTICE_TITLE), LineStyle::Title);
        assert_eq!(LineStyle::classify(DIVIDER), LineStyle::Title);
    }

    #[test]
    fn test_classify_section_heading() {
        assert_eq!(
            LineStyle::classify("1. PROJECT INFORMATION"),
            LineStyle::Heading
        );
        assert_eq!(LineStyle::classify("12. Notes"), LineStyle::Heading);
        assert_eq!(LineStyle::classify("1. lower case"), LineStyle::Body);
        assert_eq!(LineStyle::classify("   1. INDENTED"), LineStyle::Body);
    }

    #[test]
    fn test_classify_blank_and_body() {
        assert_eq!(LineStyle::classify("   "), LineStyle::Blank);
        assert_eq!(LineStyle::classify(""), LineStyle::Blank);
        assert_eq!(LineStyle::classify("Project: Acme Tower"), LineStyle::Body);
    }

    #[test]
    fn test_style_sizes() {
        assert_eq!(LineStyle::Title.size_pt(), 14.0);
        assert_eq!(LineStyle::Heading.size_pt(), 11.0);
        assert_eq!(LineStyle::Body.size_pt(), 10.0);
        assert_eq!(LineStyle::Heading.font(), Font::Bold);
        assert_eq!(LineStyle::Body.font(), Font::Regular);
    }

    #[test]
    fn test_wrap_short_line_is_single_line() {
        let lines = wrap_line(b"Short line", Font::Regular, 10.0, CONTENT_WIDTH);
        assert_eq!(lines, vec![b"Short line".to_vec()]);
    }

    #[test]
    fn test_wrap_long_line_fits_content_width() {
        let text = "word ".repeat(200);
        let lines = wrap_line(text.trim_end().as_bytes(), Font::Regular, 10.0, CONTENT_WIDTH);
        assert!(lines.len() > 1);
        let metrics = Font::Regular.metrics();
        for line in &lines {
            assert!(metrics.width_pt(line, 10.0) <= CONTENT_WIDTH);
            assert!(!line.starts_with(b" "));
        }
        let rejoined = lines
            .iter()
            .map(|l| String::from_utf8_lossy(l).into_owned())
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(rejoined, text.trim_end());
    }

    #[test]
    fn test_wrap_never_splits_long_word() {
        let long = "x".repeat(300);
        let text = format!("a {long} b");
        let lines = wrap_line(text.as_bytes(), Font::Regular, 10.0, CONTENT_WIDTH);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], long.as_bytes());
    }

    #[test]
    fn test_wrap_keeps_indentation() {
        let lines = wrap_line(b"   (a) item", Font::Regular, 10.0, CONTENT_WIDTH);
        assert_eq!(lines, vec![b"   (a) item".to_vec()]);
    }

    #[test]
    fn test_layout_empty_body_has_one_page() {
        let pages = layout_text("");
        assert_eq!(pages.len(), 1);
        assert!(pages[0].lines.is_empty());
    }

    #[test]
    fn test_layout_positions_and_styles() {
        let pages = layout_text("CHANGE ORDER NOTICE\n\n1. PROJECT INFORMATION\nBody");
        let lines = &pages[0].lines;
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].y, 742.0);
        assert_eq!(lines[0].size_pt, 14.0);
        // 742 - (14 + 4) - 8 blank
        assert_eq!(lines[1].y, 716.0);
        assert_eq!(lines[1].font, Font::Bold);
        // 716 - (11 + 4) - 4 heading space
        assert_eq!(lines[2].y, 697.0);
        assert_eq!(lines[2].font, Font::Regular);
        assert!(lines.iter().all(|l| l.x == MARGIN));
    }

    #[test]
    fn test_layout_paginates_long_text() {
        let body = vec!["Line of body text"; 100].join("\n");
        let pages = layout_text(&body);
        assert!(pages.len() >= 2);
        for page in &pages {
            for line in &page.lines {
                assert!(line.y >= BOTTOM_LIMIT - 14.0);
                assert!(line.y <= PAGE_HEIGHT - MARGIN);
            }
        }
        let total: usize = pages.iter().map(|p| p.lines.len()).sum();
        assert_eq!(total, 100);
    }

    #[test]
    fn test_layout_encodes_divider_as_hyphens() {
        let pages = layout_text(DIVIDER);
        let text = &pages[0].lines[0].text;
        assert!(text.iter().all(|&b| b == b'-'));
    }
}
