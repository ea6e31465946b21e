use anyhow::{bail, Result};
use tracing::debug;

use super::boxes::detect_boxes;
use super::classify::classify_lines;
use super::glyphs::{extract_frames, extract_glyphs, Frame};
use super::layout::RawPage;
use super::lines::{aggregate_lines, TextLine};

/// Spacer appended after a line that wraps mid-sentence.
pub const IDEOGRAPHIC_SPACE: char = '\u{3000}';

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub width: f64,
    pub height: f64,
    pub lines: Vec<TextLine>,
    pub boxes: Vec<Frame>,
    pub text: String,
}

impl Page {
    /// Rebuild ordered, classified lines from a page's raw primitives.
    pub fn from_layout(raw: &RawPage) -> Result<Page> {
        let (width, height) = (raw.width, raw.height);
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            bail!("invalid page geometry {}x{}", width, height);
        }

        let glyphs = extract_glyphs(&raw.items);
        let glyph_count = glyphs.len();
        let mut lines = aggregate_lines(glyphs);
        let frames = extract_frames(&raw.items, width, height);
        let boxes = detect_boxes(&frames);
        classify_lines(&mut lines, &boxes, width, height);

        debug!(
            glyphs = glyph_count,
            lines = lines.len(),
            frames = frames.len(),
            boxes = boxes.len(),
            "page rebuilt"
        );

        Ok(Page::with_lines(width, height, lines, boxes))
    }

    pub fn with_lines(width: f64, height: f64, lines: Vec<TextLine>, boxes: Vec<Frame>) -> Page {
        let text = lines.iter().map(rendered).collect();
        Page {
            width,
            height,
            lines,
            boxes,
            text,
        }
    }

    /// Split at a character offset into `text`: the line holding that character
    /// and everything after it go to the second page.
    pub fn split_at(&self, char_idx: usize) -> (Page, Page) {
        let byte_idx = self
            .text
            .char_indices()
            .nth(char_idx)
            .map_or(self.text.len(), |(b, _)| b);
        let line_idx = line_at(&self.lines, char_idx);

        let head = Page {
            lines: self.lines[..line_idx].to_vec(),
            text: self.text[..byte_idx].to_string(),
            ..self.clone()
        };
        let tail = Page {
            lines: self.lines[line_idx..].to_vec(),
            text: self.text[byte_idx..].to_string(),
            ..self.clone()
        };
        (head, tail)
    }
}

/// What a line contributes to page text: nothing when excluded, otherwise its
/// text plus a spacer if it wraps.
pub fn rendered(line: &TextLine) -> String {
    if line.exclude {
        return String::new();
    }
    let mut s = line.text.clone();
    if line.line_break {
        s.push(IDEOGRAPHIC_SPACE);
    }
    s
}

/// Index of the line whose rendered text covers character `char_idx`.
fn line_at(lines: &[TextLine], char_idx: usize) -> usize {
    let mut end = 0;
    for (i, line) in lines.iter().enumerate() {
        end += rendered(line).chars().count();
        if end > char_idx {
            return i;
        }
    }
    lines.len()
}

/// Concatenated text of the non-excluded lines of `pages`, in order.
pub fn flatten(pages: &[Page]) -> String {
    pages
        .iter()
        .flat_map(|p| p.lines.iter())
        .map(rendered)
        .collect()
}

// ── Tests ──
