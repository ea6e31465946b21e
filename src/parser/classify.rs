use super::glyphs::{snap, Frame};
use super::lines::TextLine;

/// Height share at the top/bottom of a page reserved for running headers and footers.
const MARGIN_BAND: f64 = 0.05;
/// Lines ending left of this share of the page width wrap mid-sentence.
const WRAP_RATIO: f64 = 5.0 / 6.0;
const BOX_SLACK: i64 = 1;

/// Tight integer bounding box of a line's glyphs.
pub fn line_bounds(line: &TextLine) -> Option<Frame> {
    let first = line.glyphs.first()?;
    let init = (first.rect.x0, first.rect.y0, first.rect.x1, first.rect.y1);
    let (x0, y0, x1, y1) = line.glyphs.iter().fold(init, |(x0, y0, x1, y1), g| {
        (x0.min(g.rect.x0), y0.min(g.rect.y0), x1.max(g.rect.x1), y1.max(g.rect.y1))
    });
    Some(Frame {
        x0: snap(x0),
        y0: snap(y0),
        x1: snap(x1),
        y1: snap(y1),
    })
}

/// Set `exclude` and `line_break` on every line of a page.
pub fn classify_lines(lines: &mut [TextLine], boxes: &[Frame], page_width: f64, page_height: f64) {
    let last = lines.len().saturating_sub(1);
    for (i, line) in lines.iter_mut().enumerate() {
        let Some(bounds) = line_bounds(line) else {
            line.exclude = true;
            continue;
        };

        let in_box = boxes.iter().any(|b| b.contains(&bounds, BOX_SLACK));
        let header = i == 0 && bounds.y1 as f64 >= page_height * (1.0 - MARGIN_BAND);
        let footer = i == last && bounds.y0 as f64 <= page_height * MARGIN_BAND;
        line.exclude = in_box || header || footer;

        let right = line.glyphs.last().map_or(0, |g| snap(g.rect.x1));
        line.line_break = (right as f64) < page_width * WRAP_RATIO && i != last;
    }
}

// ── Tests ──
