use super::glyphs::Glyph;

/// Share of a glyph's height (vertical) or width (horizontal) under which two
/// glyphs are treated as sitting on the same line or in the same slot.
const SAME_SLOT_RATIO: f64 = 0.25;

#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub glyphs: Vec<Glyph>,
    pub text: String,
    pub exclude: bool,
    pub line_break: bool,
}

impl TextLine {
    fn new(glyphs: Vec<Glyph>) -> Self {
        let text = glyphs.iter().map(|g| g.ch).collect();
        TextLine {
            glyphs,
            text,
            exclude: false,
            line_break: false,
        }
    }
}

/// Group glyphs into top-to-bottom lines, each ordered left-to-right.
pub fn aggregate_lines(mut glyphs: Vec<Glyph>) -> Vec<TextLine> {
    // stable: equal tops keep discovery order
    glyphs.sort_by(|a, b| b.rect.y1.total_cmp(&a.rect.y1));

    let mut rows: Vec<Vec<Glyph>> = Vec::new();
    let mut prev_top: Option<f64> = None;
    for glyph in glyphs {
        let top = glyph.rect.y1;
        let tolerance = glyph.rect.height() * SAME_SLOT_RATIO;
        let joins = matches!(prev_top, Some(prev) if prev - top <= tolerance);
        prev_top = Some(top);
        match rows.last_mut() {
            Some(row) if joins => row.push(glyph),
            _ => rows.push(vec![glyph]),
        }
    }

    rows.into_iter()
        .map(dedupe_slots)
        .filter(|glyphs| !glyphs.is_empty())
        .map(TextLine::new)
        .collect()
}

/// Order a row left-to-right and collapse glyphs rendered into the same slot.
/// The later glyph of a colliding pair replaces the earlier one.
fn dedupe_slots(mut row: Vec<Glyph>) -> Vec<Glyph> {
    row.sort_by(|a, b| a.rect.x0.total_cmp(&b.rect.x0));

    let mut slots: Vec<Glyph> = Vec::with_capacity(row.len());
    for glyph in row {
        if let Some(last) = slots.last_mut() {
            if glyph.rect.x0 - last.rect.x0 <= glyph.rect.width() * SAME_SLOT_RATIO {
                *last = glyph;
                continue;
            }
        }
        slots.push(glyph);
    }
    slots
}

// ── Tests ──
