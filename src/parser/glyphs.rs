use super::layout::LayoutItem;

/// Curves spanning this share of the page width or height are page borders.
const PAGE_BORDER_RATIO: f64 = 5.0 / 6.0;

/// Axis-aligned rectangle in page coordinates (origin bottom-left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    pub fn from_bbox([x0, y0, x1, y1]: [f64; 4]) -> Self {
        Rect {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }
}

/// A single decoded character positioned on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    pub ch: char,
    pub rect: Rect,
}

/// Integer rectangle used for frame/table detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Frame {
    pub x0: i64,
    pub y0: i64,
    pub x1: i64,
    pub y1: i64,
}

impl Frame {
    pub fn width(&self) -> i64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> i64 {
        self.y1 - self.y0
    }

    /// Both axis ranges intersect (touching edges count).
    pub fn overlaps(&self, other: &Frame) -> bool {
        self.x0.max(other.x0) <= self.x1.min(other.x1)
            && self.y0.max(other.y0) <= self.y1.min(other.y1)
    }

    pub fn union(&self, other: &Frame) -> Frame {
        Frame {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Containment with `slack` units of tolerance on every edge.
    pub fn contains(&self, inner: &Frame, slack: i64) -> bool {
        self.x0 - slack <= inner.x0
            && inner.x1 <= self.x1 + slack
            && self.y0 - slack <= inner.y0
            && inner.y1 <= self.y1 + slack
    }
}

/// Round to the nearest integer coordinate, ties to even.
pub fn snap(v: f64) -> i64 {
    v.round_ties_even() as i64
}

/// Collect every valid glyph of the tree, in discovery order.
///
/// Anything that is not exactly one non-whitespace character, or that sits at a
/// negative coordinate, is an artifact and is dropped.
pub fn extract_glyphs(items: &[LayoutItem]) -> Vec<Glyph> {
    let mut glyphs = Vec::new();
    LayoutItem::visit(items, &mut |item| {
        if let LayoutItem::Char { text, bbox } = item {
            let rect = Rect::from_bbox(*bbox);
            if let Some(ch) = single_char(text) {
                if rect.x0 >= 0.0 && rect.y0 >= 0.0 {
                    glyphs.push(Glyph { ch, rect });
                }
            }
        }
    });
    glyphs
}

fn single_char(text: &str) -> Option<char> {
    let mut chars = text.trim().chars();
    let ch = chars.next()?;
    chars.next().is_none().then_some(ch)
}

/// Collect candidate frame rectangles, skipping page borders and empty curves.
pub fn extract_frames(items: &[LayoutItem], page_width: f64, page_height: f64) -> Vec<Frame> {
    let max_w = page_width * PAGE_BORDER_RATIO;
    let max_h = page_height * PAGE_BORDER_RATIO;

    let mut frames = Vec::new();
    LayoutItem::visit(items, &mut |item| {
        let frame = match item {
            LayoutItem::Curve { pts } => curve_bounds(pts),
            LayoutItem::Rect { bbox } => {
                let r = Rect::from_bbox(*bbox);
                Some(Frame {
                    x0: snap(r.x0),
                    y0: snap(r.y0),
                    x1: snap(r.x1),
                    y1: snap(r.y1),
                })
            }
            _ => None,
        };
        if let Some(f) = frame {
            if (f.width() as f64) < max_w && (f.height() as f64) < max_h {
                frames.push(f);
            }
        }
    });
    frames
}

fn curve_bounds(pts: &[[f64; 2]]) -> Option<Frame> {
    let (first, rest) = pts.split_first()?;
    let init = (first[0], first[1], first[0], first[1]);
    let (x0, y0, x1, y1) = rest.iter().fold(init, |(x0, y0, x1, y1), [x, y]| {
        (x0.min(*x), y0.min(*y), x1.max(*x), y1.max(*y))
    });
    Some(Frame {
        x0: snap(x0),
        y0: snap(y0),
        x1: snap(x1),
        y1: snap(y1),
    })
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn ch(text: &str, bbox: [f64; 4]) -> LayoutItem {
        LayoutItem::Char {
            text: text.to_string(),
            bbox,
        }
    }

    #[test]
    fn drops_invalid_glyphs() {
        let items = vec![
            ch("売", [10.0, 700.0, 20.0, 710.0]),
            ch(" ", [20.0, 700.0, 30.0, 710.0]),
            ch("ab", [30.0, 700.0, 40.0, 710.0]),
            ch("上", [-1.0, 700.0, 9.0, 710.0]),
            LayoutItem::Container {
                children: vec![ch("高", [40.0, 700.0, 50.0, 710.0])],
            },
        ];
        let glyphs = extract_glyphs(&items);
        let text: String = glyphs.iter().map(|g| g.ch).collect();
        assert_eq!(text, "売高");
    }

    #[test]
    fn curves_become_bounding_frames() {
        let items = vec![
            LayoutItem::Curve {
                pts: vec![[10.2, 20.0], [110.0, 20.0], [110.0, 60.6], [10.2, 60.6]],
            },
            LayoutItem::Curve { pts: vec![] },
            LayoutItem::Rect {
                bbox: [200.0, 300.0, 250.0, 320.0],
            },
        ];
        let frames = extract_frames(&items, 600.0, 800.0);
        assert_eq!(
            frames,
            vec![
                Frame { x0: 10, y0: 20, x1: 110, y1: 61 },
                Frame { x0: 200, y0: 300, x1: 250, y1: 320 },
            ]
        );
    }

    #[test]
    fn page_borders_are_discarded() {
        let items = vec![
            // full-width horizontal rule
            LayoutItem::Rect {
                bbox: [10.0, 400.0, 590.0, 401.0],
            },
            // full-page frame
            LayoutItem::Rect {
                bbox: [5.0, 5.0, 595.0, 795.0],
            },
            LayoutItem::Rect {
                bbox: [10.0, 10.0, 100.0, 100.0],
            },
        ];
        let frames = extract_frames(&items, 600.0, 800.0);
        assert_eq!(frames, vec![Frame { x0: 10, y0: 10, x1: 100, y1: 100 }]);
    }

    #[test]
    fn tall_rules_are_borders_on_height_alone() {
        let items = vec![
            // margin rule down most of the page, one unit wide
            LayoutItem::Curve {
                pts: vec![[300.0, 50.0], [300.0, 750.0]],
            },
            // column rule under 5/6 of the height
            LayoutItem::Curve {
                pts: vec![[300.0, 50.0], [300.0, 600.0]],
            },
        ];
        let frames = extract_frames(&items, 600.0, 800.0);
        assert_eq!(frames, vec![Frame { x0: 300, y0: 50, x1: 300, y1: 600 }]);
    }

    #[test]
    fn frame_overlap_and_containment() {
        let a = Frame { x0: 0, y0: 0, x1: 10, y1: 10 };
        let b = Frame { x0: 10, y0: 5, x1: 20, y1: 20 };
        let c = Frame { x0: 11, y0: 0, x1: 20, y1: 4 };
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert_eq!(a.union(&b), Frame { x0: 0, y0: 0, x1: 20, y1: 20 });
        assert!(a.contains(&Frame { x0: -1, y0: 1, x1: 11, y1: 9 }, 1));
        assert!(!a.contains(&Frame { x0: -2, y0: 1, x1: 5, y1: 9 }, 1));
    }
}
