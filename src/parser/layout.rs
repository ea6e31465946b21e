use serde::Deserialize;

/// One document as dumped by the upstream layout parser.
#[derive(Debug, Clone, Deserialize)]
pub struct RawDocument {
    pub pages: Vec<RawPage>,
}

/// Page geometry plus the unordered primitive tree laid out on it.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPage {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub items: Vec<LayoutItem>,
}

/// Closed set of primitive kinds a layout tree is made of.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LayoutItem {
    Char {
        text: String,
        bbox: [f64; 4],
    },
    #[serde(alias = "line")]
    Curve {
        #[serde(default)]
        pts: Vec<[f64; 2]>,
    },
    Rect {
        bbox: [f64; 4],
    },
    Container {
        #[serde(default)]
        children: Vec<LayoutItem>,
    },
}

impl LayoutItem {
    /// Depth-first walk over every leaf primitive, in document order.
    pub fn visit<'a>(items: &'a [LayoutItem], f: &mut impl FnMut(&'a LayoutItem)) {
        for item in items {
            match item {
                LayoutItem::Container { children } => Self::visit(children, f),
                leaf => f(leaf),
            }
        }
    }
}

// ── Tests ──
