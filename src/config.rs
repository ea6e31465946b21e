use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Knobs of the subsection boundary search.
///
/// `first_page_min_offset` is a hand-tuned figure: roughly three physical lines
/// of body text. A heading found on the first scanned page at or before this
/// offset is taken to be the subsection's own title line.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SegmenterConfig {
    pub toc_marker: String,
    pub fallback_toc_page: usize,
    pub heading_phrases: Vec<String>,
    pub first_page_min_offset: usize,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        SegmenterConfig {
            toc_marker: "目次".to_string(),
            fallback_toc_page: 1,
            heading_phrases: [
                "財政状態に関する",
                "財政状態の",
                "将来予測情報に関する",
                "業績予想に関する",
                "今後の見通し",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            first_page_min_offset: 150,
        }
    }
}

impl SegmenterConfig {
    /// Defaults, overridden by whatever fields a JSON file sets.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }
}
