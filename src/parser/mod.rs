pub mod boxes;
pub mod classify;
pub mod glyphs;
pub mod layout;
pub mod lines;
pub mod page;
pub mod sections;
pub mod ssplit;

use std::path::Path;

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;

use crate::config::SegmenterConfig;
use layout::RawDocument;
use page::Page;
use sections::{Partition, Sections};

/// A sentence together with the partition it was cut from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionSentence {
    pub section: Partition,
    pub sentence: String,
}

/// Decode a layout dump and rebuild every page. Any bad page fails the whole
/// document.
pub fn load_document(path: &Path) -> Result<Vec<Page>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read layout {}", path.display()))?;
    let doc: RawDocument = serde_json::from_str(&raw)
        .with_context(|| format!("Malformed layout {}", path.display()))?;
    build_pages(&doc).with_context(|| format!("Malformed layout {}", path.display()))
}

pub fn build_pages(doc: &RawDocument) -> Result<Vec<Page>> {
    doc.pages
        .par_iter()
        .enumerate()
        .map(|(i, raw)| Page::from_layout(raw).with_context(|| format!("page {}", i + 1)))
        .collect()
}

/// Four-stage pipeline: layout → pages → sections → sentences.
pub fn process_document(path: &Path, config: &SegmenterConfig) -> Result<Vec<SectionSentence>> {
    let pages = load_document(path)?;
    let sections = sections::extract(&pages, config);
    Ok(section_sentences(&sections))
}

/// Sentences of precede, target and succeed, in that order.
pub fn section_sentences(sections: &Sections) -> Vec<SectionSentence> {
    sections
        .iter()
        .flat_map(|(section, pages)| {
            ssplit::split(&page::flatten(pages))
                .into_iter()
                .map(move |sentence| SectionSentence { section, sentence })
        })
        .collect()
}

// ── Tests ──
