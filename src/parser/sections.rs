use serde::Serialize;
use tracing::{debug, info, warn};

use super::page::Page;
use crate::config::SegmenterConfig;

/// Which of the three ordered partitions a page belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Partition {
    Precede,
    Target,
    Succeed,
}

#[derive(Debug, Clone, Default)]
pub struct Sections {
    pub precede: Vec<Page>,
    pub target: Vec<Page>,
    pub succeed: Vec<Page>,
}

impl Sections {
    pub fn iter(&self) -> impl Iterator<Item = (Partition, &[Page])> {
        [
            (Partition::Precede, self.precede.as_slice()),
            (Partition::Target, self.target.as_slice()),
            (Partition::Succeed, self.succeed.as_slice()),
        ]
        .into_iter()
    }
}

/// Partition a document's pages around the target subsection.
///
/// Everything up to the table-of-contents page is `precede`. The subsection
/// then runs until the first accepted trailing heading, where that page is
/// split in two; the rest is `succeed`.
pub fn extract(pages: &[Page], config: &SegmenterConfig) -> Sections {
    let toc_idx = match pages
        .iter()
        .position(|p| p.text.contains(config.toc_marker.as_str()))
    {
        Some(idx) => idx,
        None => {
            warn!(
                marker = config.toc_marker.as_str(),
                "no table of contents, assuming page {}",
                config.fallback_toc_page + 1
            );
            config.fallback_toc_page
        }
    };
    debug!(toc_idx, pages = pages.len(), "table of contents located");

    let mut sections = Sections::default();
    let mut state = Partition::Precede;
    let mut scanned = 0usize;

    for (idx, page) in pages.iter().enumerate() {
        match state {
            Partition::Precede => {
                sections.precede.push(page.clone());
                if idx == toc_idx {
                    state = Partition::Target;
                }
            }
            Partition::Target => {
                match find_boundary(&page.text, scanned == 0, config) {
                    Some(offset) => {
                        info!(page = idx, offset, "trailing subsection starts");
                        let (head, tail) = page.split_at(offset);
                        sections.target.push(head);
                        sections.succeed.push(tail);
                        state = Partition::Succeed;
                    }
                    None => sections.target.push(page.clone()),
                }
                scanned += 1;
            }
            Partition::Succeed => sections.succeed.push(page.clone()),
        }
    }

    sections
}

/// Character offset at which a trailing heading starts on this page, if any.
///
/// On the first scanned page a match near the top is usually the subsection's
/// own title; it only counts past `first_page_min_offset`, or else via a
/// second occurrence of the same phrase further down.
fn find_boundary(text: &str, first_page: bool, config: &SegmenterConfig) -> Option<usize> {
    let char_offset = |byte: usize| text[..byte].chars().count();

    for phrase in config.heading_phrases.iter().filter(|p| !p.is_empty()) {
        let Some(byte) = text.find(phrase.as_str()) else {
            continue;
        };
        if !first_page {
            debug!(phrase = phrase.as_str(), "heading matched");
            return Some(char_offset(byte));
        }

        let offset = char_offset(byte);
        if offset > config.first_page_min_offset {
            debug!(phrase = phrase.as_str(), offset, "heading matched below title lines");
            return Some(offset);
        }
        let after = byte + phrase.len();
        if let Some(rel) = text[after..].find(phrase.as_str()) {
            debug!(phrase = phrase.as_str(), "repeated heading matched");
            return Some(char_offset(after + rel));
        }
    }
    None
}

// ── Tests ──
