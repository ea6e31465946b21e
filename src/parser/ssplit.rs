//! Sentence splitting for Japanese prose with nested brackets and quotes.
//!
//! A full-width period only ends a sentence at bracket depth zero. Brackets
//! that cannot be paired are located up front and left out of the depth count,
//! so a stray one never holds a span open. The text itself is never rewritten:
//! every sentence is a slice of the input.

use std::collections::HashSet;
use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

const PERIOD: &str = "。";

static CANDIDATE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^。]*。|[^。]+$").unwrap());

const PAREN_OPEN: [char; 2] = ['（', '('];
const PAREN_CLOSE: [char; 2] = ['）', ')'];
const QUOTE_OPEN: [char; 2] = ['「', '“'];
const QUOTE_CLOSE: [char; 2] = ['」', '”'];

fn is_opener(c: char) -> bool {
    PAREN_OPEN.contains(&c) || QUOTE_OPEN.contains(&c)
}

fn is_closer(c: char) -> bool {
    PAREN_CLOSE.contains(&c) || QUOTE_CLOSE.contains(&c)
}

/// Half- and full-width parentheses pair freely; quotes pair by shape.
fn pairs(open: char, close: char) -> bool {
    match open {
        '（' | '(' => PAREN_CLOSE.contains(&close),
        '「' => close == '」',
        '“' => close == '”',
        _ => false,
    }
}

/// Split `text` into sentences, in order. Never fails.
pub fn split(text: &str) -> Vec<String> {
    let stray = unmatched_brackets(text);
    // every line, the last one included, is scanned with its newline
    let padded = format!("{}\n", text);

    let spans = merge_single_periods(&padded, candidates(&padded));
    merge_bracket_spans(&padded, &stray, spans)
        .into_iter()
        .map(|span| padded[span].trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Byte offsets of every bracket that has no partner. Each closer pairs with
/// the nearest compatible opener still open.
pub fn unmatched_brackets(text: &str) -> HashSet<usize> {
    let mut stray = HashSet::new();
    let mut open: Vec<(usize, char)> = Vec::new();

    for (i, c) in text.char_indices() {
        if is_opener(c) {
            open.push((i, c));
        } else if is_closer(c) {
            match open.iter().rposition(|&(_, o)| pairs(o, c)) {
                Some(k) => {
                    open.remove(k);
                }
                None => {
                    stray.insert(i);
                }
            }
        }
    }
    stray.extend(open.into_iter().map(|(i, _)| i));
    stray
}

/// Period-terminated pieces of each line. The pieces tile `padded`.
fn candidates(padded: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut offset = 0;
    for line in padded.split_inclusive('\n') {
        spans.extend(
            CANDIDATE_RE
                .find_iter(line)
                .map(|m| offset + m.start()..offset + m.end()),
        );
        offset += line.len();
    }
    spans
}

fn merge_single_periods(text: &str, spans: Vec<Range<usize>>) -> Vec<Range<usize>> {
    let mut merged: Vec<Range<usize>> = Vec::with_capacity(spans.len());
    for span in spans {
        match merged.last_mut() {
            Some(prev) if &text[span.clone()] == PERIOD => prev.end = span.end,
            _ => merged.push(span),
        }
    }
    merged
}

#[derive(Default)]
struct Depth {
    paren: i64,
    quote: i64,
}

impl Depth {
    /// Count the paired brackets of `text[span]`; strays do not move the depth.
    fn add(&mut self, text: &str, span: Range<usize>, stray: &HashSet<usize>) {
        for (i, c) in text[span.clone()].char_indices() {
            if stray.contains(&(span.start + i)) {
                continue;
            }
            if PAREN_OPEN.contains(&c) {
                self.paren += 1;
            } else if PAREN_CLOSE.contains(&c) {
                self.paren -= 1;
            } else if QUOTE_OPEN.contains(&c) {
                self.quote += 1;
            } else if QUOTE_CLOSE.contains(&c) {
                self.quote -= 1;
            }
        }
    }

    fn is_zero(&self) -> bool {
        self.paren == 0 && self.quote == 0
    }
}

/// Join candidates until bracket depth is back to zero. A newline reached while
/// still nested ends the sentence there and resets the depth.
fn merge_bracket_spans(
    text: &str,
    stray: &HashSet<usize>,
    spans: Vec<Range<usize>>,
) -> Vec<Range<usize>> {
    let mut sentences = Vec::new();
    let mut depth = Depth::default();
    let mut start: Option<usize> = None;

    for span in spans {
        let mut rest = Some(span);
        while let Some(span) = rest.take() {
            depth.add(text, span.clone(), stray);
            let from = *start.get_or_insert(span.start);
            if depth.is_zero() {
                sentences.push(from..span.end);
                start = None;
            } else if let Some(nl) = text[span.clone()].find('\n') {
                let nl = span.start + nl;
                sentences.push(from..nl);
                start = None;
                depth = Depth::default();
                if nl + 1 < span.end {
                    rest = Some(nl + 1..span.end);
                }
            }
        }
    }

    if let Some(from) = start {
        sentences.push(from..text.len());
    }
    sentences
}

// ── Tests ──
