use std::path::Path;

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::info;

use super::MasterRecord;
use crate::config::SegmenterConfig;
use crate::parser;

/// Row that opens each document's block in the annotation template. The
/// first one lines up with the template's header and is dropped.
pub const SEPARATOR: &str = "sentence";
const SENTENCE_COLUMN: &str = "sentence";
const CHUNK: usize = 64;

/// Sentences of every document, each block preceded by a separator row.
pub fn collect_sentences(
    master: &[MasterRecord],
    layout_dir: &Path,
    config: &SegmenterConfig,
) -> Result<Vec<String>> {
    let pb = ProgressBar::new(master.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );

    let mut rows = Vec::new();
    for chunk in master.chunks(CHUNK) {
        let docs: Vec<Vec<String>> = chunk
            .par_iter()
            .map(|rec| -> Result<Vec<String>> {
                let path = rec.layout_path(layout_dir);
                let sentences = parser::process_document(&path, config)
                    .with_context(|| format!("Failed to process {} ({})", rec.basename, rec.url))?;
                Ok(sentences.into_iter().map(|s| s.sentence).collect())
            })
            .collect::<Result<_>>()?;

        for sentences in docs {
            rows.push(SEPARATOR.to_string());
            rows.extend(sentences);
        }
        pb.inc(chunk.len() as u64);
    }

    pb.finish_and_clear();
    Ok(rows)
}

/// Write `sentences` (minus the leading separator) into the `sentence` column
/// of a TSV template, one per data row.
pub fn fill_template(template: &Path, sentences: &[String], out: &Path) -> Result<usize> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .from_path(template)
        .with_context(|| format!("Failed to open template {}", template.display()))?;
    let mut headers = rdr.headers()?.clone();
    let column = match headers.iter().position(|h| h == SENTENCE_COLUMN) {
        Some(i) => i,
        None => {
            headers.push_field(SENTENCE_COLUMN);
            headers.len() - 1
        }
    };

    let records = rdr
        .records()
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Failed to read template {}", template.display()))?;
    let aligned = sentences.get(1..).unwrap_or_default();
    if records.len() != aligned.len() {
        bail!(
            "template {} has {} rows but {} sentences were extracted",
            template.display(),
            records.len(),
            aligned.len()
        );
    }

    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(out)
        .with_context(|| format!("Failed to create {}", out.display()))?;
    wtr.write_record(&headers)?;
    for (record, sentence) in records.iter().zip(aligned) {
        let mut fields: Vec<&str> = record.iter().collect();
        fields.resize(headers.len(), "");
        fields[column] = sentence.as_str();
        wtr.write_record(&fields)?;
    }
    wtr.flush()?;

    info!("Filled {} template rows into {}", records.len(), out.display());
    Ok(records.len())
}

pub fn fill_annotation(
    template: &Path,
    master: &[MasterRecord],
    layout_dir: &Path,
    config: &SegmenterConfig,
    out: &Path,
) -> Result<usize> {
    let sentences = collect_sentences(master, layout_dir, config)?;
    fill_template(template, &sentences, out)
}

// ── Tests ──
