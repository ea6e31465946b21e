mod config;
mod dataset;
mod parser;

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::warn;

use config::SegmenterConfig;
use parser::sections::Partition;

#[derive(Parser)]
#[command(
    name = "tanshin_ssplit",
    about = "Rebuild disclosure text from layout dumps and split it into sentences"
)]
struct Cli {
    /// JSON file overriding the section search settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the partitions of one document and its target subsection text
    Extract {
        /// Layout dump (JSON)
        layout: PathBuf,
    },
    /// Split text into sentences, one per output line
    Split {
        /// Text file (default: stdin)
        file: Option<PathBuf>,
    },
    /// Sentences of many documents as JSON lines
    Sentences {
        /// Layout dumps (JSON)
        #[arg(required = true)]
        layouts: Vec<PathBuf>,
    },
    /// Fill the sentence column of an annotation template
    Annotate {
        /// Annotation template (TSV)
        template: PathBuf,
        /// Document master table (CSV)
        master: PathBuf,
        /// Directory of layout dumps named after the master's basenames
        layout_dir: PathBuf,
        /// Output TSV
        out: PathBuf,
    },
    /// Build dev/test JSONL from annotated sentences
    Dataset {
        /// Annotated sentences (TSV)
        annotated: PathBuf,
        /// Document master table (CSV)
        master: PathBuf,
        /// Output directory
        out_dir: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let config = SegmenterConfig::load(cli.config.as_deref())?;

    let result = match cli.command {
        Commands::Extract { layout } => {
            let pages = parser::load_document(&layout)?;
            for (i, p) in pages.iter().enumerate() {
                let kept = p.lines.iter().filter(|l| !l.exclude).count();
                println!(
                    "page {:>3}  {:.0}x{:.0}  {:>3}/{:<3} lines  {} boxes",
                    i + 1,
                    p.width,
                    p.height,
                    kept,
                    p.lines.len(),
                    p.boxes.len()
                );
            }
            let sections = parser::sections::extract(&pages, &config);
            println!();
            for (kind, pages) in sections.iter() {
                println!("{:<8} {:>3} pages", partition_name(kind), pages.len());
            }
            println!("\n{}", parser::page::flatten(&sections.target));
            Ok(())
        }
        Commands::Split { file } => {
            let text = read_text(file.as_deref())?;
            for sentence in parser::ssplit::split(&text) {
                println!("{}", sentence);
            }
            Ok(())
        }
        Commands::Sentences { layouts } => {
            let stdout = std::io::stdout();
            let (total, skipped) = write_sentences(&layouts, &config, &mut stdout.lock())?;
            eprintln!(
                "{} sentences from {} documents ({} skipped)",
                total,
                layouts.len() - skipped,
                skipped
            );
            Ok(())
        }
        Commands::Annotate {
            template,
            master,
            layout_dir,
            out,
        } => {
            let master = dataset::read_master(&master)?;
            let rows = dataset::annotate::fill_annotation(&template, &master, &layout_dir, &config, &out)?;
            println!("Filled {} rows into {}", rows, out.display());
            Ok(())
        }
        Commands::Dataset {
            annotated,
            master,
            out_dir,
        } => {
            let master = dataset::read_master(&master)?;
            let (dev, test) = dataset::build_dataset(&annotated, &master, &out_dir)?;
            println!("Saved {} dev and {} test examples.", dev, test);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn partition_name(kind: Partition) -> &'static str {
    match kind {
        Partition::Precede => "precede",
        Partition::Target => "target",
        Partition::Succeed => "succeed",
    }
}

fn read_text(file: Option<&Path>) -> anyhow::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

/// One JSON line per sentence. A document that fails to load is skipped with a
/// warning; returns the sentence count and the number of skipped documents.
fn write_sentences(
    layouts: &[PathBuf],
    config: &SegmenterConfig,
    out: &mut impl Write,
) -> anyhow::Result<(usize, usize)> {
    use indicatif::{ProgressBar, ProgressStyle};
    use rayon::prelude::*;

    let pb = ProgressBar::new(layouts.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );

    let mut total = 0;
    let mut skipped = 0;
    for chunk in layouts.chunks(64) {
        let results: Vec<_> = chunk
            .par_iter()
            .map(|path| parser::process_document(path, config))
            .collect();

        for (path, result) in chunk.iter().zip(results) {
            let sentences = match result {
                Ok(sentences) => sentences,
                Err(e) => {
                    pb.suspend(|| warn!("Skipping {}: {:#}", path.display(), e));
                    skipped += 1;
                    continue;
                }
            };
            let document = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            for s in sentences {
                let line = serde_json::json!({
                    "document": document,
                    "section": s.section,
                    "sentence": s.sentence,
                });
                pb.suspend(|| writeln!(out, "{}", line))?;
                total += 1;
            }
        }
        pb.inc(chunk.len() as u64);
    }

    pb.finish_and_clear();
    Ok((total, skipped))
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
