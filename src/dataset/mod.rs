pub mod annotate;
pub mod labels;
pub mod split;

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// One row of the document master table.
#[derive(Debug, Clone, Deserialize)]
pub struct MasterRecord {
    #[serde(default)]
    pub ignore: Option<f64>,
    pub stock_code: String,
    #[serde(default)]
    pub url: String,
    pub basename: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub polarity: String,
}

impl MasterRecord {
    /// Layout dump expected for this document inside `dir`.
    pub fn layout_path(&self, dir: &Path) -> PathBuf {
        dir.join(Path::new(&self.basename).with_extension("json"))
    }
}

/// One annotated sentence row; blank cells read as empty strings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnnotatedRow {
    pub doc_id: String,
    pub target: String,
    pub label1: String,
    pub label2: String,
    pub label3: String,
    pub label4: String,
    pub prime: String,
    pub polarity: String,
    pub sentence: String,
}

/// A finished evaluation example.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Example {
    pub doc_id: String,
    pub stock_code: String,
    pub sentence: String,
    pub label: String,
    pub prime: String,
    pub polarity: String,
}

/// Read the master CSV, dropping ignored rows and reducing polarity to its
/// leading character.
pub fn read_master(path: &Path) -> Result<Vec<MasterRecord>> {
    let mut rdr = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open master table {}", path.display()))?;
    let mut rows = Vec::new();
    for (i, rec) in rdr.deserialize::<MasterRecord>().enumerate() {
        let mut rec = rec.with_context(|| format!("{}: bad row {}", path.display(), i + 1))?;
        if rec.ignore == Some(1.0) {
            continue;
        }
        rec.polarity = rec.polarity.chars().take(1).collect();
        rows.push(rec);
    }
    info!("Loaded {} documents from {}", rows.len(), path.display());
    Ok(rows)
}

pub fn read_annotated(path: &Path) -> Result<Vec<AnnotatedRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .with_context(|| format!("Failed to open annotations {}", path.display()))?;
    rdr.deserialize::<AnnotatedRow>()
        .enumerate()
        .map(|(i, r)| r.with_context(|| format!("{}: bad row {}", path.display(), i + 1)))
        .collect()
}

pub fn stock_codes(master: &[MasterRecord]) -> HashMap<String, String> {
    master
        .iter()
        .map(|r| (r.basename.clone(), r.stock_code.clone()))
        .collect()
}

/// Turn annotated rows into dev and test examples.
pub fn build_examples(
    rows: &[AnnotatedRow],
    stock_codes: &HashMap<String, String>,
    dev_docs: &HashSet<String>,
) -> Result<(Vec<Example>, Vec<Example>)> {
    let mut dev = Vec::new();
    let mut test = Vec::new();

    for row in rows {
        // per-document separator rows
        if row.target == "target" || row.target == "0" {
            continue;
        }

        let basename = format!("{}.pdf", row.doc_id);
        let stock_code = stock_codes
            .get(&basename)
            .with_context(|| format!("No master entry for document {}", row.doc_id))?;

        let label = labels::resolve_label([
            row.label1.as_str(),
            row.label2.as_str(),
            row.label3.as_str(),
            row.label4.as_str(),
        ]);
        let example = Example {
            doc_id: row.doc_id.clone(),
            stock_code: stock_code.clone(),
            sentence: row.sentence.replace('*', "＊").replace('+', "＋"),
            label: labels::causality(label)?.to_string(),
            prime: row.prime.clone(),
            polarity: labels::polarity(&row.polarity)?.to_string(),
        };

        if dev_docs.contains(&basename) {
            dev.push(example);
        } else {
            test.push(example);
        }
    }
    Ok((dev, test))
}

/// One JSON object per line, UTF-8 as is.
pub fn write_jsonl(path: &Path, examples: &[Example]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    for example in examples {
        serde_json::to_writer(&mut out, example)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

/// Split documents, build examples and write `dev.jsonl` / `test.jsonl`.
pub fn build_dataset(annotated: &Path, master: &[MasterRecord], out_dir: &Path) -> Result<(usize, usize)> {
    let rows = read_annotated(annotated)?;
    let docs = split::split_documents(master)?;
    let dev_docs: HashSet<String> = docs.dev.into_iter().collect();
    let (dev, test) = build_examples(&rows, &stock_codes(master), &dev_docs)?;

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;
    write_jsonl(&out_dir.join("dev.jsonl"), &dev)?;
    write_jsonl(&out_dir.join("test.jsonl"), &test)?;
    info!("Wrote {} dev and {} test examples to {}", dev.len(), test.len(), out_dir.display());
    Ok((dev.len(), test.len()))
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn row(doc_id: &str, target: &str, votes: [&str; 4], polarity: &str, sentence: &str) -> AnnotatedRow {
        AnnotatedRow {
            doc_id: doc_id.to_string(),
            target: target.to_string(),
            label1: votes[0].to_string(),
            label2: votes[1].to_string(),
            label3: votes[2].to_string(),
            label4: votes[3].to_string(),
            prime: String::new(),
            polarity: polarity.to_string(),
            sentence: sentence.to_string(),
        }
    }

    #[test]
    fn master_drops_ignored_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("master.csv");
        std::fs::write(
            &path,
            "ignore,stock_code,url,basename,industry,polarity\n\
             ,1301,http://a,a.pdf,水産,増収増益\n\
             1,1302,http://b,b.pdf,水産,減収\n\
             0,1303,http://c,c.pdf,鉱業,減益\n",
        )
        .unwrap();

        let rows = read_master(&path).unwrap();
        let names: Vec<&str> = rows.iter().map(|r| r.basename.as_str()).collect();
        assert_eq!(names, vec!["a.pdf", "c.pdf"]);
        assert_eq!(rows[0].polarity, "増");
        assert_eq!(rows[1].polarity, "減");
        assert_eq!(rows[0].layout_path(Path::new("layouts")), Path::new("layouts/a.json"));
    }

    #[test]
    fn examples_are_routed_and_normalised() {
        let codes = HashMap::from([
            ("a.pdf".to_string(), "1301".to_string()),
            ("b.pdf".to_string(), "1302".to_string()),
        ]);
        let dev_docs = HashSet::from(["a.pdf".to_string()]);
        let implicit = "暗黙的な業績要因";
        let rows = vec![
            row("a", "target", ["", "", "", ""], "", "sentence"),
            row("a", "1", [implicit, implicit, implicit, "業績"], "++", "売上*が+増加。"),
            row("b", "0", ["", "", "", ""], "", "対象外。"),
            row("b", "1", ["業績", implicit, "", "業績"], "+-", "利益。"),
        ];

        let (dev, test) = build_examples(&rows, &codes, &dev_docs).unwrap();
        assert_eq!(dev.len(), 1);
        assert_eq!(dev[0].sentence, "売上＊が＋増加。");
        assert_eq!(dev[0].label, "正例");
        assert_eq!(dev[0].polarity, "+");
        assert_eq!(test.len(), 1);
        assert_eq!(test[0].stock_code, "1302");
        assert_eq!(test[0].label, "負例");
        assert_eq!(test[0].polarity, "?");
    }

    #[test]
    fn unknown_document_is_an_error() {
        let rows = vec![row("zzz", "1", ["", "", "", ""], "", "文。")];
        assert!(build_examples(&rows, &HashMap::new(), &HashSet::new()).is_err());
    }

    #[test]
    fn jsonl_keeps_japanese_unescaped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dev.jsonl");
        let example = Example {
            doc_id: "a".into(),
            stock_code: "1301".into(),
            sentence: "増収。".into(),
            label: "正例".into(),
            prime: String::new(),
            polarity: "+".into(),
        };
        write_jsonl(&path, &[example.clone(), example]).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            r#"{"doc_id":"a","stock_code":"1301","sentence":"増収。","label":"正例","prime":"","polarity":"+"}"#
        );
    }
}
