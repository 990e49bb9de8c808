use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::batch::{Batch, ReadDocument};
use crate::db;
use crate::parser::assemble::VerseRecord;
use crate::parser::classify::ClassifiedLine;
use crate::settings::Settings;

pub const RECORDS_TXT: &str = "dataset.txt";
pub const FULLTEXT_TXT: &str = "fulltext.txt";
pub const RECORDS_JSON: &str = "dataset.json";
pub const BLOCKS_JSON: &str = "blocks.json";
pub const RECORDS_CSV: &str = "dataset.csv";
pub const RECORDS_SQLITE: &str = "dataset.sqlite";
pub const REPORT_JSON: &str = "report.json";

const CSV_HEADER: [&str; 4] = ["book", "chapter", "verse", "text"];

/// Write every artifact for a finished batch. Returns the paths written.
pub fn write_all(batch: &Batch, settings: &Settings, tagged: bool) -> Result<Vec<PathBuf>> {
    let dir = &settings.output_dir;
    fs::create_dir_all(dir)
        .with_context(|| format!("cannot create output dir {}", dir.display()))?;

    let mut written = Vec::new();

    if !batch.documents.is_empty() {
        written.push(write_full_text(&dir.join(FULLTEXT_TXT), &batch.documents)?);
    }

    for (doc, name) in batch.documents.iter().zip(artifact_names(&batch.documents)) {
        if settings.write_debug {
            let path = dir.join(format!("debug_{}.txt", name));
            written.push(write_debug_sample(&path, doc, settings.debug_sample_chars)?);
        }
        if tagged {
            let path = dir.join(format!("lines_{}.txt", name));
            fs::write(&path, tagged_lines(&doc.lines))
                .with_context(|| format!("cannot write {}", path.display()))?;
            written.push(path);
        }
    }

    if !batch.records.is_empty() {
        let path = dir.join(RECORDS_TXT);
        fs::write(&path, records_text(&batch.records))
            .with_context(|| format!("cannot write {}", path.display()))?;
        written.push(path);

        written.push(write_json(&dir.join(RECORDS_JSON), &batch.records)?);
        written.push(write_json(&dir.join(BLOCKS_JSON), &batch.blocks)?);
        written.push(write_csv(&dir.join(RECORDS_CSV), &batch.records)?);

        let path = dir.join(RECORDS_SQLITE);
        db::export(&path, &batch.blocks)?;
        written.push(path);
    }

    written.push(write_json(&dir.join(REPORT_JSON), &batch.report)?);

    info!("Wrote {} files to {}", written.len(), dir.display());
    Ok(written)
}

/// Per-document artifact names. Inputs sharing a file name (from different
/// directories) get `.2`, `.3`... in input order.
fn artifact_names(documents: &[ReadDocument]) -> Vec<String> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    documents
        .iter()
        .map(|doc| {
            let count = seen.entry(doc.file.as_str()).or_insert(0);
            *count += 1;
            if *count == 1 {
                doc.file.clone()
            } else {
                format!("{}.{}", doc.file, count)
            }
        })
        .collect()
}

/// One line per record: `Gênesis 1:1 No princípio...`.
pub fn records_text(records: &[VerseRecord]) -> String {
    let mut out = String::new();
    for r in records {
        let label = r.label();
        if label.is_empty() {
            out.push_str(&r.text);
        } else {
            out.push_str(&format!("{} {}", label, r.text));
        }
        out.push('\n');
    }
    out
}

/// `[p<page>:<line>] <Category> | text`, one per classified line.
pub fn tagged_lines(lines: &[ClassifiedLine]) -> String {
    lines
        .iter()
        .map(|l| {
            format!(
                "[p{}:{}] {:<16} | {}\n",
                l.line.page_number, l.line.line_in_page, l.category, l.line.text
            )
        })
        .collect()
}

fn write_full_text(path: &Path, documents: &[ReadDocument]) -> Result<PathBuf> {
    let mut out = String::new();
    for doc in documents {
        out.push_str(&format!("--- begin: {} ---\n\n", doc.file));
        out.push_str(&doc.text);
        out.push_str(&format!("\n\n--- end: {} ---\n\n", doc.file));
    }
    fs::write(path, out).with_context(|| format!("cannot write {}", path.display()))?;
    Ok(path.to_path_buf())
}

fn write_debug_sample(path: &Path, doc: &ReadDocument, max_chars: usize) -> Result<PathBuf> {
    let sample: String = doc.text.chars().take(max_chars).collect();
    let mut f = fs::File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
    writeln!(f, "=== text extracted from {} ===\n", doc.file)?;
    f.write_all(sample.as_bytes())?;
    writeln!(f, "\n\n=== end of sample ===")?;
    Ok(path.to_path_buf())
}

fn write_json<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> Result<PathBuf> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("cannot write {}", path.display()))?;
    Ok(path.to_path_buf())
}

fn write_csv(path: &Path, records: &[VerseRecord]) -> Result<PathBuf> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("cannot create {}", path.display()))?;
    wtr.write_record(CSV_HEADER)?;
    for r in records {
        wtr.write_record([
            r.book.clone().unwrap_or_default(),
            r.chapter.map(|c| c.to_string()).unwrap_or_default(),
            r.verse.map(|v| v.to_string()).unwrap_or_default(),
            r.text.clone(),
        ])?;
    }
    wtr.flush()?;
    Ok(path.to_path_buf())
}
