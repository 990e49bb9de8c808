use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use indicatif::ProgressBar;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::DocumentError;
use crate::parser::assemble::VerseRecord;
use crate::parser::chunk::{self, Block};
use crate::parser::classify::ClassifiedLine;
use crate::parser::{self, DocumentOutput};
use crate::settings::Settings;
use crate::source::PageSource;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DocumentStatus {
    Success { records: usize },
    NoStructure,
    Skipped { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentReport {
    pub file: String,
    #[serde(flatten)]
    pub status: DocumentStatus,
    pub pages: usize,
    pub lines: usize,
}

impl DocumentReport {
    pub fn summary(&self) -> String {
        match &self.status {
            DocumentStatus::Success { records } => {
                format!("ok       {}: {} verses", self.file, records)
            }
            DocumentStatus::NoStructure => {
                format!("no verse {}: no verses detected, raw text kept", self.file)
            }
            DocumentStatus::Skipped { reason } => format!("skipped  {}: {}", self.file, reason),
        }
    }
}

/// A document that was read, whatever came of parsing it.
pub struct ReadDocument {
    pub file: String,
    pub text: String,
    pub lines: Vec<ClassifiedLine>,
    pub records: Vec<VerseRecord>,
}

#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub generated_at: DateTime<Utc>,
    pub max_block_chars: usize,
    pub total_records: usize,
    pub total_blocks: usize,
    pub documents: Vec<DocumentReport>,
}

impl BatchReport {
    pub fn structured_records(&self) -> usize {
        self.documents
            .iter()
            .map(|d| match d.status {
                DocumentStatus::Success { records } => records,
                _ => 0,
            })
            .sum()
    }
}

pub struct Batch {
    pub report: BatchReport,
    pub documents: Vec<ReadDocument>,
    pub records: Vec<VerseRecord>,
    pub blocks: Vec<Block>,
}

/// Process every document independently, then merge in input order.
/// Failures are reported per document and never abort the batch.
pub fn run_batch(
    paths: &[PathBuf],
    source: &dyn PageSource,
    settings: &Settings,
    progress: Option<&ProgressBar>,
) -> Batch {
    let results: Vec<_> = paths
        .par_iter()
        .map(|path| {
            let result = process_file(path, source);
            if let Some(pb) = progress {
                pb.inc(1);
            }
            result
        })
        .collect();

    let mut reports = Vec::with_capacity(results.len());
    let mut documents = Vec::new();
    let mut records = Vec::new();

    for (report, read) in results {
        if let Some(doc) = read {
            records.extend(doc.records.iter().cloned());
            documents.push(doc);
        }
        reports.push(report);
    }

    let blocks = chunk::chunk(&records, settings.max_block_chars);
    info!(
        documents = reports.len(),
        records = records.len(),
        blocks = blocks.len(),
        "Batch finished"
    );

    Batch {
        report: BatchReport {
            generated_at: Utc::now(),
            max_block_chars: settings.max_block_chars,
            total_records: records.len(),
            total_blocks: blocks.len(),
            documents: reports,
        },
        documents,
        records,
        blocks,
    }
}

fn process_file(path: &Path, source: &dyn PageSource) -> (DocumentReport, Option<ReadDocument>) {
    let file = display_name(path);

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let pages = source.pages(path)?;
        let output = parser::process_document(&file, &pages);
        Ok::<_, DocumentError>((pages, output))
    }))
    .unwrap_or_else(|payload| Err(DocumentError::Panicked(panic_message(payload))));

    match outcome {
        Ok((pages, output)) => {
            let status = status_of(&output);
            match &status {
                DocumentStatus::Success { records } => info!("{}: {} verses", file, records),
                _ => warn!(
                    "{}: no verses detected ({} structural lines), keeping raw text",
                    file, output.structural_lines
                ),
            }
            let report = DocumentReport {
                file: file.clone(),
                status,
                pages: pages.len(),
                lines: output.lines.len(),
            };
            let doc = ReadDocument {
                text: parser::full_text(&pages),
                file,
                lines: output.lines,
                records: output.records,
            };
            (report, Some(doc))
        }
        Err(e) => {
            warn!("Skipping {}: {}", file, e);
            let report = DocumentReport {
                file,
                status: DocumentStatus::Skipped {
                    reason: e.to_string(),
                },
                pages: 0,
                lines: 0,
            };
            (report, None)
        }
    }
}

fn status_of(output: &DocumentOutput) -> DocumentStatus {
    if output.structured {
        DocumentStatus::Success {
            records: output.records.len(),
        }
    } else {
        DocumentStatus::NoStructure
    }
}

pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::FileSource;

    struct PanickySource;

    impl PageSource for PanickySource {
        fn pages(&self, path: &Path) -> Result<Vec<Vec<String>>, DocumentError> {
            if path.ends_with("boom.txt") {
                panic!("encoding exploded");
            }
            FileSource.pages(path)
        }
    }

    fn fixture(name: &str) -> PathBuf {
        PathBuf::from("tests/fixtures").join(name)
    }

    #[test]
    fn unreadable_document_does_not_abort_batch() {
        let paths = vec![fixture("genesis.txt"), fixture("missing.pdf")];
        let batch = run_batch(&paths, &FileSource, &Settings::default(), None);

        assert_eq!(batch.report.documents.len(), 2);
        assert_eq!(
            batch.report.documents[0].status,
            DocumentStatus::Success { records: 8 }
        );
        assert!(matches!(
            batch.report.documents[1].status,
            DocumentStatus::Skipped { .. }
        ));
        assert_eq!(batch.records.len(), 8);
        assert_eq!(batch.documents.len(), 1);
    }

    #[test]
    fn outputs_merge_in_input_order() {
        let paths = vec![fixture("salmos.txt"), fixture("genesis.txt")];
        let batch = run_batch(&paths, &FileSource, &Settings::default(), None);
        assert_eq!(batch.records.len(), 14);
        assert_eq!(batch.records[0].book.as_deref(), Some("Salmos"));
        assert_eq!(batch.records[6].book.as_deref(), Some("Gênesis"));
        assert_eq!(batch.report.structured_records(), 14);
    }

    #[test]
    fn no_structure_keeps_raw_text() {
        let paths = vec![fixture("report.txt")];
        let batch = run_batch(&paths, &FileSource, &Settings::default(), None);
        assert_eq!(batch.report.documents[0].status, DocumentStatus::NoStructure);
        assert_eq!(batch.records.len(), 1);
        assert!(batch.records[0].text.starts_with("Relatório trimestral"));
        assert_eq!(batch.report.structured_records(), 0);
    }

    #[test]
    fn panic_is_contained_to_its_document() {
        let paths = vec![fixture("boom.txt"), fixture("salmos.txt")];
        let batch = run_batch(&paths, &PanickySource, &Settings::default(), None);
        match &batch.report.documents[0].status {
            DocumentStatus::Skipped { reason } => assert!(reason.contains("encoding exploded")),
            other => panic!("expected skipped, got {:?}", other),
        }
        assert_eq!(batch.records.len(), 6);
    }

    #[test]
    fn blocks_respect_configured_limit() {
        let settings = Settings {
            max_block_chars: 200,
            ..Settings::default()
        };
        let batch = run_batch(&[fixture("genesis.txt")], &FileSource, &settings, None);
        assert!(batch.blocks.len() > 1);
        assert_eq!(batch.report.total_blocks, batch.blocks.len());
        let total: usize = batch.blocks.iter().map(|b| b.records.len()).sum();
        assert_eq!(total, batch.records.len());
    }

    #[test]
    fn report_serializes_status_inline() {
        let report = DocumentReport {
            file: "a.pdf".into(),
            status: DocumentStatus::Skipped {
                reason: "no extractable text".into(),
            },
            pages: 0,
            lines: 0,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "skipped");
        assert_eq!(json["reason"], "no extractable text");
        assert!(report.summary().starts_with("skipped"));
    }
}
