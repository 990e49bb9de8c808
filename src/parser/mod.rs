pub mod assemble;
pub mod books;
pub mod chunk;
pub mod classify;
pub mod lines;
pub mod reference;

use assemble::VerseRecord;
use classify::ClassifiedLine;

pub struct DocumentOutput {
    pub lines: Vec<ClassifiedLine>,
    pub records: Vec<VerseRecord>,
    pub structural_lines: usize,
    pub orphan_lines: usize,
    /// False when nothing was recovered and `records` holds the raw text.
    pub structured: bool,
}

/// Three-pass pipeline: pages → numbered lines → classified lines → records.
pub fn process_document(source_file: &str, pages: &[Vec<String>]) -> DocumentOutput {
    let classified = classify::classify_lines(lines::from_pages(source_file, pages));
    let assembly = assemble::assemble(&classified);

    let structured = !assembly.records.is_empty();
    let records = if structured {
        assembly.records
    } else {
        vec![VerseRecord::unstructured(full_text(pages))]
    };

    DocumentOutput {
        lines: classified,
        records,
        structural_lines: assembly.structural_lines,
        orphan_lines: assembly.orphan_lines,
        structured,
    }
}

/// Pages joined back into one text, blank line between pages.
pub fn full_text(pages: &[Vec<String>]) -> String {
    pages
        .iter()
        .map(|page| page.join("\n"))
        .collect::<Vec<_>>()
        .join("\n\n")
        .trim()
        .to_string()
}
