use std::path::Path;

use lopdf::Document;
use tracing::{debug, info};

use crate::error::DocumentError;
use crate::parser::lines;

/// Anything that can turn a document into pages of raw text lines.
pub trait PageSource: Sync {
    fn pages(&self, path: &Path) -> Result<Vec<Vec<String>>, DocumentError>;
}

/// Reads `.pdf` through lopdf and `.txt` as form-feed separated pages.
pub struct FileSource;

impl PageSource for FileSource {
    fn pages(&self, path: &Path) -> Result<Vec<Vec<String>>, DocumentError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        let pages = match ext.as_str() {
            "pdf" => pdf_pages(path)?,
            "txt" => text_pages(path)?,
            _ => return Err(DocumentError::Unsupported(path.display().to_string())),
        };

        if pages.iter().flatten().all(|l| l.trim().is_empty()) {
            return Err(DocumentError::NoText);
        }
        Ok(pages)
    }
}

fn pdf_pages(path: &Path) -> Result<Vec<Vec<String>>, DocumentError> {
    let doc = Document::load(path)?;
    let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
    info!("Opened {} ({} pages)", path.display(), page_numbers.len());

    let mut pages = Vec::with_capacity(page_numbers.len());
    for number in page_numbers {
        let text = doc.extract_text(&[number])?;
        debug!(page = number, chars = text.chars().count(), "page text extracted");
        pages.push(lines::split_page(&text));
    }
    Ok(pages)
}

fn text_pages(path: &Path) -> Result<Vec<Vec<String>>, DocumentError> {
    let text = std::fs::read_to_string(path)?;
    Ok(text.split('\u{0C}').map(lines::split_page).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn text_file_pages_split_on_form_feed() {
        let pages = FileSource.pages(Path::new("tests/fixtures/genesis.txt")).unwrap();
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0][1], "GÊNESIS");
    }

    #[test]
    fn extension_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("SALMOS.TXT");
        std::fs::write(&path, "Salmos 1\n1 Bem-aventurado o varão").unwrap();
        assert_eq!(FileSource.pages(&path).unwrap().len(), 1);
    }

    #[test]
    fn unsupported_extension() {
        let err = FileSource.pages(Path::new("notes.docx")).unwrap_err();
        assert!(matches!(err, DocumentError::Unsupported(_)));
    }

    #[test]
    fn missing_text_file() {
        let err = FileSource.pages(Path::new("tests/fixtures/missing.txt")).unwrap_err();
        assert!(matches!(err, DocumentError::Read(_)));
    }

    #[test]
    fn blank_document_has_no_text() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        write!(file, "  \n\u{0C}\n\n").unwrap();
        let err = FileSource.pages(file.path()).unwrap_err();
        assert!(matches!(err, DocumentError::NoText));
    }

    #[test]
    fn garbage_pdf_is_an_error() {
        let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        write!(file, "definitely not a pdf").unwrap();
        let err = FileSource.pages(file.path()).unwrap_err();
        assert!(matches!(err, DocumentError::Pdf(_) | DocumentError::Read(_)));
    }
}
