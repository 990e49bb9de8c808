use serde::Serialize;

/// One non-blank line of extracted text, with where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawLine {
    pub source_file: String,
    pub page_number: u32,
    /// Physical position inside the page, blank lines included.
    pub line_in_page: u32,
    /// Position among the non-blank lines of the whole document.
    pub global_line: u32,
    pub text: String,
}

/// Flatten extracted pages into numbered, trimmed, non-blank lines.
pub fn from_pages(source_file: &str, pages: &[Vec<String>]) -> Vec<RawLine> {
    let mut lines = Vec::new();
    let mut global_line = 0u32;

    for (page_idx, page) in pages.iter().enumerate() {
        for (line_idx, raw) in page.iter().enumerate() {
            let text = clean(raw);
            if text.is_empty() {
                continue;
            }
            global_line += 1;
            lines.push(RawLine {
                source_file: source_file.to_string(),
                page_number: page_idx as u32 + 1,
                line_in_page: line_idx as u32 + 1,
                global_line,
                text,
            });
        }
    }

    lines
}

/// Split a page's text into its physical lines.
pub fn split_page(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}

// Strip PDF artifacts (NUL, BOM) and surrounding whitespace.
fn clean(raw: &str) -> String {
    raw.replace(['\u{0}', '\u{FEFF}'], "").trim().to_string()
}
