use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use super::books;
use super::lines::RawLine;
use super::reference::CHAPTER_HEADING_RE;

static CHAPTER_VERSE_START_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[:.]\d+").unwrap());
// "1 No", "1. No", "1 - No"
static VERSE_START_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+(?:\s+|\.\s*|\s*[-–]\s*)\p{L}").unwrap());

static NOISE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // bare page numbers: "12", "- 12 -"
        r"^[-–—\s]*\d{1,4}[-–—\s]*$",
        r"(?i)^(?:p[áa]g(?:ina)?|page|p\.)\s*\d+(?:\s*(?:de|of|/)\s*\d+)?$",
        r"[©®℗]",
        r"(?i)\b(?:copyright|editora|tradu[çc][ãa]o|edi[çc][ãa]o|p[áa]gina)\b",
        r"(?i)(?:https?://|www\.)\S+",
        r"(?i)all rights reserved|todos os direitos reservados",
        // roman numerals on their own
        r"(?i)^M{0,4}(?:CM|CD|D?C{0,3})(?:XC|XL|L?X{0,3})(?:IX|IV|V?I{0,3})\.?$",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

const METADATA_KEYWORDS: &[&str] = &[
    "sociedade bíblica",
    "imprensa bíblica",
    "bibliaonline",
    "biblia online",
    "bíblia online",
    "isbn",
    "thomas nelson",
    "zondervan",
    "crossway",
    "vida nova",
    "mundo cristão",
    "índice",
    "sumário",
    "voltar ao",
    "próximo capítulo",
    "capítulo anterior",
    "table of contents",
    "next chapter",
    "previous chapter",
    "http",
    "www.",
    ".com",
    ".org",
    ".net",
    ".br",
];

const SACRED_TERMS: &[&str] = &[
    "deus", "senhor", "jesus", "cristo", "espírito", "santo", "israel", "amém", "god", "lord",
    "christ", "spirit", "holy", "amen",
];

const CLAUSE_PUNCTUATION: &[char] = &[',', '.', ';', ':'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LineCategory {
    Metadata,
    StructuralMarker,
    VerseContent,
    Title,
    GenericContent,
}

impl LineCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineCategory::Metadata => "Metadata",
            LineCategory::StructuralMarker => "StructuralMarker",
            LineCategory::VerseContent => "VerseContent",
            LineCategory::Title => "Title",
            LineCategory::GenericContent => "GenericContent",
        }
    }
}

impl fmt::Display for LineCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassifiedLine {
    pub line: RawLine,
    pub category: LineCategory,
}

/// Text features shared by every rule, computed once per line.
struct Features<'a> {
    text: &'a str,
    lower: String,
    len: usize,
}

impl<'a> Features<'a> {
    fn new(text: &'a str) -> Self {
        let text = text.trim();
        Self {
            text,
            lower: text.to_lowercase(),
            len: text.chars().count(),
        }
    }
}

type Rule = fn(&Features<'_>, Option<LineCategory>) -> bool;

// Evaluated in order, first match wins.
const RULES: &[(Rule, LineCategory)] = &[
    (is_metadata, LineCategory::Metadata),
    (is_structural, LineCategory::StructuralMarker),
    (is_verse_content, LineCategory::VerseContent),
    (is_title, LineCategory::Title),
];

/// Classify one line given the category of the last non-metadata line.
pub fn classify(text: &str, previous: Option<LineCategory>) -> LineCategory {
    let features = Features::new(text);
    RULES
        .iter()
        .find(|(rule, _)| rule(&features, previous))
        .map(|(_, category)| *category)
        .unwrap_or(LineCategory::GenericContent)
}

/// Context for the next line. Metadata never becomes context.
pub fn next_context(
    previous: Option<LineCategory>,
    current: LineCategory,
) -> Option<LineCategory> {
    if current == LineCategory::Metadata {
        previous
    } else {
        Some(current)
    }
}

/// Classify a document's lines in order, threading the lookback context.
pub fn classify_lines(lines: Vec<RawLine>) -> Vec<ClassifiedLine> {
    let mut context = None;
    lines
        .into_iter()
        .map(|line| {
            let category = classify(&line.text, context);
            debug!(
                page = line.page_number,
                line = line.line_in_page,
                %category,
                "classified line"
            );
            context = next_context(context, category);
            ClassifiedLine { line, category }
        })
        .collect()
}

fn is_metadata(f: &Features<'_>, _: Option<LineCategory>) -> bool {
    f.len < 3
        || (f.len < 5 && f.text.chars().all(|c| c.is_ascii_digit()))
        || NOISE_PATTERNS.iter().any(|re| re.is_match(f.text))
        || METADATA_KEYWORDS.iter().any(|kw| f.lower.contains(kw))
}

fn is_structural(f: &Features<'_>, _: Option<LineCategory>) -> bool {
    CHAPTER_VERSE_START_RE.is_match(f.text)
        || VERSE_START_RE.is_match(f.text)
        || CHAPTER_HEADING_RE.is_match(f.text)
        || (f.len < 50 && books::mentions_book(f.text))
}

fn is_verse_content(f: &Features<'_>, previous: Option<LineCategory>) -> bool {
    previous == Some(LineCategory::StructuralMarker)
        || SACRED_TERMS.iter().any(|term| f.lower.contains(term))
        || (f.len > 30 && f.text.contains(CLAUSE_PUNCTUATION))
}

fn is_title(f: &Features<'_>, _: Option<LineCategory>) -> bool {
    f.len < 100 && (is_upper(f.text) || is_title_case(f.text))
}

fn is_upper(s: &str) -> bool {
    s.chars().any(char::is_uppercase) && !s.chars().any(char::is_lowercase)
}

// Every cased run starts upper-case and continues lower-case.
fn is_title_case(s: &str) -> bool {
    let mut prev_cased = false;
    let mut any_cased = false;
    for c in s.chars() {
        if c.is_uppercase() {
            if prev_cased {
                return false;
            }
            prev_cased = true;
            any_cased = true;
        } else if c.is_lowercase() {
            if !prev_cased {
                return false;
            }
            prev_cased = true;
            any_cased = true;
        } else {
            prev_cased = false;
        }
    }
    any_cased
}
