use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::Serialize;

static CHAPTER_VERSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)[:.](\d+)\s*(.*)$").unwrap());
static BOOK_CHAPTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([\p{L}\s]+)\s+(\d+)$").unwrap());
static VERSE_TEXT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)\s+(.*)$").unwrap());
// "1. No princípio", "1 - No princípio"
static PUNCTUATED_VERSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)(?:\.|\s*[-–])\s*(\p{L}.*)$").unwrap());
static FULL_REFERENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^((?:[1-3]\s?)?[\p{L}\-]+(?:\s+[\p{L}\-]+)*)\s+(\d+):(\d+)(?:\s+(.*))?$").unwrap()
});
pub(crate) static CHAPTER_HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:([\p{L}\s]+?)\s+)?(?:cap[íi]tulo|chapter)\s+(\d+)$").unwrap()
});

/// Whatever part of a book/chapter/verse address a line gave up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Reference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verse: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verse_text: Option<String>,
}

impl Reference {
    pub fn is_empty(&self) -> bool {
        self.book.is_none()
            && self.chapter.is_none()
            && self.verse.is_none()
            && self.verse_text.is_none()
    }
}

type Alternative = fn(&str) -> Option<Reference>;

/// Per-line alternatives, first match wins. The punctuated form goes before
/// `verse_text` so "3 - E disse" does not keep the dash as text.
const LINE_ALTERNATIVES: &[Alternative] =
    &[chapter_verse, book_chapter, punctuated_verse, verse_text];

/// Recover a reference from one structural line. No match is an empty Reference.
pub fn extract(text: &str) -> Reference {
    let text = text.trim();
    LINE_ALTERNATIVES
        .iter()
        .find_map(|alt| alt(text))
        .unwrap_or_default()
}

/// One-shot `<book> <chapter>:<verse> <text>` match against a whole line.
pub fn extract_full(text: &str) -> Reference {
    full_reference(text.trim()).unwrap_or_default()
}

/// `CAPÍTULO 3`, `GÊNESIS CAPÍTULO 3`, `Chapter 3`.
pub fn extract_chapter_heading(text: &str) -> Reference {
    let Some(caps) = CHAPTER_HEADING_RE.captures(text.trim()) else {
        return Reference::default();
    };
    let Some(chapter) = number(&caps, 2) else {
        return Reference::default();
    };
    Reference {
        book: caps
            .get(1)
            .map(|m| m.as_str().trim().to_string())
            .filter(|b| !b.is_empty()),
        chapter: Some(chapter),
        ..Reference::default()
    }
}

fn chapter_verse(text: &str) -> Option<Reference> {
    let caps = CHAPTER_VERSE_RE.captures(text)?;
    Some(Reference {
        chapter: Some(number(&caps, 1)?),
        verse: Some(number(&caps, 2)?),
        verse_text: Some(caps[3].trim().to_string()),
        ..Reference::default()
    })
}

fn book_chapter(text: &str) -> Option<Reference> {
    let caps = BOOK_CHAPTER_RE.captures(text)?;
    let book = caps[1].trim();
    if book.is_empty() {
        return None;
    }
    Some(Reference {
        book: Some(book.to_string()),
        chapter: Some(number(&caps, 2)?),
        ..Reference::default()
    })
}

fn verse_text(text: &str) -> Option<Reference> {
    let caps = VERSE_TEXT_RE.captures(text)?;
    Some(Reference {
        verse: Some(number(&caps, 1)?),
        verse_text: Some(caps[2].trim().to_string()),
        ..Reference::default()
    })
}

fn punctuated_verse(text: &str) -> Option<Reference> {
    let caps = PUNCTUATED_VERSE_RE.captures(text)?;
    Some(Reference {
        verse: Some(number(&caps, 1)?),
        verse_text: Some(caps[2].trim().to_string()),
        ..Reference::default()
    })
}

fn full_reference(text: &str) -> Option<Reference> {
    let caps = FULL_REFERENCE_RE.captures(text)?;
    Some(Reference {
        book: Some(caps[1].trim().to_string()),
        chapter: Some(number(&caps, 2)?),
        verse: Some(number(&caps, 3)?),
        verse_text: Some(
            caps.get(4)
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default(),
        ),
    })
}

// Chapters and verses start at 1; anything else counts as no match.
fn number(caps: &Captures<'_>, group: usize) -> Option<u32> {
    caps.get(group)?
        .as_str()
        .parse::<u32>()
        .ok()
        .filter(|n| *n >= 1)
}
