use serde::{Deserialize, Serialize};
use tracing::debug;

use super::books;
use super::classify::{ClassifiedLine, LineCategory};
use super::reference::{self, Reference};

/// One recovered verse. Fields that could not be recovered are absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verse: Option<u32>,
    pub text: String,
}

impl VerseRecord {
    /// Whole-document passthrough used when no structure was found.
    pub fn unstructured(text: impl Into<String>) -> Self {
        Self {
            book: None,
            chapter: None,
            verse: None,
            text: text.into(),
        }
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// `Gênesis 1:1`, `1:1`, `Gênesis 1` ... whatever is known.
    pub fn label(&self) -> String {
        let address = match (self.chapter, self.verse) {
            (Some(c), Some(v)) => Some(format!("{}:{}", c, v)),
            (Some(c), None) => Some(c.to_string()),
            (None, Some(v)) => Some(format!(":{}", v)),
            (None, None) => None,
        };
        [self.book.clone(), address]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Default)]
pub struct Assembly {
    pub records: Vec<VerseRecord>,
    pub structural_lines: usize,
    pub orphan_lines: usize,
}

/// What a verse-start or chapter-start line changes.
#[derive(Debug)]
enum Marker {
    /// Opens a verse. A missing book or chapter keeps the current one.
    Verse {
        book: Option<String>,
        chapter: Option<u32>,
        verse: u32,
        text: Option<String>,
    },
    Heading {
        book: Option<String>,
        chapter: Option<u32>,
    },
}

#[derive(Default)]
struct Cursor {
    book: Option<String>,
    chapter: Option<u32>,
    open: Option<VerseRecord>,
}

impl Cursor {
    fn close(&mut self, records: &mut Vec<VerseRecord>) {
        if let Some(mut record) = self.open.take() {
            record.text = record.text.trim().to_string();
            records.push(record);
        }
    }

    /// None when the line carries no usable reference.
    fn read_marker(&self, text: &str) -> Option<Marker> {
        if let Some(marker) = full_reference(text) {
            return Some(marker);
        }

        let heading = reference::extract_chapter_heading(text);
        if heading.chapter.is_some() {
            return Some(Marker::Heading {
                book: heading.book.as_deref().map(books::normalize_book),
                chapter: heading.chapter,
            });
        }

        // Before `extract`, which would read "1 SAMUEL" as verse 1.
        if let Some((book, chapter)) = books::numbered_book_header(text) {
            return Some(Marker::Heading {
                book: Some(book.to_string()),
                chapter,
            });
        }

        match reference::extract(text) {
            Reference {
                chapter: Some(chapter),
                verse: Some(verse),
                verse_text,
                ..
            } => Some(Marker::Verse {
                book: None,
                chapter: Some(chapter),
                verse,
                text: verse_text,
            }),
            Reference {
                book: Some(book),
                chapter: Some(chapter),
                ..
            } => Some(Marker::Heading {
                book: Some(books::normalize_book(&book)),
                chapter: Some(chapter),
            }),
            // A verse number alone means nothing until a chapter is known.
            Reference {
                verse: Some(verse),
                verse_text,
                ..
            } if self.chapter.is_some() => Some(Marker::Verse {
                book: None,
                chapter: None,
                verse,
                text: verse_text,
            }),
            _ => book_header(text).map(|book| Marker::Heading {
                book: Some(book.to_string()),
                chapter: None,
            }),
        }
    }

    fn apply(&mut self, marker: Marker, records: &mut Vec<VerseRecord>) {
        self.close(records);
        match marker {
            Marker::Verse {
                book,
                chapter,
                verse,
                text,
            } => {
                self.move_to(book, chapter);
                self.open = Some(VerseRecord {
                    book: self.book.clone(),
                    chapter: self.chapter,
                    verse: Some(verse),
                    text: text.unwrap_or_default(),
                });
            }
            Marker::Heading { book, chapter } => self.move_to(book, chapter),
        }
    }

    // A different book forgets the chapter.
    fn move_to(&mut self, book: Option<String>, chapter: Option<u32>) {
        if let Some(book) = book {
            if self.book.as_deref() != Some(book.as_str()) {
                self.chapter = None;
            }
            self.book = Some(book);
        }
        if chapter.is_some() {
            self.chapter = chapter;
        }
    }

    fn append(&mut self, text: &str) -> bool {
        match self.open.as_mut() {
            Some(record) => {
                if !record.text.is_empty() {
                    record.text.push(' ');
                }
                record.text.push_str(text.trim());
                true
            }
            None => false,
        }
    }
}

/// `<book> <c>:<v> text` where the book is a canonical one, so prose that
/// quotes a reference mid-sentence does not start a verse.
fn full_reference(text: &str) -> Option<Marker> {
    let full = reference::extract_full(text);
    let book = books::canonical_name(full.book.as_deref()?)?;
    Some(Marker::Verse {
        book: Some(book.to_string()),
        chapter: full.chapter,
        verse: full.verse?,
        text: full.verse_text,
    })
}

/// A line that is just a book name, or an all-caps heading naming one.
fn book_header(text: &str) -> Option<&'static str> {
    if let Some(book) = books::canonical_name(text) {
        return Some(book);
    }
    let all_caps = text.chars().any(char::is_uppercase) && !text.chars().any(char::is_lowercase);
    if all_caps {
        books::find_book(text)
    } else {
        None
    }
}

/// Walk classified lines and build verse records, joining verse text that
/// continues over several physical lines.
pub fn assemble(lines: &[ClassifiedLine]) -> Assembly {
    let mut assembly = Assembly::default();
    let mut cursor = Cursor::default();

    for cl in lines {
        if cl.category == LineCategory::Metadata {
            continue;
        }
        let structural = cl.category == LineCategory::StructuralMarker;
        // A full `<book> <c>:<v>` line starts a verse whatever its category.
        let marker = if structural {
            cursor.read_marker(&cl.line.text)
        } else {
            full_reference(&cl.line.text)
        };
        if structural || marker.is_some() {
            assembly.structural_lines += 1;
        }

        match marker {
            Some(marker) => cursor.apply(marker, &mut assembly.records),
            None => {
                if structural {
                    debug!(
                        page = cl.line.page_number,
                        line = cl.line.line_in_page,
                        text = %cl.line.text,
                        "structural line without usable reference, kept as text"
                    );
                }
                if !cursor.append(&cl.line.text) {
                    assembly.orphan_lines += 1;
                }
            }
        }
    }
    cursor.close(&mut assembly.records);

    assembly
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::classify::classify_lines;
    use crate::parser::lines;

    fn run(text: &str) -> Assembly {
        let pages = vec![lines::split_page(text)];
        assemble(&classify_lines(lines::from_pages("test.pdf", &pages)))
    }

    fn rec(book: &str, chapter: u32, verse: u32, text: &str) -> VerseRecord {
        VerseRecord {
            book: Some(book.to_string()),
            chapter: Some(chapter),
            verse: Some(verse),
            text: text.to_string(),
        }
    }

    #[test]
    fn book_chapter_then_verses() {
        let a = run("GÊNESIS 1\n1 No princípio criou Deus os céus e a terra.\n2 E a terra era sem forma e vazia;");
        assert_eq!(
            a.records,
            vec![
                rec("Gênesis", 1, 1, "No princípio criou Deus os céus e a terra."),
                rec("Gênesis", 1, 2, "E a terra era sem forma e vazia;"),
            ]
        );
    }

    #[test]
    fn continuation_lines_are_joined() {
        let a = run("Gênesis 1\n1 No princípio criou Deus\n   os céus   \ne a terra.\n2 E a terra era sem forma");
        assert_eq!(a.records.len(), 2);
        assert_eq!(a.records[0].text, "No princípio criou Deus os céus e a terra.");
    }

    #[test]
    fn metadata_inside_a_verse_is_skipped() {
        let a = run("Gênesis 1\n1 No princípio criou Deus\n- 12 -\nos céus e a terra.");
        assert_eq!(a.records.len(), 1);
        assert_eq!(a.records[0].text, "No princípio criou Deus os céus e a terra.");
    }

    #[test]
    fn chapter_verse_lines_carry_their_chapter() {
        let a = run("Salmos 23\n23:1 O Senhor é o meu pastor\n23:2 Deitar-me faz");
        assert_eq!(a.records[0], rec("Salmos", 23, 1, "O Senhor é o meu pastor"));
        assert_eq!(a.records[1].verse, Some(2));
    }

    #[test]
    fn full_reference_lines() {
        let a = run("João 3:16 Porque Deus amou o mundo\nde tal maneira que deu o seu Filho unigênito");
        assert_eq!(
            a.records,
            vec![rec(
                "João",
                3,
                16,
                "Porque Deus amou o mundo de tal maneira que deu o seu Filho unigênito"
            )]
        );
    }

    #[test]
    fn long_full_reference_line_is_still_a_verse() {
        let a = run("Gênesis 1:1 No princípio criou Deus os céus e a terra, e tudo o que neles há.");
        assert_eq!(a.records.len(), 1);
        assert_eq!(a.records[0].book.as_deref(), Some("Gênesis"));
        assert_eq!(a.structural_lines, 1);
    }

    #[test]
    fn chapter_heading_sets_chapter() {
        let a = run("RUTE\nCAPÍTULO 2\n1 Tinha Noemi um parente de seu marido");
        assert_eq!(a.records, vec![rec("Rute", 2, 1, "Tinha Noemi um parente de seu marido")]);
    }

    #[test]
    fn verse_numbers_need_a_chapter() {
        let a = run("1 No princípio criou Deus\n2 E a terra era sem forma");
        assert!(a.records.is_empty());
        assert_eq!(a.structural_lines, 2);
        assert_eq!(a.orphan_lines, 2);
    }

    #[test]
    fn verses_before_any_book_have_no_book() {
        let a = run("1:1 No princípio criou Deus");
        assert_eq!(a.records.len(), 1);
        assert!(a.records[0].book.is_none());
        assert_eq!(a.records[0].chapter, Some(1));
    }

    #[test]
    fn new_book_resets_chapter() {
        let a = run("Gênesis 50\n26 E morreu José\nÊXODO\n1 Estes pois são os nomes");
        assert_eq!(a.records.len(), 1);
        assert_eq!(a.records[0].book.as_deref(), Some("Gênesis"));
    }

    #[test]
    fn continuation_naming_a_book_stays_in_the_verse() {
        let a = run("Daniel 2\n25 Então Arioque depressa introduziu\na Daniel na presença do rei,\ne disse-lhe assim: Achei um dos cativos");
        assert_eq!(
            a.records,
            vec![rec(
                "Daniel",
                2,
                25,
                "Então Arioque depressa introduziu a Daniel na presença do rei, e disse-lhe assim: Achei um dos cativos"
            )]
        );
        assert_eq!(a.orphan_lines, 0);
    }

    #[test]
    fn numbered_book_header_switches_book() {
        let a = run("Rute 4\n22 E Obede gerou a Jessé\n1 SAMUEL\nCAPÍTULO 1\n1 Houve um homem de Ramataim");
        assert_eq!(
            a.records,
            vec![
                rec("Rute", 4, 22, "E Obede gerou a Jessé"),
                rec("1 Samuel", 1, 1, "Houve um homem de Ramataim"),
            ]
        );
    }

    #[test]
    fn numbered_book_and_chapter_header() {
        let a = run("1 João 2\n29 Se sabeis que ele é justo\n1 João 3\n1 Vede quão grande amor");
        assert_eq!(
            a.records,
            vec![
                rec("1 João", 2, 29, "Se sabeis que ele é justo"),
                rec("1 João", 3, 1, "Vede quão grande amor"),
            ]
        );
    }

    #[test]
    fn dotted_and_dashed_verse_numbers() {
        let a = run("Gênesis 1\n1. No princípio criou Deus os céus e a terra.\n2. E a terra era sem forma e vazia;\n3 - E disse Deus: Haja luz.");
        assert_eq!(
            a.records,
            vec![
                rec("Gênesis", 1, 1, "No princípio criou Deus os céus e a terra."),
                rec("Gênesis", 1, 2, "E a terra era sem forma e vazia;"),
                rec("Gênesis", 1, 3, "E disse Deus: Haja luz."),
            ]
        );
    }

    #[test]
    fn quoted_reference_in_prose_is_continuation() {
        let a = run("Marcos 1\n2 Como está escrito nos profetas:\nComo está escrito em Isaías 40:3 Voz do que clama no deserto\n3 Preparai o caminho do Senhor");
        assert_eq!(a.records.len(), 2);
        assert_eq!(
            a.records[0],
            rec(
                "Marcos",
                1,
                2,
                "Como está escrito nos profetas: Como está escrito em Isaías 40:3 Voz do que clama no deserto"
            )
        );
        assert_eq!(a.records[1], rec("Marcos", 1, 3, "Preparai o caminho do Senhor"));
    }

    #[test]
    fn duplicates_are_preserved() {
        let a = run("Gênesis 1\n1 No princípio\n1 No princípio");
        assert_eq!(a.records.len(), 2);
        assert_eq!(a.records[0], a.records[1]);
    }

    #[test]
    fn orphan_text_is_counted() {
        let a = run("Prefácio do tradutor ao leitor\nGênesis 1\n1 No princípio");
        assert_eq!(a.orphan_lines, 1);
        assert_eq!(a.records.len(), 1);
    }

    #[test]
    fn unstructured_text_yields_nothing() {
        let a = run("Uma receita de bolo\nmisture a farinha com ovos, leite e açúcar até ficar homogêneo");
        assert!(a.records.is_empty());
        assert_eq!(a.structural_lines, 0);
    }

    #[test]
    fn labels() {
        assert_eq!(rec("Gênesis", 1, 2, "x").label(), "Gênesis 1:2");
        assert_eq!(VerseRecord::unstructured("x").label(), "");
    }

    #[test]
    fn record_json_omits_missing_fields() {
        let json = serde_json::to_value(VerseRecord::unstructured("texto")).unwrap();
        assert_eq!(json, serde_json::json!({ "text": "texto" }));
    }
}
