use std::sync::LazyLock;

use regex::Regex;

/// The 66 canonical books, Portuguese spelling.
pub const BOOKS_PT: &[&str] = &[
    "Gênesis", "Êxodo", "Levítico", "Números", "Deuteronômio", "Josué", "Juízes", "Rute",
    "1 Samuel", "2 Samuel", "1 Reis", "2 Reis", "1 Crônicas", "2 Crônicas", "Esdras",
    "Neemias", "Ester", "Jó", "Salmos", "Provérbios", "Eclesiastes", "Cânticos", "Isaías",
    "Jeremias", "Lamentações", "Ezequiel", "Daniel", "Oseias", "Joel", "Amós", "Obadias",
    "Jonas", "Miqueias", "Naum", "Habacuque", "Sofonias", "Ageu", "Zacarias", "Malaquias",
    "Mateus", "Marcos", "Lucas", "João", "Atos", "Romanos", "1 Coríntios", "2 Coríntios",
    "Gálatas", "Efésios", "Filipenses", "Colossenses", "1 Tessalonicenses",
    "2 Tessalonicenses", "1 Timóteo", "2 Timóteo", "Tito", "Filemom", "Hebreus", "Tiago",
    "1 Pedro", "2 Pedro", "1 João", "2 João", "3 João", "Judas", "Apocalipse",
];

/// The 66 canonical books, English spelling.
pub const BOOKS_EN: &[&str] = &[
    "Genesis", "Exodus", "Leviticus", "Numbers", "Deuteronomy", "Joshua", "Judges", "Ruth",
    "1 Samuel", "2 Samuel", "1 Kings", "2 Kings", "1 Chronicles", "2 Chronicles", "Ezra",
    "Nehemiah", "Esther", "Job", "Psalms", "Proverbs", "Ecclesiastes", "Song of Solomon",
    "Isaiah", "Jeremiah", "Lamentations", "Ezekiel", "Daniel", "Hosea", "Joel", "Amos",
    "Obadiah", "Jonah", "Micah", "Nahum", "Habakkuk", "Zephaniah", "Haggai", "Zechariah",
    "Malachi", "Matthew", "Mark", "Luke", "John", "Acts", "Romans", "1 Corinthians",
    "2 Corinthians", "Galatians", "Ephesians", "Philippians", "Colossians",
    "1 Thessalonians", "2 Thessalonians", "1 Timothy", "2 Timothy", "Titus", "Philemon",
    "Hebrews", "James", "1 Peter", "2 Peter", "1 John", "2 John", "3 John", "Jude",
    "Revelation",
];

// Longest names first so "1 João" wins over "João".
static BOOK_RE: LazyLock<Regex> = LazyLock::new(|| {
    let mut names: Vec<&str> = BOOKS_PT.iter().chain(BOOKS_EN).copied().collect();
    names.sort_by_key(|n| std::cmp::Reverse(n.chars().count()));
    let alternation = names
        .iter()
        .map(|n| regex::escape(n))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternation)).unwrap()
});

static NUMBERED_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([1-3])\s?(\p{L}+)(?:\s+(\d+))?$").unwrap());

/// True when `text` mentions any canonical book as a whole word.
pub fn mentions_book(text: &str) -> bool {
    BOOK_RE.is_match(text)
}

/// First canonical book mentioned in `text`, in its list spelling.
pub fn find_book(text: &str) -> Option<&'static str> {
    let m = BOOK_RE.find(text)?;
    canonical_name(m.as_str())
}

/// Canonical spelling for a book name, compared case-insensitively.
pub fn canonical_name(name: &str) -> Option<&'static str> {
    let lower = name.trim().to_lowercase();
    BOOKS_PT
        .iter()
        .chain(BOOKS_EN)
        .find(|b| b.to_lowercase() == lower)
        .copied()
}

/// `1 SAMUEL`, `1João 3`: a numbered book header with an optional chapter.
/// The name has to be canonical, so `1 Houve` stays a verse line.
pub fn numbered_book_header(text: &str) -> Option<(&'static str, Option<u32>)> {
    let caps = NUMBERED_HEADER_RE.captures(text.trim())?;
    let book = canonical_name(&format!("{} {}", &caps[1], &caps[2]))?;
    let chapter = match caps.get(3) {
        Some(m) => Some(m.as_str().parse::<u32>().ok().filter(|n| *n >= 1)?),
        None => None,
    };
    Some((book, chapter))
}

/// Canonical spelling if known, otherwise the captured name title-cased.
pub fn normalize_book(name: &str) -> String {
    match canonical_name(name) {
        Some(book) => book.to_string(),
        None => title_case(name.trim()),
    }
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canon_has_66_books_per_language() {
        assert_eq!(BOOKS_PT.len(), 66);
        assert_eq!(BOOKS_EN.len(), 66);
    }

    #[test]
    fn mentions_whole_words_only() {
        assert!(mentions_book("Livro de GÊNESIS"));
        assert!(mentions_book("The Gospel of John"));
        // "fatos" contains "atos" but not as a word
        assert!(!mentions_book("os fatos narrados"));
    }

    #[test]
    fn numbered_book_preferred() {
        assert_eq!(find_book("Primeira carta: 1 João"), Some("1 João"));
    }

    #[test]
    fn numbered_headers() {
        assert_eq!(numbered_book_header("1 SAMUEL"), Some(("1 Samuel", None)));
        assert_eq!(numbered_book_header("1 João 3"), Some(("1 João", Some(3))));
        assert_eq!(numbered_book_header("2Reis 4"), Some(("2 Reis", Some(4))));
        assert_eq!(numbered_book_header("1 Kings"), Some(("1 Kings", None)));
        assert_eq!(numbered_book_header("1 Houve"), None);
        assert_eq!(numbered_book_header("1 Houve um homem"), None);
        assert_eq!(numbered_book_header("4 Reis"), None);
        assert_eq!(numbered_book_header("1 João 0"), None);
    }

    #[test]
    fn normalizes_case() {
        assert_eq!(normalize_book("GÊNESIS"), "Gênesis");
        assert_eq!(normalize_book("genesis"), "Genesis");
        assert_eq!(normalize_book("LIVRO PERDIDO"), "Livro Perdido");
    }
}
