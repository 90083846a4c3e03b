//! Book catalog and name canonicalization. Readers type book names in many
//! shapes ("1 John", "first-john", "1john", "Ps"), so everything funnels through
//! [`resolve`] before the rest of the app sees a [`BookId`].
//!
//! Matching is case-insensitive, trims the input and treats hyphens as spaces.
//! Interior runs of more than one space are deliberately not collapsed: "1  John"
//! stays unresolved.

use crate::models::BookId;

/// Static facts about a single book.
pub struct BookEntry {
    pub book: BookId,
    pub name: &'static str,
    pub chapters: u32,
    /// Lowercase, single-spaced spellings accepted without an ordinal prefix.
    /// Ordinal books leave this empty and resolve through [`ORDINAL_BASES`].
    pub aliases: &'static [&'static str],
}

const fn book(
    book: BookId,
    name: &'static str,
    chapters: u32,
    aliases: &'static [&'static str],
) -> BookEntry {
    BookEntry {
        book,
        name,
        chapters,
        aliases,
    }
}

/// Canonical order matches `BookId` discriminants; `entry` indexes by them.
static CATALOG: [BookEntry; 66] = [
    book(BookId::Genesis, "Genesis", 50, &["genesis", "gen", "ge", "gn"]),
    book(BookId::Exodus, "Exodus", 40, &["exodus", "exod", "exo", "ex"]),
    book(BookId::Leviticus, "Leviticus", 27, &["leviticus", "lev", "le", "lv"]),
    book(BookId::Numbers, "Numbers", 36, &["numbers", "num", "nu", "nm"]),
    book(BookId::Deuteronomy, "Deuteronomy", 34, &["deuteronomy", "deut", "de", "dt"]),
    book(BookId::Joshua, "Joshua", 24, &["joshua", "josh", "jos"]),
    book(BookId::Judges, "Judges", 21, &["judges", "judg", "jdg"]),
    book(BookId::Ruth, "Ruth", 4, &["ruth", "rut", "ru"]),
    book(BookId::FirstSamuel, "1 Samuel", 31, &[]),
    book(BookId::SecondSamuel, "2 Samuel", 24, &[]),
    book(BookId::FirstKings, "1 Kings", 22, &[]),
    book(BookId::SecondKings, "2 Kings", 25, &[]),
    book(BookId::FirstChronicles, "1 Chronicles", 29, &[]),
    book(BookId::SecondChronicles, "2 Chronicles", 36, &[]),
    book(BookId::Ezra, "Ezra", 10, &["ezra", "ezr"]),
    book(BookId::Nehemiah, "Nehemiah", 13, &["nehemiah", "neh", "ne"]),
    book(BookId::Esther, "Esther", 10, &["esther", "esth", "est"]),
    book(BookId::Job, "Job", 42, &["job", "jb"]),
    book(BookId::Psalms, "Psalms", 150, &["psalms", "psalm", "ps", "psa", "pss"]),
    book(BookId::Proverbs, "Proverbs", 31, &["proverbs", "prov", "pro", "prv"]),
    book(BookId::Ecclesiastes, "Ecclesiastes", 12, &["ecclesiastes", "eccl", "ecc", "qoheleth"]),
    book(
        BookId::SongOfSongs,
        "Song of Songs",
        8,
        &["song of songs", "song of solomon", "song", "sos", "canticles"],
    ),
    book(BookId::Isaiah, "Isaiah", 66, &["isaiah", "isa", "is"]),
    book(BookId::Jeremiah, "Jeremiah", 52, &["jeremiah", "jer", "je"]),
    book(BookId::Lamentations, "Lamentations", 5, &["lamentations", "lam", "la"]),
    book(BookId::Ezekiel, "Ezekiel", 48, &["ezekiel", "ezek", "eze"]),
    book(BookId::Daniel, "Daniel", 12, &["daniel", "dan", "da", "dn"]),
    book(BookId::Hosea, "Hosea", 14, &["hosea", "hos", "ho"]),
    book(BookId::Joel, "Joel", 3, &["joel", "jl"]),
    book(BookId::Amos, "Amos", 9, &["amos", "am"]),
    book(BookId::Obadiah, "Obadiah", 1, &["obadiah", "obad", "ob"]),
    book(BookId::Jonah, "Jonah", 4, &["jonah", "jon", "jnh"]),
    book(BookId::Micah, "Micah", 7, &["micah", "mic"]),
    book(BookId::Nahum, "Nahum", 3, &["nahum", "nah", "na"]),
    book(BookId::Habakkuk, "Habakkuk", 3, &["habakkuk", "hab"]),
    book(BookId::Zephaniah, "Zephaniah", 3, &["zephaniah", "zeph", "zep"]),
    book(BookId::Haggai, "Haggai", 2, &["haggai", "hag"]),
    book(BookId::Zechariah, "Zechariah", 14, &["zechariah", "zech", "zec"]),
    book(BookId::Malachi, "Malachi", 4, &["malachi", "mal"]),
    book(BookId::Matthew, "Matthew", 28, &["matthew", "matt", "mat", "mt"]),
    book(BookId::Mark, "Mark", 16, &["mark", "mrk", "mk"]),
    book(BookId::Luke, "Luke", 24, &["luke", "luk", "lk"]),
    book(BookId::John, "John", 21, &["john", "jn", "jhn"]),
    book(BookId::Acts, "Acts", 28, &["acts", "act"]),
    book(BookId::Romans, "Romans", 16, &["romans", "rom", "ro"]),
    book(BookId::FirstCorinthians, "1 Corinthians", 16, &[]),
    book(BookId::SecondCorinthians, "2 Corinthians", 13, &[]),
    book(BookId::Galatians, "Galatians", 6, &["galatians", "gal"]),
    book(BookId::Ephesians, "Ephesians", 6, &["ephesians", "eph"]),
    book(BookId::Philippians, "Philippians", 4, &["philippians", "phil", "php"]),
    book(BookId::Colossians, "Colossians", 4, &["colossians", "col"]),
    book(BookId::FirstThessalonians, "1 Thessalonians", 5, &[]),
    book(BookId::SecondThessalonians, "2 Thessalonians", 3, &[]),
    book(BookId::FirstTimothy, "1 Timothy", 6, &[]),
    book(BookId::SecondTimothy, "2 Timothy", 4, &[]),
    book(BookId::Titus, "Titus", 3, &["titus", "tit"]),
    book(BookId::Philemon, "Philemon", 1, &["philemon", "philem", "phlm", "phm"]),
    book(BookId::Hebrews, "Hebrews", 13, &["hebrews", "heb"]),
    book(BookId::James, "James", 5, &["james", "jas", "jm"]),
    book(BookId::FirstPeter, "1 Peter", 5, &[]),
    book(BookId::SecondPeter, "2 Peter", 3, &[]),
    book(BookId::FirstJohn, "1 John", 5, &[]),
    book(BookId::SecondJohn, "2 John", 1, &[]),
    book(BookId::ThirdJohn, "3 John", 1, &[]),
    book(BookId::Jude, "Jude", 1, &["jude", "jud"]),
    book(
        BookId::Revelation,
        "Revelation",
        22,
        &["revelation", "revelations", "rev", "re", "apocalypse"],
    ),
];

/// Prefix spellings for the first, second and third book of a series.
const ORDINAL_PREFIXES: [&[&str]; 3] = [&["1", "first"], &["2", "second"], &["3", "third"]];

/// Base names that take an ordinal prefix, with the books they number.
const ORDINAL_BASES: &[(&[&str], &[BookId])] = &[
    (
        &["samuel", "sam", "sa", "sm"],
        &[BookId::FirstSamuel, BookId::SecondSamuel],
    ),
    (
        &["kings", "kgs", "ki", "kin"],
        &[BookId::FirstKings, BookId::SecondKings],
    ),
    (
        &["chronicles", "chron", "chr", "ch"],
        &[BookId::FirstChronicles, BookId::SecondChronicles],
    ),
    (
        &["corinthians", "cor", "co"],
        &[BookId::FirstCorinthians, BookId::SecondCorinthians],
    ),
    (
        &["thessalonians", "thess", "thes", "th"],
        &[BookId::FirstThessalonians, BookId::SecondThessalonians],
    ),
    (
        &["timothy", "tim", "ti"],
        &[BookId::FirstTimothy, BookId::SecondTimothy],
    ),
    (
        &["peter", "pet", "pe", "pt"],
        &[BookId::FirstPeter, BookId::SecondPeter],
    ),
    (
        &["john", "jn", "jhn", "jo"],
        &[BookId::FirstJohn, BookId::SecondJohn, BookId::ThirdJohn],
    ),
];

/// Catalog entry for a book.
pub fn entry(book: BookId) -> &'static BookEntry {
    &CATALOG[book as usize]
}

/// Map an arbitrary spelling to its canonical book. `None` is the regular
/// "unresolved" outcome, not an error.
pub fn resolve(raw: &str) -> Option<BookId> {
    let name = normalize(raw);
    if name.is_empty() {
        return None;
    }
    resolve_ordinal(&name).or_else(|| resolve_plain(&name))
}

fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase().replace('-', " ").trim().to_string()
}

/// Handles "1 john", "first john", "1john" and "firstjohn". At most one space
/// may separate the ordinal from the base name.
fn resolve_ordinal(name: &str) -> Option<BookId> {
    for (position, prefixes) in ORDINAL_PREFIXES.iter().enumerate() {
        for prefix in prefixes.iter() {
            let Some(rest) = name.strip_prefix(prefix) else {
                continue;
            };
            let base = rest.strip_prefix(' ').unwrap_or(rest);
            if base.is_empty() || base.starts_with(' ') {
                continue;
            }
            let found = ORDINAL_BASES
                .iter()
                .find(|(aliases, _)| aliases.contains(&base))
                .and_then(|(_, books)| books.get(position).copied());
            if found.is_some() {
                return found;
            }
        }
    }
    None
}

fn resolve_plain(name: &str) -> Option<BookId> {
    CATALOG
        .iter()
        .find(|entry| entry.aliases.contains(&name))
        .map(|entry| entry.book)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn catalog_order_matches_book_ids() {
        for (index, book) in BookId::ALL.iter().enumerate() {
            assert_eq!(CATALOG[index].book, *book, "catalog slot {index}");
        }
        let total: u32 = CATALOG.iter().map(|entry| entry.chapters).sum();
        assert_eq!(total, 1189);
    }

    #[test]
    fn aliases_are_unique_and_normalized() {
        let mut seen = HashSet::new();
        for entry in CATALOG.iter() {
            for alias in entry.aliases {
                assert_eq!(*alias, normalize(alias));
                assert!(seen.insert(*alias), "duplicate alias {alias}");
            }
        }
    }

    #[test]
    fn every_display_name_resolves_to_itself() {
        for book in BookId::ALL {
            assert_eq!(resolve(book.name()), Some(book), "{}", book.name());
        }
    }

    #[test]
    fn ordinal_forms_agree() {
        for spelling in ["1 John", "first John", "firstJohn", "1john", "FIRST-JOHN", "1-john"] {
            assert_eq!(resolve(spelling), Some(BookId::FirstJohn), "{spelling}");
        }
        for spelling in ["2 Corinthians", "second corinthians", "secondCorinthians", "2cor"] {
            assert_eq!(resolve(spelling), Some(BookId::SecondCorinthians), "{spelling}");
        }
        assert_eq!(resolve("third john"), Some(BookId::ThirdJohn));
        assert_eq!(resolve("2 Tim"), Some(BookId::SecondTimothy));
    }

    #[test]
    fn plain_john_is_the_gospel() {
        assert_eq!(resolve("John"), Some(BookId::John));
        assert_eq!(resolve("  jn "), Some(BookId::John));
    }

    #[test]
    fn hyphens_and_case_are_tolerated() {
        assert_eq!(resolve("song-of-songs"), Some(BookId::SongOfSongs));
        assert_eq!(resolve("Song of Solomon"), Some(BookId::SongOfSongs));
        assert_eq!(resolve("PSALM"), Some(BookId::Psalms));
        assert_eq!(resolve("Rev"), Some(BookId::Revelation));
    }

    #[test]
    fn unknown_tokens_stay_unresolved() {
        assert_eq!(resolve(""), None);
        assert_eq!(resolve("   "), None);
        assert_eq!(resolve("Joh"), None);
        assert_eq!(resolve("3 Samuel"), None);
        assert_eq!(resolve("1 Genesis"), None);
        assert_eq!(resolve("fourth john"), None);
    }

    #[test]
    fn double_space_after_ordinal_is_unresolved() {
        assert_eq!(resolve("1  John"), None);
        assert_eq!(resolve("first  john"), None);
    }
}
