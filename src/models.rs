//! Domain models shared by the parser, the persistence layer and the terminal
//! shell. These stay plain data holders: resolution lives in `books`, storage in
//! `db`/`state`, and identity handling in `identity`.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::books;

/// One of the 66 canonical books, in canonical order. The discriminant doubles
/// as the index into the book catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BookId {
    Genesis,
    Exodus,
    Leviticus,
    Numbers,
    Deuteronomy,
    Joshua,
    Judges,
    Ruth,
    FirstSamuel,
    SecondSamuel,
    FirstKings,
    SecondKings,
    FirstChronicles,
    SecondChronicles,
    Ezra,
    Nehemiah,
    Esther,
    Job,
    Psalms,
    Proverbs,
    Ecclesiastes,
    SongOfSongs,
    Isaiah,
    Jeremiah,
    Lamentations,
    Ezekiel,
    Daniel,
    Hosea,
    Joel,
    Amos,
    Obadiah,
    Jonah,
    Micah,
    Nahum,
    Habakkuk,
    Zephaniah,
    Haggai,
    Zechariah,
    Malachi,
    Matthew,
    Mark,
    Luke,
    John,
    Acts,
    Romans,
    FirstCorinthians,
    SecondCorinthians,
    Galatians,
    Ephesians,
    Philippians,
    Colossians,
    FirstThessalonians,
    SecondThessalonians,
    FirstTimothy,
    SecondTimothy,
    Titus,
    Philemon,
    Hebrews,
    James,
    FirstPeter,
    SecondPeter,
    FirstJohn,
    SecondJohn,
    ThirdJohn,
    Jude,
    Revelation,
}

/// Which half of the canon a book belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Testament {
    Old,
    New,
}

impl BookId {
    /// Every book in canonical order.
    pub const ALL: [BookId; 66] = [
        BookId::Genesis,
        BookId::Exodus,
        BookId::Leviticus,
        BookId::Numbers,
        BookId::Deuteronomy,
        BookId::Joshua,
        BookId::Judges,
        BookId::Ruth,
        BookId::FirstSamuel,
        BookId::SecondSamuel,
        BookId::FirstKings,
        BookId::SecondKings,
        BookId::FirstChronicles,
        BookId::SecondChronicles,
        BookId::Ezra,
        BookId::Nehemiah,
        BookId::Esther,
        BookId::Job,
        BookId::Psalms,
        BookId::Proverbs,
        BookId::Ecclesiastes,
        BookId::SongOfSongs,
        BookId::Isaiah,
        BookId::Jeremiah,
        BookId::Lamentations,
        BookId::Ezekiel,
        BookId::Daniel,
        BookId::Hosea,
        BookId::Joel,
        BookId::Amos,
        BookId::Obadiah,
        BookId::Jonah,
        BookId::Micah,
        BookId::Nahum,
        BookId::Habakkuk,
        BookId::Zephaniah,
        BookId::Haggai,
        BookId::Zechariah,
        BookId::Malachi,
        BookId::Matthew,
        BookId::Mark,
        BookId::Luke,
        BookId::John,
        BookId::Acts,
        BookId::Romans,
        BookId::FirstCorinthians,
        BookId::SecondCorinthians,
        BookId::Galatians,
        BookId::Ephesians,
        BookId::Philippians,
        BookId::Colossians,
        BookId::FirstThessalonians,
        BookId::SecondThessalonians,
        BookId::FirstTimothy,
        BookId::SecondTimothy,
        BookId::Titus,
        BookId::Philemon,
        BookId::Hebrews,
        BookId::James,
        BookId::FirstPeter,
        BookId::SecondPeter,
        BookId::FirstJohn,
        BookId::SecondJohn,
        BookId::ThirdJohn,
        BookId::Jude,
        BookId::Revelation,
    ];

    /// Human-readable name, e.g. `1 John`.
    pub fn name(self) -> &'static str {
        books::entry(self).name
    }

    /// Number of chapters in the book.
    pub fn chapter_count(self) -> u32 {
        books::entry(self).chapters
    }

    pub fn testament(self) -> Testament {
        if self <= BookId::Malachi {
            Testament::Old
        } else {
            Testament::New
        }
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of parsing the reader's search input. Exactly one variant is active;
/// `Invalid` is a value the caller handles by leaving its current view alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchIntent {
    PhraseSearch { phrase: String },
    ChapterRef { book: BookId, chapter: u32 },
    VerseRef { book: BookId, chapter: u32, verse: u32 },
    Invalid,
}

impl SearchIntent {
    pub fn is_valid(&self) -> bool {
        !matches!(self, SearchIntent::Invalid)
    }

    /// Book and chapter addressed by a reference intent.
    pub fn chapter_location(&self) -> Option<(BookId, u32)> {
        match self {
            SearchIntent::ChapterRef { book, chapter }
            | SearchIntent::VerseRef { book, chapter, .. } => Some((*book, *chapter)),
            _ => None,
        }
    }

    /// Verse identifier used in highlight sets, only for verse references.
    pub fn verse_id(&self) -> Option<String> {
        match self {
            SearchIntent::VerseRef {
                book,
                chapter,
                verse,
            } => Some(verse_id(*book, *chapter, *verse)),
            _ => None,
        }
    }
}

impl fmt::Display for SearchIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchIntent::PhraseSearch { phrase } => write!(f, "\"{phrase}\""),
            SearchIntent::ChapterRef { book, chapter } => write!(f, "{book} {chapter}"),
            SearchIntent::VerseRef {
                book,
                chapter,
                verse,
            } => write!(f, "{book} {chapter}:{verse}"),
            SearchIntent::Invalid => f.write_str("(invalid)"),
        }
    }
}

/// Stable identifier of a single verse, e.g. `FirstJohn.3.16`.
pub fn verse_id(book: BookId, chapter: u32, verse: u32) -> String {
    format!("{book:?}.{chapter}.{verse}")
}

/// Partition that every persisted entity belongs to. The same key under two
/// scopes addresses two unrelated storage slots.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    Anonymous,
    Identity(String),
}

impl Scope {
    pub fn identity(uid: impl Into<String>) -> Self {
        Scope::Identity(uid.into())
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Scope::Anonymous)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Anonymous => f.write_str("anonymous"),
            Scope::Identity(uid) => write!(f, "identity:{uid}"),
        }
    }
}

/// The single reading position a reader can pin per scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub book: BookId,
    pub chapter: u32,
}

/// Highlighted verse identifiers. Backed by an ordered set so membership is
/// unique and the serialized form is stable.
pub type HighlightSet = BTreeSet<String>;

/// One accepted consent, stamped with the moment the reader accepted it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentRecord {
    pub accepted: bool,
    pub accepted_at: u64,
}

/// Both consent flags as seen by the UI. A missing or expired record reads as
/// "not accepted".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsentFlags {
    pub cookie_consent: Option<ConsentRecord>,
    pub comment_consent: Option<ConsentRecord>,
}

impl ConsentFlags {
    pub fn cookie_accepted(&self) -> bool {
        self.cookie_consent.is_some_and(|record| record.accepted)
    }

    pub fn comment_accepted(&self) -> bool {
        self.comment_consent.is_some_and(|record| record.accepted)
    }
}

/// Onboarding tour progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TourState {
    pub completed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn testament_splits_at_malachi() {
        assert_eq!(BookId::Malachi.testament(), Testament::Old);
        assert_eq!(BookId::Matthew.testament(), Testament::New);
        let new_count = BookId::ALL
            .iter()
            .filter(|book| book.testament() == Testament::New)
            .count();
        assert_eq!(new_count, 27);
    }

    #[test]
    fn verse_reference_exposes_location_and_id() {
        let intent = SearchIntent::VerseRef {
            book: BookId::John,
            chapter: 3,
            verse: 16,
        };
        assert_eq!(intent.chapter_location(), Some((BookId::John, 3)));
        assert_eq!(intent.verse_id().as_deref(), Some("John.3.16"));
        assert_eq!(intent.to_string(), "John 3:16");
    }

    #[test]
    fn chapter_reference_has_no_verse_id() {
        let intent = SearchIntent::ChapterRef {
            book: BookId::Luke,
            chapter: 1,
        };
        assert_eq!(intent.verse_id(), None);
        assert!(intent.is_valid());
        assert!(!SearchIntent::Invalid.is_valid());
    }

    #[test]
    fn scope_display_distinguishes_identities() {
        assert_eq!(Scope::Anonymous.to_string(), "anonymous");
        assert_eq!(Scope::identity("u1").to_string(), "identity:u1");
    }
}
