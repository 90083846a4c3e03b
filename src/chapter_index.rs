//! Sparse per-book chapter ranges. A resource (a chapter summary, a media link)
//! usually covers a contiguous block of chapters, so each book stores only the
//! chapter where each block starts and lookups take the floor.

use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::books;
use crate::models::BookId;

/// Reasons an index source is rejected at build time.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IndexError {
    #[error("{book}: chapter ranges must start at chapter 1 or later")]
    ZeroChapter { book: BookId },

    #[error("{book}: range start {next} follows {previous}; starts must be ascending")]
    Unsorted {
        book: BookId,
        previous: u32,
        next: u32,
    },

    #[error("{book}: range start {chapter} appears more than once")]
    Duplicate { book: BookId, chapter: u32 },

    #[error("{0}: book listed more than once")]
    DuplicateBook(BookId),

    #[error("unknown book name '{0}'")]
    UnknownBook(String),

    #[error("malformed index source: {0}")]
    Malformed(String),
}

/// One block start within a book.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RangeEntry {
    pub start: u32,
    pub resource: String,
}

impl RangeEntry {
    pub fn new(start: u32, resource: impl Into<String>) -> Self {
        Self {
            start,
            resource: resource.into(),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct ChapterRangeIndex {
    books: HashMap<BookId, Vec<RangeEntry>>,
}

#[derive(Deserialize)]
struct IndexSource {
    #[serde(default)]
    book: Vec<BookTable>,
}

#[derive(Deserialize)]
struct BookTable {
    name: String,
    ranges: Vec<RangeEntry>,
}

impl ChapterRangeIndex {
    /// Build the index from per-book tables. Each table must already be in
    /// ascending start order; out-of-order or repeated starts are rejected rather
    /// than re-sorted, since they point at a defect in the source data.
    pub fn from_tables<I>(tables: I) -> Result<Self, IndexError>
    where
        I: IntoIterator<Item = (BookId, Vec<RangeEntry>)>,
    {
        let mut books = HashMap::new();
        for (book, entries) in tables {
            validate(book, &entries)?;
            if books.insert(book, entries).is_some() {
                return Err(IndexError::DuplicateBook(book));
            }
        }
        debug!(books = books.len(), "built chapter range index");
        Ok(Self { books })
    }

    /// Parse a TOML source of the form
    ///
    /// ```toml
    /// [[book]]
    /// name = "Genesis"
    /// ranges = [{ start = 1, resource = "gen-1-11" }, { start = 12, resource = "gen-12-50" }]
    /// ```
    ///
    /// Book names accept any spelling [`books::resolve`] does.
    pub fn from_toml_str(source: &str) -> Result<Self, IndexError> {
        let parsed: IndexSource =
            toml::from_str(source).map_err(|err| IndexError::Malformed(err.to_string()))?;

        let tables = parsed
            .book
            .into_iter()
            .map(|table| {
                books::resolve(&table.name)
                    .map(|book| (book, table.ranges))
                    .ok_or(IndexError::UnknownBook(table.name))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_tables(tables)
    }

    /// Resource bound to the greatest start chapter at or below `chapter`.
    pub fn lookup(&self, book: BookId, chapter: u32) -> Option<&str> {
        let entries = self.books.get(&book)?;
        let upper = entries.partition_point(|entry| entry.start <= chapter);
        upper
            .checked_sub(1)
            .map(|index| entries[index].resource.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}

fn validate(book: BookId, entries: &[RangeEntry]) -> Result<(), IndexError> {
    if entries.first().is_some_and(|entry| entry.start == 0) {
        return Err(IndexError::ZeroChapter { book });
    }
    for pair in entries.windows(2) {
        let (previous, next) = (pair[0].start, pair[1].start);
        if previous == next {
            return Err(IndexError::Duplicate {
                book,
                chapter: next,
            });
        }
        if previous > next {
            return Err(IndexError::Unsorted {
                book,
                previous,
                next,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn genesis_index() -> ChapterRangeIndex {
        ChapterRangeIndex::from_tables([(
            BookId::Genesis,
            vec![
                RangeEntry::new(1, "gen-1-11"),
                RangeEntry::new(12, "gen-12-22"),
                RangeEntry::new(23, "gen-23-50"),
            ],
        )])
        .expect("valid index")
    }

    #[test]
    fn lookup_takes_the_floor() {
        let index = genesis_index();
        assert_eq!(index.lookup(BookId::Genesis, 1), Some("gen-1-11"));
        assert_eq!(index.lookup(BookId::Genesis, 11), Some("gen-1-11"));
        assert_eq!(index.lookup(BookId::Genesis, 12), Some("gen-12-22"));
        assert_eq!(index.lookup(BookId::Genesis, 50), Some("gen-23-50"));
    }

    #[test]
    fn lookup_below_first_key_or_unknown_book_is_not_found() {
        let index = ChapterRangeIndex::from_tables([(
            BookId::Exodus,
            vec![RangeEntry::new(5, "ex-5")],
        )])
        .expect("valid index");
        assert_eq!(index.lookup(BookId::Exodus, 4), None);
        assert_eq!(index.lookup(BookId::Genesis, 1), None);
    }

    #[test]
    fn unsorted_source_fails_construction() {
        let err = ChapterRangeIndex::from_tables([(
            BookId::Genesis,
            vec![RangeEntry::new(12, "b"), RangeEntry::new(1, "a")],
        )])
        .unwrap_err();
        assert_eq!(
            err,
            IndexError::Unsorted {
                book: BookId::Genesis,
                previous: 12,
                next: 1
            }
        );
    }

    #[test]
    fn duplicate_keys_fail_construction() {
        let err = ChapterRangeIndex::from_tables([(
            BookId::Genesis,
            vec![RangeEntry::new(1, "a"), RangeEntry::new(1, "b")],
        )])
        .unwrap_err();
        assert!(matches!(err, IndexError::Duplicate { chapter: 1, .. }));
    }

    #[test]
    fn zero_chapter_and_repeated_book_fail_construction() {
        let zero = ChapterRangeIndex::from_tables([(BookId::Ruth, vec![RangeEntry::new(0, "r")])]);
        assert!(matches!(zero, Err(IndexError::ZeroChapter { .. })));

        let repeated = ChapterRangeIndex::from_tables([
            (BookId::Ruth, vec![RangeEntry::new(1, "r")]),
            (BookId::Ruth, vec![RangeEntry::new(2, "r2")]),
        ]);
        assert_eq!(repeated.unwrap_err(), IndexError::DuplicateBook(BookId::Ruth));
    }

    #[test]
    fn toml_source_resolves_book_spellings() {
        let index = ChapterRangeIndex::from_toml_str(
            r#"
            [[book]]
            name = "1 john"
            ranges = [{ start = 1, resource = "1jn-all" }]

            [[book]]
            name = "Gen"
            ranges = [{ start = 1, resource = "gen-1-11" }, { start = 12, resource = "gen-12-50" }]
            "#,
        )
        .expect("valid source");
        assert_eq!(index.lookup(BookId::FirstJohn, 5), Some("1jn-all"));
        assert_eq!(index.lookup(BookId::Genesis, 30), Some("gen-12-50"));
    }

    #[test]
    fn toml_source_rejects_unknown_books() {
        let err = ChapterRangeIndex::from_toml_str(
            r#"
            [[book]]
            name = "Hezekiah"
            ranges = [{ start = 1, resource = "x" }]
            "#,
        )
        .unwrap_err();
        assert_eq!(err, IndexError::UnknownBook("Hezekiah".to_string()));
    }

    #[test]
    fn toml_source_must_be_well_formed() {
        let err = ChapterRangeIndex::from_toml_str("[[book]]\nname = 3").unwrap_err();
        assert!(matches!(err, IndexError::Malformed(_)));
    }

    proptest! {
        #[test]
        fn lookup_matches_linear_floor(
            starts in proptest::collection::btree_set(1u32..200, 1..20),
            chapter in 0u32..220,
        ) {
            let entries: Vec<RangeEntry> = starts
                .iter()
                .map(|start| RangeEntry::new(*start, format!("r{start}")))
                .collect();
            let index = ChapterRangeIndex::from_tables([(BookId::Psalms, entries)])
                .expect("btree_set keys are sorted and unique");

            let expected = starts
                .iter()
                .rev()
                .find(|start| **start <= chapter)
                .map(|start| format!("r{start}"));
            prop_assert_eq!(index.lookup(BookId::Psalms, chapter).map(str::to_string), expected);
        }
    }
}
