//! Core of a devotional-reading client: search input parsing, book-name
//! canonicalization, the sparse chapter-to-resource index, and the scoped,
//! expiring persistence behind bookmarks, highlights, consent and onboarding.
//!
//! Verse content, payments and credential issuance live outside this crate;
//! the core only emits intents and keeps the reader's local state.
pub mod books;
pub mod chapter_index;
pub mod config;
pub mod db;
pub mod identity;
pub mod logging;
pub mod models;
pub mod query;
pub mod state;
pub mod ui;

/// The pieces the binary and outside callers reach for most.
pub use books::resolve;
pub use chapter_index::{ChapterRangeIndex, IndexError, RangeEntry};
pub use config::AppConfig;
pub use db::{PersistedStateStore, SqliteMedium, StoreError, SystemClock};
pub use identity::{on_sign_in, on_sign_out, ReaderSession, RetainFlags};
pub use models::{BookId, Bookmark, ConsentFlags, HighlightSet, Scope, SearchIntent, TourState};
pub use query::{parse, ParseState, QueryParser, Trigger};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
