//! Free-text search input parsing.
//!
//! Input is either a quoted phrase (`"light"`) or a reference (`John 3:16`,
//! `Luke 1:`). Both go through [`parse`]; the trigger decides how eager it is:
//! a keystroke emits a phrase the moment its closing quote exists, while a
//! reference only becomes an intent once the caller confirms it.

use crate::books;
use crate::models::{BookId, SearchIntent};

/// What caused the parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// The input changed while typing.
    Keystroke,
    /// The reader explicitly submitted the input (e.g. pressed enter).
    Confirm,
}

/// State reached after scanning the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    Idle,
    InsideQuote,
    ReferenceMode,
}

/// Result of walking the input once.
enum Scan<'a> {
    Empty,
    OpenQuote,
    ClosedQuote(&'a str),
    Reference(&'a str),
}

fn scan(input: &str) -> Scan<'_> {
    let mut state = ParseState::Idle;
    let mut phrase_start = 0;

    for (index, ch) in input.char_indices() {
        match state {
            ParseState::Idle if ch.is_whitespace() => {}
            ParseState::Idle if ch == '"' => {
                state = ParseState::InsideQuote;
                phrase_start = index + ch.len_utf8();
            }
            ParseState::Idle => return Scan::Reference(input[index..].trim_end()),
            ParseState::InsideQuote if ch == '"' => {
                return Scan::ClosedQuote(&input[phrase_start..index]);
            }
            ParseState::InsideQuote | ParseState::ReferenceMode => {}
        }
    }

    match state {
        ParseState::InsideQuote => Scan::OpenQuote,
        _ => Scan::Empty,
    }
}

/// State the machine sits in after consuming `input`. A closed phrase reports
/// `Idle` since it has already been emitted.
pub fn scan_state(input: &str) -> ParseState {
    match scan(input) {
        Scan::Empty | Scan::ClosedQuote(_) => ParseState::Idle,
        Scan::OpenQuote => ParseState::InsideQuote,
        Scan::Reference(_) => ParseState::ReferenceMode,
    }
}

/// Parse raw search input. `None` means nothing is emitted yet: a keystroke on
/// anything other than a completed phrase. A confirm always yields an intent.
pub fn parse(input: &str, trigger: Trigger) -> Option<SearchIntent> {
    match (scan(input), trigger) {
        (Scan::ClosedQuote(phrase), _) => Some(phrase_intent(phrase)),
        (_, Trigger::Keystroke) => None,
        (Scan::Reference(text), Trigger::Confirm) => Some(parse_reference(text)),
        (Scan::Empty | Scan::OpenQuote, Trigger::Confirm) => Some(SearchIntent::Invalid),
    }
}

fn phrase_intent(phrase: &str) -> SearchIntent {
    if phrase.trim().is_empty() {
        SearchIntent::Invalid
    } else {
        SearchIntent::PhraseSearch {
            phrase: phrase.to_string(),
        }
    }
}

/// `<book> <chapter>:[verse]`, where the chapter is the run of digits right
/// before the first colon.
fn parse_reference(text: &str) -> SearchIntent {
    let Some((head, tail)) = text.split_once(':') else {
        return SearchIntent::Invalid;
    };

    let book_part = head.trim_end_matches(|ch: char| ch.is_ascii_digit());
    let digits = &head[book_part.len()..];

    let Some(chapter) = positive_number(digits) else {
        return SearchIntent::Invalid;
    };
    let Some(book) = books::resolve(book_part) else {
        return SearchIntent::Invalid;
    };

    let verse = tail.trim();
    if verse.is_empty() {
        return SearchIntent::ChapterRef { book, chapter };
    }
    match positive_number(verse) {
        Some(verse) => SearchIntent::VerseRef {
            book,
            chapter,
            verse,
        },
        None => SearchIntent::Invalid,
    }
}

fn positive_number(digits: &str) -> Option<u32> {
    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().filter(|value| *value >= 1)
}

/// Input buffer plus the last intent worth showing. Invalid results never
/// replace what the reader is currently looking at.
#[derive(Debug, Default)]
pub struct QueryParser {
    input: String,
    current: Option<SearchIntent>,
}

impl QueryParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Last valid intent emitted.
    pub fn current(&self) -> Option<&SearchIntent> {
        self.current.as_ref()
    }

    pub fn state(&self) -> ParseState {
        scan_state(&self.input)
    }

    /// Append one typed character. Returns a phrase intent when this keystroke
    /// completed the quoted phrase.
    pub fn push(&mut self, ch: char) -> Option<SearchIntent> {
        let was_pending = parse(&self.input, Trigger::Keystroke).is_none();
        self.input.push(ch);
        let emitted = parse(&self.input, Trigger::Keystroke).filter(|_| was_pending)?;
        self.accept(emitted)
    }

    pub fn pop(&mut self) {
        self.input.pop();
    }

    /// Submit the current input.
    pub fn confirm(&mut self) -> SearchIntent {
        let intent = parse(&self.input, Trigger::Confirm).unwrap_or(SearchIntent::Invalid);
        self.accept(intent.clone());
        intent
    }

    pub fn clear(&mut self) {
        self.input.clear();
    }

    /// Point the view at a reference directly, e.g. when jumping to a bookmark.
    pub fn show(&mut self, book: BookId, chapter: u32) {
        self.current = Some(SearchIntent::ChapterRef { book, chapter });
    }

    fn accept(&mut self, intent: SearchIntent) -> Option<SearchIntent> {
        if intent.is_valid() {
            self.current = Some(intent.clone());
        }
        Some(intent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn confirm(input: &str) -> SearchIntent {
        parse(input, Trigger::Confirm).expect("confirm always yields an intent")
    }

    #[test]
    fn closing_quote_emits_phrase_while_typing() {
        assert_eq!(
            parse("\"light\"", Trigger::Keystroke),
            Some(SearchIntent::PhraseSearch {
                phrase: "light".to_string()
            })
        );
        assert_eq!(parse("\"ligh", Trigger::Keystroke), None);
    }

    #[test]
    fn phrase_is_passed_through_verbatim() {
        assert_eq!(
            confirm("  \"The Word was God\" trailing"),
            SearchIntent::PhraseSearch {
                phrase: "The Word was God".to_string()
            }
        );
    }

    #[test]
    fn empty_or_unterminated_phrase_is_invalid() {
        assert_eq!(confirm("\"\""), SearchIntent::Invalid);
        assert_eq!(confirm("\"grace"), SearchIntent::Invalid);
        assert_eq!(confirm(""), SearchIntent::Invalid);
        assert_eq!(confirm("   "), SearchIntent::Invalid);
    }

    #[test]
    fn verse_reference_needs_confirm() {
        assert_eq!(parse("John 3:16", Trigger::Keystroke), None);
        assert_eq!(
            confirm("John 3:16"),
            SearchIntent::VerseRef {
                book: BookId::John,
                chapter: 3,
                verse: 16
            }
        );
    }

    #[test]
    fn missing_verse_is_a_chapter_reference() {
        assert_eq!(
            confirm("Luke 1:"),
            SearchIntent::ChapterRef {
                book: BookId::Luke,
                chapter: 1
            }
        );
        assert_eq!(
            confirm("Luke 1:   "),
            SearchIntent::ChapterRef {
                book: BookId::Luke,
                chapter: 1
            }
        );
    }

    #[test]
    fn verse_may_follow_whitespace_and_book_may_hug_chapter() {
        assert_eq!(
            confirm("1john3: 9"),
            SearchIntent::VerseRef {
                book: BookId::FirstJohn,
                chapter: 3,
                verse: 9
            }
        );
        assert_eq!(
            confirm("first John 4:8"),
            SearchIntent::VerseRef {
                book: BookId::FirstJohn,
                chapter: 4,
                verse: 8
            }
        );
    }

    #[test]
    fn malformed_references_are_invalid() {
        assert_eq!(confirm("Joh 3:16"), SearchIntent::Invalid);
        assert_eq!(confirm("John three:16"), SearchIntent::Invalid);
        assert_eq!(confirm("John 3:1x"), SearchIntent::Invalid);
        assert_eq!(confirm("John 3:16-18"), SearchIntent::Invalid);
        assert_eq!(confirm("John 0:1"), SearchIntent::Invalid);
        assert_eq!(confirm("John 3:0"), SearchIntent::Invalid);
        assert_eq!(confirm("John 3"), SearchIntent::Invalid);
        assert_eq!(confirm("3:16"), SearchIntent::Invalid);
    }

    #[test]
    fn chapter_digits_must_touch_the_colon() {
        assert_eq!(confirm("John 3 :16"), SearchIntent::Invalid);
        assert_eq!(confirm("Luke 1 :"), SearchIntent::Invalid);
    }

    #[test]
    fn scan_state_tracks_the_machine() {
        assert_eq!(scan_state(""), ParseState::Idle);
        assert_eq!(scan_state("\"lig"), ParseState::InsideQuote);
        assert_eq!(scan_state("Joh"), ParseState::ReferenceMode);
        assert_eq!(scan_state("\"light\""), ParseState::Idle);
    }

    #[test]
    fn parser_emits_phrase_on_the_closing_keystroke_only() {
        let mut parser = QueryParser::new();
        let emitted: Vec<_> = "\"light\"".chars().filter_map(|ch| parser.push(ch)).collect();
        assert_eq!(
            emitted,
            vec![SearchIntent::PhraseSearch {
                phrase: "light".to_string()
            }]
        );
        assert_eq!(parser.push('x'), None);
    }

    #[test]
    fn invalid_confirm_keeps_the_current_view() {
        let mut parser = QueryParser::new();
        "John 3:16".chars().for_each(|ch| {
            assert_eq!(parser.push(ch), None);
        });
        let shown = parser.confirm();
        assert_eq!(parser.current(), Some(&shown));

        parser.clear();
        "Joh".chars().for_each(|ch| {
            parser.push(ch);
        });
        assert_eq!(parser.state(), ParseState::ReferenceMode);
        assert_eq!(parser.confirm(), SearchIntent::Invalid);
        assert_eq!(parser.current(), Some(&shown));
    }
}
