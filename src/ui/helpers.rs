use anyhow::Error;
use ratatui::layout::{Constraint, Flex, Layout, Rect};

use crate::models::BookId;

/// Rectangle centered in `area` covering the given percentages. Used for the
/// modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let [column] = Layout::horizontal([Constraint::Percentage(percent_x)])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::vertical([Constraint::Percentage(percent_y)])
        .flex(Flex::Center)
        .areas(column);
    cell
}

/// Innermost cause of a chained error; that is the part worth showing in the
/// footer.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}

/// Chapter next to `chapter`, crossing into the neighbouring book at either
/// end. Stays put at the very first and very last chapter of the canon. A
/// chapter past the end of its book counts as the book's last chapter.
pub(crate) fn step_chapter(book: BookId, chapter: u32, forward: bool) -> (BookId, u32) {
    let position = book as usize;
    let chapter = chapter.clamp(1, book.chapter_count());
    if forward {
        if chapter < book.chapter_count() {
            return (book, chapter + 1);
        }
        match BookId::ALL.get(position + 1) {
            Some(next) => (*next, 1),
            None => (book, chapter),
        }
    } else {
        if chapter > 1 {
            return (book, chapter - 1);
        }
        match position.checked_sub(1).map(|index| BookId::ALL[index]) {
            Some(previous) => (previous, previous.chapter_count()),
            None => (book, chapter),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stepping_crosses_book_boundaries() {
        assert_eq!(step_chapter(BookId::Genesis, 1, true), (BookId::Genesis, 2));
        assert_eq!(step_chapter(BookId::Genesis, 50, true), (BookId::Exodus, 1));
        assert_eq!(step_chapter(BookId::Exodus, 1, false), (BookId::Genesis, 50));
        assert_eq!(step_chapter(BookId::Obadiah, 1, true), (BookId::Jonah, 1));
    }

    #[test]
    fn stepping_stops_at_the_ends_of_the_canon() {
        assert_eq!(step_chapter(BookId::Genesis, 1, false), (BookId::Genesis, 1));
        assert_eq!(
            step_chapter(BookId::Revelation, 22, true),
            (BookId::Revelation, 22)
        );
    }

    #[test]
    fn stepping_from_a_chapter_past_the_end_stays_in_the_book() {
        assert_eq!(step_chapter(BookId::John, 99, true), (BookId::Acts, 1));
        assert_eq!(step_chapter(BookId::John, 99, false), (BookId::John, 20));
        assert_eq!(
            step_chapter(BookId::Revelation, 99, true),
            (BookId::Revelation, 22)
        );
    }

    #[test]
    fn surface_error_prefers_the_root_cause() {
        let err = anyhow::anyhow!("disk full").context("failed to save bookmark");
        assert_eq!(surface_error(&err), "disk full");
    }

    #[test]
    fn centered_rect_stays_inside_the_area() {
        let area = Rect::new(0, 0, 100, 40);
        let rect = centered_rect(50, 50, area);
        assert_eq!(rect.width, 50);
        assert_eq!(rect.height, 20);
        assert_eq!(rect.x, 25);
        assert_eq!(rect.y, 10);
    }
}
