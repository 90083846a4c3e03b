use std::mem;

use anyhow::{Context, Result};
use crossterm::event::KeyCode;
use open::that as open_link;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;
use tracing::info;

use crate::chapter_index::ChapterRangeIndex;
use crate::identity::ReaderSession;
use crate::models::{BookId, Bookmark, ConsentFlags, HighlightSet, SearchIntent, TourState};
use crate::query::{ParseState, QueryParser};
use crate::state;

use super::forms::{SignInField, SignInForm, SignOutDialog};
use super::helpers::{centered_rect, step_chapter, surface_error};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
const SEARCH_HEIGHT: u16 = 3;
const SEARCH_PROMPT: &str = "Search: ";
const TOUR_STEPS: &[&str] = &[
    "Type a quoted phrase such as \"living water\"; results appear as soon as you close the quote.",
    "Type a reference such as John 3:16 or Luke 1: and press Enter to open it.",
    "Ctrl+B bookmarks the open chapter, Ctrl+G jumps back to it, Ctrl+L highlights the open verse.",
    "Ctrl+N / Ctrl+P move between chapters and Ctrl+O opens the chapter's companion resource.",
    "Ctrl+S signs in. Ctrl+X signs out and lets you choose what stays on this device.",
];

/// Which interaction currently owns the keyboard.
enum Mode {
    Search,
    Consent,
    Tour(usize),
    SigningIn(SignInForm),
    SigningOut(SignOutDialog),
}

struct StatusMessage {
    text: String,
    kind: StatusKind,
}

enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Snapshot of the persisted reader state for the current scope. Reads go
/// through the store (which may purge), so drawing works off this copy.
#[derive(Default)]
struct ReaderView {
    bookmark: Option<Bookmark>,
    highlights: HighlightSet,
    consent: ConsentFlags,
    tour: TourState,
}

pub struct App {
    session: ReaderSession,
    index: ChapterRangeIndex,
    parser: QueryParser,
    view: ReaderView,
    mode: Mode,
    status: Option<StatusMessage>,
    consent_dismissed: bool,
}

impl App {
    pub fn new(session: ReaderSession, index: ChapterRangeIndex) -> Result<Self> {
        let mut app = Self {
            session,
            index,
            parser: QueryParser::new(),
            view: ReaderView::default(),
            mode: Mode::Search,
            status: None,
            consent_dismissed: false,
        };
        app.refresh()?;
        app.mode = app.onboarding_mode();
        Ok(app)
    }

    /// Returns `true` when the reader asked to quit. Storage failures inside a
    /// dialog are shown in place and keep the dialog open.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Search);

        self.mode = match mode {
            Mode::Search => self.handle_search_key(code, &mut exit),
            Mode::Consent => self.handle_consent_key(code),
            Mode::Tour(step) => self.handle_tour_key(code, step),
            Mode::SigningIn(form) => self.handle_sign_in(code, form),
            Mode::SigningOut(dialog) => self.handle_sign_out(code, dialog),
        };
        Ok(exit)
    }

    /// Ctrl shortcuts. Only the search screen reacts to them, apart from quit.
    pub(crate) fn handle_ctrl(&mut self, ch: char) -> Result<bool> {
        if matches!(ch, 'c' | 'q') {
            return Ok(true);
        }
        if !matches!(self.mode, Mode::Search) {
            return Ok(false);
        }

        let outcome = match ch {
            'b' => self.toggle_bookmark(),
            'g' => {
                self.jump_to_bookmark();
                Ok(())
            }
            'l' => self.toggle_highlight(),
            'o' => self.open_resource(),
            'n' => {
                self.step(true);
                Ok(())
            }
            'p' => {
                self.step(false);
                Ok(())
            }
            's' => {
                self.begin_sign_in();
                Ok(())
            }
            'x' => {
                self.begin_sign_out();
                Ok(())
            }
            't' => {
                self.mode = Mode::Tour(0);
                Ok(())
            }
            _ => Ok(()),
        };

        if let Err(err) = outcome {
            self.set_status(surface_error(&err), StatusKind::Error);
        }
        Ok(false)
    }

    fn handle_search_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        match code {
            KeyCode::Esc => {
                if self.parser.input().is_empty() {
                    *exit = true;
                } else {
                    self.parser.clear();
                    self.clear_status();
                }
            }
            KeyCode::Enter => {
                let intent = self.parser.confirm();
                self.report_intent(&intent);
            }
            KeyCode::Backspace => self.parser.pop(),
            KeyCode::Char(ch) => {
                if let Some(intent) = self.parser.push(ch) {
                    self.report_intent(&intent);
                }
            }
            _ => {}
        }
        Mode::Search
    }

    fn handle_consent_key(&mut self, code: KeyCode) -> Mode {
        let outcome = match code {
            KeyCode::Char('a') => self.record_consent(false),
            KeyCode::Char('c') => self.record_consent(true),
            KeyCode::Esc => {
                self.consent_dismissed = true;
                Ok(())
            }
            _ => return Mode::Consent,
        };
        match outcome.and_then(|()| self.refresh()) {
            Ok(()) => self.onboarding_mode(),
            Err(err) => {
                self.set_status(surface_error(&err), StatusKind::Error);
                Mode::Consent
            }
        }
    }

    fn record_consent(&mut self, comments: bool) -> Result<()> {
        let (store, scope) = self.session.parts();
        state::accept_cookie_consent(store, scope).context("failed to record cookie consent")?;
        if comments {
            state::accept_comment_consent(store, scope)
                .context("failed to record comment consent")?;
        }
        Ok(())
    }

    fn handle_tour_key(&mut self, code: KeyCode, step: usize) -> Mode {
        let finished = match code {
            KeyCode::Enter | KeyCode::Right => step + 1 >= TOUR_STEPS.len(),
            KeyCode::Left => return Mode::Tour(step.saturating_sub(1)),
            KeyCode::Esc => true,
            _ => return Mode::Tour(step),
        };
        if !finished {
            return Mode::Tour(step + 1);
        }

        let (store, scope) = self.session.parts();
        let saved = state::complete_tour(store, scope)
            .context("failed to save tour progress")
            .and_then(|()| self.refresh());
        match saved {
            Ok(()) => Mode::Search,
            Err(err) => {
                self.set_status(surface_error(&err), StatusKind::Error);
                Mode::Tour(step)
            }
        }
    }

    fn handle_sign_in(&mut self, code: KeyCode, mut form: SignInForm) -> Mode {
        match code {
            KeyCode::Esc => return Mode::Search,
            KeyCode::Tab | KeyCode::Up | KeyCode::Down => form.toggle_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            KeyCode::Enter => match self.submit_sign_in(&form) {
                Ok(uid) => {
                    self.consent_dismissed = false;
                    self.set_status(format!("Signed in as {uid}."), StatusKind::Info);
                    return self.settle_after_identity_change();
                }
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            _ => {}
        }
        Mode::SigningIn(form)
    }

    fn submit_sign_in(&mut self, form: &SignInForm) -> Result<String> {
        let (uid, credential) = form.parse_inputs()?;
        self.session
            .sign_in(&uid, &credential)
            .context("failed to sign in")?;
        Ok(uid)
    }

    fn handle_sign_out(&mut self, code: KeyCode, mut dialog: SignOutDialog) -> Mode {
        match code {
            KeyCode::Esc => return Mode::Search,
            KeyCode::Up => dialog.previous(),
            KeyCode::Down | KeyCode::Tab => dialog.next(),
            KeyCode::Char(' ') => dialog.toggle_selected(),
            KeyCode::Enter => match self
                .session
                .sign_out(dialog.retain)
                .context("failed to sign out")
            {
                Ok(purged) => {
                    self.set_status(
                        format!("Signed out; removed {} item(s).", purged.len()),
                        StatusKind::Info,
                    );
                    return self.settle_after_identity_change();
                }
                Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
            },
            _ => {}
        }
        Mode::SigningOut(dialog)
    }

    /// Reload the view for the new scope. If that fails the reader lands on the
    /// search screen with the error shown.
    fn settle_after_identity_change(&mut self) -> Mode {
        if let Err(err) = self.refresh() {
            self.set_status(surface_error(&err), StatusKind::Error);
            return Mode::Search;
        }
        self.onboarding_mode()
    }

    fn onboarding_mode(&self) -> Mode {
        if !self.view.consent.cookie_accepted() && !self.consent_dismissed {
            Mode::Consent
        } else if !self.view.tour.completed {
            Mode::Tour(0)
        } else {
            Mode::Search
        }
    }

    fn refresh(&mut self) -> Result<()> {
        let (store, scope) = self.session.parts();
        self.view = ReaderView {
            bookmark: state::bookmark(store, scope)?,
            highlights: state::highlights(store, scope)?,
            consent: state::consent_flags(store, scope)?,
            tour: state::tour_state(store, scope)?,
        };
        Ok(())
    }

    fn report_intent(&mut self, intent: &SearchIntent) {
        if intent.is_valid() {
            info!(%intent, scope = %self.session.scope(), "search intent emitted");
            self.set_status(format!("Showing {intent}."), StatusKind::Info);
        } else {
            self.set_status(
                "Could not read that search; the open passage is unchanged.",
                StatusKind::Error,
            );
        }
    }

    fn current_location(&self) -> Option<(BookId, u32)> {
        self.parser
            .current()
            .and_then(SearchIntent::chapter_location)
    }

    fn toggle_bookmark(&mut self) -> Result<()> {
        let Some((book, chapter)) = self.current_location() else {
            self.set_status("Open a chapter to bookmark it.", StatusKind::Error);
            return Ok(());
        };
        let (store, scope) = self.session.parts();
        let marked = state::toggle_bookmark(store, scope, Bookmark { book, chapter })
            .context("failed to save bookmark")?;
        self.refresh()?;

        let text = if marked {
            format!("Bookmarked {book} {chapter}.")
        } else {
            "Bookmark removed.".to_string()
        };
        self.set_status(text, StatusKind::Info);
        Ok(())
    }

    fn jump_to_bookmark(&mut self) {
        match self.view.bookmark {
            Some(mark) => {
                self.parser.show(mark.book, mark.chapter);
                self.set_status(
                    format!("Back at {} {}.", mark.book, mark.chapter),
                    StatusKind::Info,
                );
            }
            None => self.set_status("No bookmark yet.", StatusKind::Error),
        }
    }

    fn toggle_highlight(&mut self) -> Result<()> {
        let Some(verse_id) = self.parser.current().and_then(SearchIntent::verse_id) else {
            self.set_status("Open a verse to highlight it.", StatusKind::Error);
            return Ok(());
        };
        let (store, scope) = self.session.parts();
        let highlighted = state::toggle_highlight(store, scope, &verse_id)
            .context("failed to save highlight")?;
        self.refresh()?;

        let text = if highlighted {
            "Verse highlighted."
        } else {
            "Highlight removed."
        };
        self.set_status(text, StatusKind::Info);
        Ok(())
    }

    fn open_resource(&mut self) -> Result<()> {
        let Some((book, chapter)) = self.current_location() else {
            self.set_status("Open a chapter first.", StatusKind::Error);
            return Ok(());
        };
        let Some(resource) = self.index.lookup(book, chapter).map(str::to_string) else {
            self.set_status(
                format!("No companion resource for {book} {chapter}."),
                StatusKind::Error,
            );
            return Ok(());
        };
        open_link(&resource).with_context(|| format!("failed to open {resource}"))?;
        self.set_status(format!("Opened {resource}."), StatusKind::Info);
        Ok(())
    }

    fn step(&mut self, forward: bool) {
        let Some((book, chapter)) = self.current_location() else {
            self.set_status("Open a chapter first.", StatusKind::Error);
            return;
        };
        let (book, chapter) = step_chapter(book, chapter, forward);
        self.parser.show(book, chapter);
        self.clear_status();
    }

    fn begin_sign_in(&mut self) {
        if self.session.scope().is_anonymous() {
            self.mode = Mode::SigningIn(SignInForm::default());
        } else {
            self.set_status("Already signed in.", StatusKind::Error);
        }
    }

    fn begin_sign_out(&mut self) {
        if self.session.scope().is_anonymous() {
            self.set_status("Not signed in.", StatusKind::Error);
        } else {
            self.mode = Mode::SigningOut(SignOutDialog::new());
        }
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(SEARCH_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(frame.area());

        self.draw_search_bar(frame, chunks[0]);
        self.draw_passage(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);

        let area = frame.area();
        match &self.mode {
            Mode::Search => {}
            Mode::Consent => self.draw_consent(frame, area),
            Mode::Tour(step) => self.draw_tour(frame, area, *step),
            Mode::SigningIn(form) => self.draw_sign_in(frame, area, form),
            Mode::SigningOut(dialog) => self.draw_sign_out(frame, area, dialog),
        }
    }

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect) {
        let hint = match self.parser.state() {
            ParseState::InsideQuote => " (close the quote to search)",
            ParseState::ReferenceMode => " (press Enter to open)",
            ParseState::Idle => "",
        };
        let title = format!("Search as {}{hint}", self.session.scope());
        let block = Block::default().borders(Borders::ALL).title(title);
        let paragraph = Paragraph::new(Span::raw(format!(
            "{SEARCH_PROMPT}{}",
            self.parser.input()
        )))
        .block(block.clone());
        frame.render_widget(paragraph, area);

        if matches!(self.mode, Mode::Search) {
            let inner = block.inner(area);
            let cursor_x = inner.x
                + SEARCH_PROMPT.len() as u16
                + self.parser.input().chars().count() as u16;
            frame.set_cursor_position((cursor_x, inner.y));
        }
    }

    fn draw_passage(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Passage");
        let lines = match self.parser.current() {
            None => vec![Line::from(
                "Nothing open yet. Search for a quoted phrase or a reference.",
            )],
            Some(SearchIntent::PhraseSearch { phrase }) => vec![
                Line::from(Span::styled(
                    format!("Phrase search: \"{phrase}\""),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from("Matching verses are supplied by the verse service."),
            ],
            Some(intent) => self.reference_lines(intent),
        };

        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn reference_lines(&self, intent: &SearchIntent) -> Vec<Line<'static>> {
        let mut lines = vec![Line::from(Span::styled(
            intent.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ))];

        if let Some((book, chapter)) = intent.chapter_location() {
            if self.view.bookmark == Some(Bookmark { book, chapter }) {
                lines.push(Line::from(Span::styled(
                    "Bookmarked",
                    Style::default().fg(Color::Yellow),
                )));
            }
            let resource = self
                .index
                .lookup(book, chapter)
                .map(|resource| format!("Companion resource: {resource}"))
                .unwrap_or_else(|| "No companion resource for this chapter.".to_string());
            lines.push(Line::from(resource));
        }
        if let Some(verse_id) = intent.verse_id() {
            if self.view.highlights.contains(&verse_id) {
                lines.push(Line::from(Span::styled(
                    "Highlighted",
                    Style::default().fg(Color::Magenta),
                )));
            }
        }
        lines.push(Line::from(format!(
            "{} highlighted verse(s) in this profile.",
            self.view.highlights.len()
        )));
        lines
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph = Paragraph::new(vec![status_line, self.footer_instructions()])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let keys: &[(&str, &str)] = match &self.mode {
            Mode::Search => &[
                ("[Enter]", " Open reference   "),
                ("[^B]", " Bookmark   "),
                ("[^L]", " Highlight   "),
                ("[^S/^X]", " Sign in/out   "),
                ("[^T]", " Tour   "),
                ("[Esc]", " Clear/Quit"),
            ],
            Mode::Consent => &[
                ("[a]", " Accept cookies   "),
                ("[c]", " Accept cookies & comments   "),
                ("[Esc]", " Not now"),
            ],
            Mode::Tour(_) => &[("[Enter]", " Next   "), ("[←]", " Back   "), ("[Esc]", " Skip")],
            Mode::SigningIn(_) => &[("[Tab]", " Switch field   "), ("[Enter]", " Sign in   "), ("[Esc]", " Cancel")],
            Mode::SigningOut(_) => &[
                ("[↑↓]", " Navigate   "),
                ("[Space]", " Toggle   "),
                ("[Enter]", " Sign out   "),
                ("[Esc]", " Cancel"),
            ],
        };

        Line::from(
            keys.iter()
                .flat_map(|(key, label)| {
                    [
                        Span::styled(key.to_string(), key_style),
                        Span::raw(label.to_string()),
                    ]
                })
                .collect::<Vec<_>>(),
        )
    }

    fn draw_modal(&self, frame: &mut Frame, area: Rect, title: &str, lines: Vec<Line<'static>>) -> Rect {
        let popup = centered_rect(60, 40, area);
        frame.render_widget(Clear, popup);
        let block = Block::default().borders(Borders::ALL).title(title.to_string());
        let inner = block.inner(popup);
        let paragraph = Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup);
        inner
    }

    fn draw_consent(&self, frame: &mut Frame, area: Rect) {
        let lines = vec![
            Line::from("This reader stores your bookmark, highlights and preferences on this device."),
            Line::from(""),
            Line::from("Accept cookies to keep them, and optionally allow comments."),
        ];
        self.draw_modal(frame, area, "Your privacy", lines);
    }

    fn draw_tour(&self, frame: &mut Frame, area: Rect, step: usize) {
        let text = TOUR_STEPS.get(step).copied().unwrap_or_default();
        let lines = vec![
            Line::from(Span::styled(
                format!("Step {} of {}", step + 1, TOUR_STEPS.len()),
                Style::default().fg(Color::DarkGray),
            )),
            Line::from(""),
            Line::from(text.to_string()),
        ];
        self.draw_modal(frame, area, "Welcome", lines);
    }

    fn draw_sign_in(&self, frame: &mut Frame, area: Rect, form: &SignInForm) {
        let mut lines = vec![
            form.build_line("User id", SignInField::Uid),
            form.build_line("Credential", SignInField::Credential),
        ];
        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        }
        let inner = self.draw_modal(frame, area, "Sign in", lines);

        let (label, row) = match form.active {
            SignInField::Uid => ("User id: ", 0),
            SignInField::Credential => ("Credential: ", 1),
        };
        let cursor_x = inner.x + label.len() as u16 + form.value_len(form.active) as u16;
        frame.set_cursor_position((cursor_x, inner.y + row));
    }

    fn draw_sign_out(&self, frame: &mut Frame, area: Rect, dialog: &SignOutDialog) {
        let mut lines = vec![
            Line::from("Choose what stays on this device after signing out:"),
            Line::from(""),
        ];
        lines.extend(dialog.lines());
        self.draw_modal(frame, area, "Sign out", lines);
    }
}
