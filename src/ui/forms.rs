use anyhow::{anyhow, Result};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::identity::RetainFlags;

/// Sign-in form. The auth provider is external; the reader pastes the user id
/// and the credential it issued.
#[derive(Default, Clone)]
pub(crate) struct SignInForm {
    pub(crate) uid: String,
    pub(crate) credential: String,
    pub(crate) active: SignInField,
    pub(crate) error: Option<String>,
}

#[derive(Copy, Clone, Default, PartialEq, Eq)]
pub(crate) enum SignInField {
    #[default]
    Uid,
    Credential,
}

impl SignInForm {
    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            SignInField::Uid => SignInField::Credential,
            SignInField::Credential => SignInField::Uid,
        };
    }

    fn active_value(&mut self) -> &mut String {
        match self.active {
            SignInField::Uid => &mut self.uid,
            SignInField::Credential => &mut self.credential,
        }
    }

    /// User ids end up inside storage keys, so whitespace is refused there.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() || (self.active == SignInField::Uid && ch.is_whitespace()) {
            return false;
        }
        self.active_value().push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.active_value().pop();
    }

    pub(crate) fn parse_inputs(&self) -> Result<(String, String)> {
        let uid = self.uid.trim();
        if uid.is_empty() {
            return Err(anyhow!("User id is required."));
        }
        let credential = self.credential.trim();
        if credential.is_empty() {
            return Err(anyhow!("Credential is required."));
        }
        Ok((uid.to_string(), credential.to_string()))
    }

    pub(crate) fn build_line(&self, field_name: &str, field: SignInField) -> Line<'static> {
        let value = match field {
            SignInField::Uid => self.uid.clone(),
            SignInField::Credential => "*".repeat(self.credential.chars().count()),
        };
        let is_active = self.active == field;

        let (display, style) = if value.is_empty() {
            ("<required>".to_string(), Style::default().fg(Color::DarkGray))
        } else {
            (value, Style::default())
        };
        let style = if is_active {
            style.fg(Color::Yellow)
        } else {
            style
        };

        Line::from(vec![
            Span::raw(format!("{field_name}: ")),
            Span::styled(display, style),
        ])
    }

    pub(crate) fn value_len(&self, field: SignInField) -> usize {
        match field {
            SignInField::Uid => self.uid.chars().count(),
            SignInField::Credential => self.credential.chars().count(),
        }
    }
}

/// Retention choices shown before signing out. Everything starts retained so
/// an accidental confirm never deletes anything.
pub(crate) struct SignOutDialog {
    pub(crate) retain: RetainFlags,
    pub(crate) selected: usize,
}

const SIGN_OUT_OPTIONS: [&str; 3] = ["Keep highlighted verses", "Keep bookmark", "Stay remembered"];

impl SignOutDialog {
    pub(crate) fn new() -> Self {
        Self {
            retain: RetainFlags::KEEP_ALL,
            selected: 0,
        }
    }

    pub(crate) fn next(&mut self) {
        self.selected = (self.selected + 1) % SIGN_OUT_OPTIONS.len();
    }

    pub(crate) fn previous(&mut self) {
        self.selected = (self.selected + SIGN_OUT_OPTIONS.len() - 1) % SIGN_OUT_OPTIONS.len();
    }

    pub(crate) fn toggle_selected(&mut self) {
        let flag = match self.selected {
            0 => &mut self.retain.highlights,
            1 => &mut self.retain.bookmark,
            _ => &mut self.retain.session_credential,
        };
        *flag = !*flag;
    }

    pub(crate) fn lines(&self) -> Vec<Line<'static>> {
        let flags = [
            self.retain.highlights,
            self.retain.bookmark,
            self.retain.session_credential,
        ];
        SIGN_OUT_OPTIONS
            .iter()
            .zip(flags)
            .enumerate()
            .map(|(index, (label, kept))| {
                let marker = if kept { "[x]" } else { "[ ]" };
                let style = if index == self.selected {
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                Line::from(Span::styled(format!("{marker} {label}"), style))
            })
            .collect()
    }
}
