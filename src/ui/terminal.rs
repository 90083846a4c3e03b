use std::io::{self, Stdout};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use super::app::App;

type ReaderTerminal = Terminal<CrosstermBackend<Stdout>>;

/// Show the reader: search box on top, the open passage below, and the
/// onboarding or sign-in dialogs over it. Runs until Esc on an empty search
/// box or Ctrl+Q, then hands the terminal back in its original state.
pub fn run_app(app: &mut App) -> Result<()> {
    let mut terminal = enter_reader_screen()?;
    let result = event_loop(&mut terminal, app);
    restore_terminal(&mut terminal)?;
    result
}

fn enter_reader_screen() -> Result<ReaderTerminal> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    Terminal::new(CrosstermBackend::new(stdout)).context("failed to create terminal backend")
}

/// Ctrl+letter goes to the shortcut table; every other key to the open mode.
fn event_loop(terminal: &mut ReaderTerminal, app: &mut App) -> Result<()> {
    loop {
        terminal
            .draw(|frame| app.draw(frame))
            .context("failed to draw frame")?;

        if !event::poll(Duration::from_millis(250)).context("event polling failed")? {
            continue;
        }
        let Event::Key(key_event) = event::read().context("failed to read event")? else {
            continue;
        };
        if key_event.kind != KeyEventKind::Press {
            continue;
        }

        let exit = match key_event.code {
            KeyCode::Char(ch) if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
                app.handle_ctrl(ch.to_ascii_lowercase())?
            }
            code => app.handle_key(code)?,
        };
        if exit {
            return Ok(());
        }
    }
}

fn restore_terminal(terminal: &mut ReaderTerminal) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal
        .show_cursor()
        .context("failed to restore cursor visibility")
}
