//! Keyboard handling, per input mode.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Which part of the UI receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Dashboard, no popup
    Normal,
    /// Date picker open
    DatePicker,
    /// Country search open
    Selector,
    /// Full-screen error view
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    OpenSelector,
    ToggleDatePicker,
    Close,
    SwitchField,
    ShiftDays(i64),
    ShiftMonths(i32),
    Input(char),
    Backspace,
    MoveUp,
    MoveDown,
    Confirm,
    Retry,
    None,
}

/// Process keyboard input
#[inline]
pub fn handle_key(key: KeyEvent, mode: Mode) -> Action {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }

    match mode {
        Mode::Normal => match key.code {
            KeyCode::Char('q') => Action::Quit,
            KeyCode::Char('/') | KeyCode::Char('c') => Action::OpenSelector,
            KeyCode::Char('d') => Action::ToggleDatePicker,
            _ => Action::None,
        },
        Mode::DatePicker => match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('d') => Action::ToggleDatePicker,
            KeyCode::Char('q') => Action::Quit,
            KeyCode::Tab | KeyCode::BackTab => Action::SwitchField,
            KeyCode::Left | KeyCode::Char('h') => Action::ShiftDays(-1),
            KeyCode::Right | KeyCode::Char('l') => Action::ShiftDays(1),
            KeyCode::Up | KeyCode::Char('k') => Action::ShiftMonths(1),
            KeyCode::Down | KeyCode::Char('j') => Action::ShiftMonths(-1),
            KeyCode::PageUp => Action::ShiftMonths(12),
            KeyCode::PageDown => Action::ShiftMonths(-12),
            _ => Action::None,
        },
        Mode::Selector => match key.code {
            KeyCode::Esc => Action::Close,
            KeyCode::Enter => Action::Confirm,
            KeyCode::Up => Action::MoveUp,
            KeyCode::Down => Action::MoveDown,
            KeyCode::Backspace => Action::Backspace,
            KeyCode::Char(c) => Action::Input(c),
            _ => Action::None,
        },
        Mode::Error => match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            KeyCode::Enter | KeyCode::Char('b') | KeyCode::Char('r') => Action::Retry,
            _ => Action::None,
        },
    }
}
