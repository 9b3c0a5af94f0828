//! Terminal dashboard.
//!
//! The UI loop owns the [`DashboardState`]. Network work runs on spawned
//! tasks that report back over a channel; stale results are filtered by
//! the state's request tags.

mod dashboard;
pub mod keybindings;
pub mod state;
pub mod widgets;

use crate::api::{CountryCatalog, DataSource, RequestTag};
use crate::core::{Config, CountrySnapshot, DashError, Result};
use crate::series::DateRange;
use chrono::{Local, NaiveDate};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind, MouseButton, MouseEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use keybindings::{handle_key, Action, Mode};
use ratatui::{backend::CrosstermBackend, Terminal};
use state::{DashboardState, Overlay, Phase, RangeEdit};
use std::io;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Results coming back from background tasks.
#[derive(Debug)]
pub enum Message {
    /// Country list finished loading
    Catalog(Result<CountryCatalog>),
    /// A tagged joint fetch finished
    Snapshot(RequestTag, Result<CountrySnapshot>),
}

/// Today in the local calendar.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn spawn_fetch(source: &Arc<dyn DataSource>, tag: RequestTag, tx: &mpsc::UnboundedSender<Message>) {
    let source = Arc::clone(source);
    let tx = tx.clone();
    tokio::spawn(async move {
        let outcome = source.fetch_snapshot(&tag.country).await;
        if tx.send(Message::Snapshot(tag, outcome)).is_err() {
            tracing::debug!("Dashboard closed before fetch finished");
        }
    });
}

fn spawn_catalog(source: &Arc<dyn DataSource>, tx: &mpsc::UnboundedSender<Message>) {
    let source = Arc::clone(source);
    let tx = tx.clone();
    tokio::spawn(async move {
        let outcome = source.load_catalog().await;
        if tx.send(Message::Catalog(outcome)).is_err() {
            tracing::debug!("Dashboard closed before catalog loaded");
        }
    });
}

/// Input mode for the current state.
pub fn mode_of(state: &DashboardState) -> Mode {
    if matches!(state.phase(), Phase::Failed(_)) {
        return Mode::Error;
    }
    match state.overlay() {
        Overlay::None => Mode::Normal,
        Overlay::DatePicker { .. } => Mode::DatePicker,
        Overlay::Selector { .. } => Mode::Selector,
    }
}

/// Apply one key action. Returns a tag when a fetch has to start.
pub fn apply_action(state: &mut DashboardState, action: Action, today: NaiveDate) -> Option<RequestTag> {
    match action {
        Action::Quit => state.should_quit = true,
        Action::OpenSelector => state.open_selector(),
        Action::ToggleDatePicker => state.toggle_date_picker(),
        Action::Close => state.close_overlay(),
        Action::SwitchField => state.switch_picker_field(),
        Action::ShiftDays(days) => {
            state.edit_range(RangeEdit::Days(days), today);
        },
        Action::ShiftMonths(months) => {
            state.edit_range(RangeEdit::Months(months), today);
        },
        Action::Input(c) => state.selector_input(c),
        Action::Backspace => state.selector_backspace(),
        Action::MoveUp => state.selector_move(-1),
        Action::MoveDown => state.selector_move(1),
        Action::Confirm => return state.selector_confirm(),
        Action::Retry => return Some(state.retry(today)),
        Action::None => {},
    }
    None
}

/// Run the dashboard until the user quits.
pub async fn run_dashboard(source: Arc<dyn DataSource>, config: Arc<Config>, range: Option<DateRange>) -> Result<()> {
    // Setup terminal
    enable_raw_mode().map_err(|e| DashError::terminal(format!("Failed to enable raw mode: {}", e)))?;
    let mut stdout = io::stdout();
    stdout
        .execute(EnterAlternateScreen)
        .map_err(|e| DashError::terminal(format!("Failed to enter alternate screen: {}", e)))?;
    if config.ui.mouse {
        stdout
            .execute(EnableMouseCapture)
            .map_err(|e| DashError::terminal(format!("Failed to enable mouse capture: {}", e)))?;
    }

    let backend = CrosstermBackend::new(stdout);
    let mut terminal =
        Terminal::new(backend).map_err(|e| DashError::terminal(format!("Failed to create terminal: {}", e)))?;

    let result = event_loop(&mut terminal, source, &config, range).await;

    // Cleanup
    disable_raw_mode().map_err(|e| DashError::terminal(format!("Failed to disable raw mode: {}", e)))?;
    if config.ui.mouse {
        terminal
            .backend_mut()
            .execute(DisableMouseCapture)
            .map_err(|e| DashError::terminal(format!("Failed to disable mouse capture: {}", e)))?;
    }
    terminal
        .backend_mut()
        .execute(LeaveAlternateScreen)
        .map_err(|e| DashError::terminal(format!("Failed to leave alternate screen: {}", e)))?;
    terminal
        .show_cursor()
        .map_err(|e| DashError::terminal(format!("Failed to show cursor: {}", e)))?;

    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    source: Arc<dyn DataSource>,
    config: &Config,
    range: Option<DateRange>,
) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();

    let mut state = DashboardState::new(&config.ui.default_country, config.ui.default_start, today());
    if let Some(range) = range {
        state = state.with_range(range);
    }

    spawn_catalog(&source, &tx);
    let tag = state.start_fetch();
    spawn_fetch(&source, tag, &tx);

    let tick_rate = config.ui.tick_rate;

    loop {
        // Commit whatever finished since the last frame
        while let Ok(message) = rx.try_recv() {
            match message {
                Message::Catalog(outcome) => state.apply_catalog(outcome),
                Message::Snapshot(tag, outcome) => {
                    state.apply_snapshot(&tag, outcome);
                },
            }
        }

        terminal
            .draw(|f| dashboard::draw(f, &mut state))
            .map_err(|e| DashError::terminal(format!("Failed to draw: {}", e)))?;

        if event::poll(tick_rate).map_err(|e| DashError::terminal(format!("Failed to poll events: {}", e)))? {
            let fetch = match event::read().map_err(|e| DashError::terminal(format!("Failed to read event: {}", e)))? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    let action = handle_key(key, mode_of(&state));
                    apply_action(&mut state, action, today())
                },
                Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                    state.click(mouse.column, mouse.row);
                    None
                },
                _ => None,
            };
            if let Some(tag) = fetch {
                spawn_fetch(&source, tag, &tx);
            }
        }

        if state.should_quit {
            break;
        }

        // Let spawned fetches make progress between polls
        tokio::task::yield_now().await;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_modes_follow_state() {
        let today = date(2023, 1, 1);
        let mut state = DashboardState::new("us", date(2020, 10, 1), today);
        assert_eq!(mode_of(&state), Mode::Normal);

        state.toggle_date_picker();
        assert_eq!(mode_of(&state), Mode::DatePicker);

        let tag = state.start_fetch();
        state.apply_snapshot(&tag, Err(DashError::fetch("us", "boom")));
        assert_eq!(mode_of(&state), Mode::Error);
    }

    #[test]
    fn test_retry_action_starts_fetch() {
        let today = date(2023, 1, 1);
        let mut state = DashboardState::new("us", date(2020, 10, 1), today);
        let tag = state.start_fetch();
        state.apply_snapshot(&tag, Err(DashError::fetch("us", "boom")));

        let action = handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE), mode_of(&state));
        let retry = apply_action(&mut state, action, today);

        assert_eq!(retry.map(|t| t.country), Some("us".to_string()));
        assert_eq!(mode_of(&state), Mode::Normal);
    }

    #[test]
    fn test_quit_action() {
        let mut state = DashboardState::new("us", date(2020, 10, 1), date(2023, 1, 1));
        assert!(apply_action(&mut state, Action::Quit, date(2023, 1, 1)).is_none());
        assert!(state.should_quit);
    }
}
