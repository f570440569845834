use crossterm::event::KeyCode;

use crate::app::{AppState, Mode};

/// Edits the event text filter. Enter keeps the query, Esc drops it.
pub fn handle_key(key: KeyCode, state: &mut AppState) {
    match key {
        KeyCode::Char(c) => {
            state.filter.query.push(c);
            state.reset_event_selection();
        }
        KeyCode::Backspace => {
            state.filter.query.pop();
            state.reset_event_selection();
        }
        KeyCode::Enter => state.mode = Mode::Normal,
        KeyCode::Esc => {
            state.filter.query.clear();
            state.reset_event_selection();
            state.mode = Mode::Normal;
        }
        _ => {}
    }
}
