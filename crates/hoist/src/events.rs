//! Event types feeding the installer loop and the key bindings that map onto them.

use crossterm::event::{Event as InputEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use hoist_core::{Direction, Event, TaskCompletion};

pub enum UiMessage {
    Input(InputEvent),
    Tick,
    Task(TaskCompletion),
    Log(String),
}

pub fn map_key(key: KeyEvent) -> Option<Event> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Event::CancelRequested);
    }
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => Some(Event::SelectionMoved(Direction::Up)),
        KeyCode::Down | KeyCode::Char('j') => Some(Event::SelectionMoved(Direction::Down)),
        KeyCode::Enter => Some(Event::Confirmed),
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Some(Event::CancelRequested),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(Event::RestartRequested),
        _ => None,
    }
}
