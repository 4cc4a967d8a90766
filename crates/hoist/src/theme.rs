//! Immutable color and style choices for the installer screens.

use ratatui::style::{Color, Modifier, Style};

#[derive(Clone, Debug)]
pub struct Theme {
    pub title: Style,
    pub label: Style,
    pub muted: Style,
    pub running: Style,
    pub success: Style,
    pub warning: Style,
    pub failure: Style,
    pub selected: Style,
}

impl Default for Theme {
    fn default() -> Self {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        Self {
            title: bold.fg(Color::Cyan),
            label: bold,
            muted: Style::default().fg(Color::Gray),
            running: Style::default().fg(Color::Yellow),
            success: Style::default().fg(Color::Green),
            warning: Style::default().fg(Color::Yellow),
            failure: Style::default().fg(Color::Red),
            selected: bold.fg(Color::Black).bg(Color::Cyan),
        }
    }
}
