//! Ratatui drawing for the installer screens.
//!
//! Drawing only reads orchestrator state; nothing here mutates it.

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap};
use ratatui::Frame;

use hoist_core::{pipeline, Mode, Outcome, Phase, Task, TaskStatus};

use crate::app::App;
use crate::theme::Theme;

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

pub struct Ui {
    theme: Theme,
}

impl Ui {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    pub fn draw(&self, frame: &mut Frame<'_>, app: &App) {
        frame.render_widget(Clear, frame.area());
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(3),
            ])
            .split(frame.area());

        self.draw_header(frame, layout[0]);
        match app.orchestrator.phase() {
            Phase::Selecting => self.draw_selecting(frame, app, layout[1]),
            Phase::Running | Phase::Finished => self.draw_run(frame, app, layout[1]),
        }
        self.draw_footer(frame, app.orchestrator.phase(), layout[2]);
    }

    fn draw_header(&self, frame: &mut Frame<'_>, area: Rect) {
        let title = Paragraph::new(Line::from(vec![
            Span::styled("hoist", self.theme.title),
            Span::raw("  -  binary installer"),
        ]))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::BOTTOM));
        frame.render_widget(title, area);
    }

    fn draw_selecting(&self, frame: &mut Frame<'_>, app: &App, area: Rect) {
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
            .split(area);

        let selected = app.orchestrator.selected_mode();
        let inner_width = body[0].width.saturating_sub(2) as usize;
        let items = Mode::ALL
            .iter()
            .map(|mode| {
                let style = if *mode == selected {
                    self.theme.selected
                } else {
                    Style::default()
                };
                let label = truncate_to_width(mode.label(), inner_width);
                ListItem::new(Line::from(Span::styled(label, style)))
            })
            .collect::<Vec<_>>();
        let menu = List::new(items).block(Block::default().title("Actions").borders(Borders::ALL));
        frame.render_widget(menu, body[0]);

        let mut lines = vec![
            self.field("Repository: ", app.ctx.repo_root.display().to_string()),
            self.field("Prefix: ", app.ctx.prefix.display().to_string()),
            self.field("Profile: ", app.ctx.profile.clone()),
            Line::from(""),
            Line::from(Span::styled(
                format!("{} plan", selected.label()),
                self.theme.label,
            )),
        ];
        lines.extend(
            pipeline::describe(selected, &app.config.binaries)
                .into_iter()
                .map(Line::from),
        );
        let plan = Paragraph::new(Text::from(lines))
            .block(Block::default().title("Plan").borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        frame.render_widget(plan, body[1]);
    }

    fn draw_run(&self, frame: &mut Frame<'_>, app: &App, area: Rect) {
        let status_lines = self.status_lines(app);
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(status_lines.len() as u16 + 2),
                Constraint::Min(5),
            ])
            .split(area);

        let status = Paragraph::new(Text::from(status_lines))
            .alignment(Alignment::Center)
            .block(Block::default().title("Progress").borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        frame.render_widget(status, layout[0]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(layout[1]);

        let tasks = app.orchestrator.tasks();
        let steps = self
            .render_steps(tasks, app.orchestrator.frame(), body[0].width)
            .block(Block::default().title("Steps").borders(Borders::ALL));
        frame.render_widget(steps, body[0]);

        let logs = render_logs(&app.logs, body[1].width, body[1].height);
        let logs_block = Block::default().title("Logs").borders(Borders::ALL);
        frame.render_widget(Paragraph::new(logs).block(logs_block), body[1]);
    }

    fn status_lines(&self, app: &App) -> Vec<Line<'static>> {
        let mode = app.orchestrator.selected_mode();
        let Some(summary) = app.summary() else {
            let spinner = SPINNER[app.orchestrator.frame() % SPINNER.len()];
            let description = app
                .orchestrator
                .active_task()
                .map(|task| task.description.clone())
                .unwrap_or_default();
            return vec![
                Line::from(Span::styled(
                    format!("{} - In progress", mode.label()),
                    self.theme.running.patch(self.theme.label),
                )),
                Line::from(format!("{} {}", spinner, description)),
            ];
        };

        let style = match summary.outcome {
            Outcome::Success => self.theme.success,
            Outcome::CompletedWithCaveats => self.theme.warning,
            Outcome::Failed => self.theme.failure,
        };
        let mut lines = vec![Line::from(Span::styled(
            summary.headline.clone(),
            style.patch(self.theme.label),
        ))];
        lines.extend(summary.binaries.into_iter().map(Line::from));
        lines.extend(summary.problems.into_iter().map(|problem| {
            let style = if problem.starts_with("[fatal]") {
                self.theme.failure
            } else {
                self.theme.warning
            };
            Line::from(Span::styled(problem, style))
        }));
        lines
    }

    fn render_steps(&self, tasks: &[Task], frame: usize, width: u16) -> List<'static> {
        let inner_width = width.saturating_sub(2) as usize;
        let items = tasks
            .iter()
            .map(|task| {
                let (symbol, style) = match task.status() {
                    TaskStatus::Pending => ("[ ]".to_string(), self.theme.muted),
                    TaskStatus::Running => (
                        format!("[{}]", SPINNER[frame % SPINNER.len()]),
                        self.theme.running,
                    ),
                    TaskStatus::Complete => ("[ok]".to_string(), self.theme.success),
                    TaskStatus::Skipped => ("[--]".to_string(), self.theme.warning),
                    TaskStatus::Failed => ("[!!]".to_string(), self.theme.failure),
                };
                let available = inner_width.saturating_sub(symbol.len() + 1);
                let label = truncate_to_width(&task.name, available);
                ListItem::new(Line::from(vec![
                    Span::styled(symbol, style.patch(self.theme.label)),
                    Span::raw(" "),
                    Span::raw(label),
                ]))
            })
            .collect::<Vec<_>>();
        List::new(items)
    }

    fn draw_footer(&self, frame: &mut Frame<'_>, phase: Phase, area: Rect) {
        let bindings: &[(&str, &str)] = match phase {
            Phase::Selecting => &[("Enter", "run"), ("Up/Down", "move"), ("Q", "quit")],
            Phase::Running => &[],
            Phase::Finished => &[("Enter", "exit"), ("R", "start over"), ("Q", "quit")],
        };
        let mut spans = Vec::new();
        if bindings.is_empty() {
            spans.push(Span::styled("Running...", self.theme.muted));
        }
        for (key, action) in bindings {
            spans.push(Span::styled(*key, self.theme.label));
            spans.push(Span::raw(format!(" = {}  ", action)));
        }
        let footer = Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::TOP));
        frame.render_widget(footer, area);
    }

    fn field(&self, label: &'static str, value: String) -> Line<'static> {
        Line::from(vec![
            Span::styled(label, self.theme.label),
            Span::raw(value),
        ])
    }
}

/// Wrapped log lines, keeping only the tail that fits in the pane.
fn render_logs(logs: &[String], width: u16, height: u16) -> Text<'static> {
    let inner_width = width.saturating_sub(2) as usize;
    let visible = height.saturating_sub(2) as usize;
    let mut lines = Vec::new();
    for line in logs {
        for wrapped in wrap_line(line, inner_width) {
            lines.push(Line::from(truncate_to_width(&wrapped, inner_width)));
        }
    }
    let skip = lines.len().saturating_sub(visible);
    Text::from(lines.split_off(skip))
}

fn wrap_line(line: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![String::new()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    let sanitized = line.replace('\t', " ");

    for word in sanitized.split_whitespace() {
        let word_width = word.chars().count();
        if word_width > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            lines.extend(break_long_word(word, width));
            continue;
        }

        let next_len = if current.is_empty() {
            word_width
        } else {
            current.chars().count() + 1 + word_width
        };

        if next_len > width {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        } else {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

fn break_long_word(word: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    chars
        .chunks(width.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}

fn truncate_to_width(text: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let len = text.chars().count();
    if len <= width {
        return text.to_string();
    }
    if width <= 3 {
        return text.chars().take(width).collect();
    }
    let mut out: String = text.chars().take(width - 3).collect();
    out.push_str("...");
    out
}
