//! hoist installer entrypoint with a ratatui-driven flow.

mod app;
mod effects;
mod events;
mod logging;
mod terminal;
mod theme;
mod ui;

use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event as InputEvent};
use hoist_core::paths::find_repo_root;
use hoist_core::{pipeline, Config, Event, Mode, Phase, RunContext};

use crate::app::App;
use crate::effects::apply_event;
use crate::events::{map_key, UiMessage};
use crate::terminal::TerminalGuard;
use crate::theme::Theme;
use crate::ui::Ui;

const TICK_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Path to hoist.toml (defaults to the one in the repository root)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Install directory, overriding the configured prefix
    #[arg(long)]
    prefix: Option<PathBuf>,

    /// Workspace to build from
    #[arg(long)]
    repo_root: Option<PathBuf>,

    /// Validate configuration, print both plans, and exit
    #[arg(long)]
    check: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let repo_root = find_repo_root(args.repo_root.as_deref())?;
    let mut config = Config::load(args.config.as_deref(), &repo_root).context("load config")?;
    if let Some(prefix) = args.prefix {
        config.prefix = prefix;
    }

    if args.check {
        print_plans(&config, &repo_root);
        return Ok(());
    }

    let (ui_tx, ui_rx) = mpsc::channel::<UiMessage>();
    logging::init_tracing(&config, ui_tx.clone());

    let ctx = Arc::new(RunContext::new(repo_root, &config));
    let mut app = App::new(config, ctx);
    let ui = Ui::new(Theme::default());

    let mut terminal_guard = TerminalGuard::new()?;
    let result = run_app(&mut terminal_guard, &mut app, &ui, ui_tx, ui_rx);
    terminal_guard.restore()?;
    result?;

    if let Some(summary) = app.summary() {
        println!("{}", summary.headline);
        for line in summary.binaries.iter().chain(summary.problems.iter()) {
            println!("  {}", line);
        }
    }
    Ok(())
}

fn run_app(
    terminal_guard: &mut TerminalGuard,
    app: &mut App,
    ui: &Ui,
    ui_tx: mpsc::Sender<UiMessage>,
    ui_rx: mpsc::Receiver<UiMessage>,
) -> Result<()> {
    spawn_input_thread(ui_tx.clone());
    spawn_tick_thread(ui_tx.clone());

    terminal_guard
        .terminal_mut()
        .draw(|frame| ui.draw(frame, app))?;

    loop {
        let event = match ui_rx.recv() {
            Ok(UiMessage::Input(InputEvent::Key(key))) => map_key(key),
            Ok(UiMessage::Input(InputEvent::Resize(_, _))) => None,
            Ok(UiMessage::Input(_)) => continue,
            Ok(UiMessage::Tick) => {
                if app.orchestrator.phase() != Phase::Running {
                    continue;
                }
                Some(Event::Tick)
            }
            Ok(UiMessage::Task(completion)) => Some(completion.into()),
            Ok(UiMessage::Log(line)) => {
                app.push_log(line);
                None
            }
            Err(_) => return Ok(()),
        };

        if let Some(event) = event {
            if apply_event(app, &ui_tx, event, cfg!(debug_assertions))? {
                return Ok(());
            }
        }

        terminal_guard
            .terminal_mut()
            .draw(|frame| ui.draw(frame, app))?;
    }
}

fn spawn_input_thread(ui_tx: mpsc::Sender<UiMessage>) {
    // Forward blocking terminal events to the UI thread; exit on channel close.
    thread::spawn(move || {
        while let Ok(event) = event::read() {
            if ui_tx.send(UiMessage::Input(event)).is_err() {
                break;
            }
        }
    });
}

fn spawn_tick_thread(ui_tx: mpsc::Sender<UiMessage>) {
    thread::spawn(move || loop {
        thread::sleep(TICK_INTERVAL);
        if ui_tx.send(UiMessage::Tick).is_err() {
            break;
        }
    });
}

fn print_plans(config: &Config, repo_root: &std::path::Path) {
    println!("Configuration OK");
    println!("  repository: {}", repo_root.display());
    println!("  prefix:     {}", config.prefix.display());
    println!("  profile:    {}", config.profile);
    for mode in Mode::ALL {
        println!("{} plan:", mode.label());
        for line in pipeline::describe(mode, &config.binaries) {
            println!("  {}", line);
        }
    }
}
