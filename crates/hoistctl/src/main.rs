//! Headless installer: runs the same pipelines as the TUI and prints a summary.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hoist_core::paths::find_repo_root;
use hoist_core::{
    dispatch, pipeline, Config, Direction, Effect, Event, Mode, Orchestrator, Outcome, RunContext,
    Summary, TaskCompletion,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Path to hoist.toml (defaults to the one in the repository root)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Install directory, overriding the configured prefix
    #[arg(long, global = true)]
    prefix: Option<PathBuf>,

    /// Workspace to build from
    #[arg(long, global = true)]
    repo_root: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Build both binaries and install them into the prefix
    Install,
    /// Remove both binaries from the prefix
    Uninstall,
    /// Print the install and uninstall plans
    Plan,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let repo_root = find_repo_root(args.repo_root.as_deref())?;
    let mut config = Config::load(args.config.as_deref(), &repo_root).context("load config")?;
    if let Some(prefix) = args.prefix {
        config.prefix = prefix;
    }
    init_tracing(&config);

    let mode = match args.command {
        Command::Install => Mode::Install,
        Command::Uninstall => Mode::Uninstall,
        Command::Plan => {
            for mode in Mode::ALL {
                println!("{} plan:", mode.label());
                for line in pipeline::describe(mode, &config.binaries) {
                    println!("  {}", line);
                }
            }
            return Ok(ExitCode::SUCCESS);
        }
    };

    let ctx = Arc::new(RunContext::new(repo_root, &config));
    let mut orchestrator = Orchestrator::new(config.binaries.clone());
    run(&mut orchestrator, mode, &ctx)?;

    let summary = Summary::from_run(&orchestrator, &ctx.prefix)
        .context("run ended before the pipeline finished")?;
    println!("{}", summary.headline);
    for line in summary.binaries.iter().chain(summary.problems.iter()) {
        println!("  {}", line);
    }

    Ok(match summary.outcome {
        Outcome::Failed => ExitCode::FAILURE,
        Outcome::Success | Outcome::CompletedWithCaveats => ExitCode::SUCCESS,
    })
}

/// Select `mode`, confirm, and pump completions until the orchestrator stops
/// requesting work.
fn run(orchestrator: &mut Orchestrator, mode: Mode, ctx: &Arc<RunContext>) -> Result<()> {
    let (tx, rx) = mpsc::channel::<TaskCompletion>();

    if mode == Mode::Uninstall {
        orchestrator.reduce(Event::SelectionMoved(Direction::Down))?;
    }
    info!(mode = mode.label(), "starting headless run");
    let mut effects = orchestrator.reduce(Event::Confirmed)?;

    loop {
        let mut scheduled = false;
        for effect in effects.drain(..) {
            match effect {
                Effect::Execute(request) => {
                    let tx = tx.clone();
                    dispatch(request, Arc::clone(ctx), move |completion| {
                        let _ = tx.send(completion);
                    });
                    scheduled = true;
                }
                Effect::Exit => return Ok(()),
            }
        }
        if !scheduled {
            return Ok(());
        }
        let completion = rx.recv().context("task worker disconnected")?;
        effects = orchestrator.reduce(completion.into())?;
    }
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(
            config
                .log_level
                .clone()
                .unwrap_or_else(|| "info".to_string()),
        )
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
