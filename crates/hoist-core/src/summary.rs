//! Terminal summary for a finished run.

use std::path::Path;

use crate::model::{Mode, Outcome, TaskStatus};
use crate::orchestrator::Orchestrator;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Summary {
    pub outcome: Outcome,
    pub headline: String,
    /// Binaries the run installed or removed.
    pub binaries: Vec<String>,
    /// One line per recorded error, tagged fatal or skipped.
    pub problems: Vec<String>,
}

impl Summary {
    /// Summarize a finished run; `None` while the run is still selecting or running.
    pub fn from_run(orchestrator: &Orchestrator, prefix: &Path) -> Option<Self> {
        let outcome = orchestrator.outcome()?;
        let mode = orchestrator.selected_mode();

        let headline = match (outcome, mode) {
            (Outcome::Success, Mode::Install) => "Installation complete".to_string(),
            (Outcome::Success, Mode::Uninstall) => "Uninstall complete".to_string(),
            (Outcome::CompletedWithCaveats, _) => {
                format!("{} completed with warnings", mode.label())
            }
            (Outcome::Failed, _) => format!("{} failed", mode.label()),
        };

        let binaries = affected_binaries(orchestrator)
            .into_iter()
            .map(|name| {
                let path = prefix.join(&name);
                match mode {
                    Mode::Install => format!("{} -> {}", name, path.display()),
                    Mode::Uninstall => format!("removed {}", path.display()),
                }
            })
            .collect();

        let problems = orchestrator
            .errors()
            .iter()
            .map(|record| {
                let tag = if record.fatal { "fatal" } else { "skipped" };
                format!("[{}] {}: {}", tag, record.task, record.message)
            })
            .collect();

        Some(Self {
            outcome,
            headline,
            binaries,
            problems,
        })
    }
}

/// Targets whose every task completed, in pipeline order.
fn affected_binaries(orchestrator: &Orchestrator) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for task in orchestrator.tasks() {
        let Some(target) = task.target.as_ref() else {
            continue;
        };
        if !names.contains(target) {
            names.push(target.clone());
        }
    }
    names.retain(|name| {
        orchestrator
            .tasks()
            .iter()
            .filter(|task| task.target.as_ref() == Some(name))
            .all(|task| task.status() == TaskStatus::Complete)
    });
    names
}
