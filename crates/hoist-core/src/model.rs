//! Shared installer types for mode selection and task progress.

use std::fmt;
use std::sync::Arc;

use crate::actions::Work;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Mode {
    Install,
    Uninstall,
}

impl Mode {
    pub const ALL: [Mode; 2] = [Mode::Install, Mode::Uninstall];

    pub fn label(self) -> &'static str {
        match self {
            Mode::Install => "Install",
            Mode::Uninstall => "Uninstall",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Phase {
    /// Waiting for the user to pick a mode.
    Selecting,
    /// A pipeline is executing.
    Running,
    /// The pipeline resolved or halted on a fatal error.
    Finished,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    Up,
    Down,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TaskStatus {
    Pending,
    Running,
    Complete,
    Failed,
    Skipped,
}

impl TaskStatus {
    /// True once the orchestrator has recorded an outcome for the task.
    pub fn is_resolved(self) -> bool {
        matches!(
            self,
            TaskStatus::Complete | TaskStatus::Failed | TaskStatus::Skipped
        )
    }
}

/// One named unit of installer work plus its orchestrator-owned status.
pub struct Task {
    pub name: String,
    pub description: String,
    pub optional: bool,
    /// Binary this task builds, installs, or removes.
    pub target: Option<String>,
    pub(crate) work: Arc<dyn Work>,
    pub(crate) status: TaskStatus,
}

impl Task {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        optional: bool,
        work: Arc<dyn Work>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            optional,
            target: None,
            work,
            status: TaskStatus::Pending,
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("optional", &self.optional)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ErrorRecord {
    pub task: String,
    pub message: String,
    pub fatal: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    Success,
    CompletedWithCaveats,
    Failed,
}

impl Outcome {
    pub fn from_errors(errors: &[ErrorRecord]) -> Self {
        if errors.iter().any(|record| record.fatal) {
            Outcome::Failed
        } else if errors.is_empty() {
            Outcome::Success
        } else {
            Outcome::CompletedWithCaveats
        }
    }
}
