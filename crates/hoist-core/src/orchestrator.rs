//! Run state machine for installer pipelines.
//!
//! The orchestrator owns the pipeline and every task status. Frontends feed it
//! events one at a time and carry out the effects it returns; it never runs
//! work itself, so at most one execution request is outstanding at any time.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::actions::Work;
use crate::config::BinaryPair;
use crate::model::{Direction, ErrorRecord, Mode, Outcome, Phase, Task, TaskStatus};
use crate::pipeline;

/// Inputs the orchestrator reacts to, consumed strictly in arrival order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Event {
    SelectionMoved(Direction),
    Confirmed,
    CancelRequested,
    RestartRequested,
    TaskCompleted {
        index: usize,
        result: Result<(), String>,
    },
    Tick,
}

/// Work the frontend must schedule after an event is reduced.
#[derive(Debug)]
pub enum Effect {
    Execute(ExecutionRequest),
    Exit,
}

/// Read-only handle to the task a worker should run.
#[derive(Clone)]
pub struct ExecutionRequest {
    pub index: usize,
    pub name: String,
    pub work: Arc<dyn Work>,
}

impl fmt::Debug for ExecutionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionRequest")
            .field("index", &self.index)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum OrchestratorError {
    #[error("completion reported for task {index} while no task is running")]
    NoActiveTask { index: usize },
    #[error("completion reported for task {index} but task {active} is active")]
    UnexpectedCompletion { index: usize, active: usize },
}

type Planner = Box<dyn Fn(Mode) -> Vec<Task> + Send>;

pub struct Orchestrator {
    phase: Phase,
    selected: Mode,
    pipeline: Vec<Task>,
    active: Option<usize>,
    errors: Vec<ErrorRecord>,
    frame: usize,
    planner: Planner,
}

impl Orchestrator {
    /// Orchestrator whose pipelines come from the standard install/uninstall plans.
    pub fn new(binaries: BinaryPair) -> Self {
        Self::with_planner(move |mode| pipeline::build(mode, &binaries))
    }

    pub fn with_planner(planner: impl Fn(Mode) -> Vec<Task> + Send + 'static) -> Self {
        Self {
            phase: Phase::Selecting,
            selected: Mode::Install,
            pipeline: Vec::new(),
            active: None,
            errors: Vec::new(),
            frame: 0,
            planner: Box::new(planner),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn selected_mode(&self) -> Mode {
        self.selected
    }

    pub fn tasks(&self) -> &[Task] {
        &self.pipeline
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn active_task(&self) -> Option<&Task> {
        self.active.and_then(|index| self.pipeline.get(index))
    }

    pub fn errors(&self) -> &[ErrorRecord] {
        &self.errors
    }

    /// Animation frame, advanced by ticks while a task is running.
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// Final verdict, available once the run is finished.
    pub fn outcome(&self) -> Option<Outcome> {
        match self.phase {
            Phase::Finished => Some(Outcome::from_errors(&self.errors)),
            Phase::Selecting | Phase::Running => None,
        }
    }

    pub fn reduce(&mut self, event: Event) -> Result<Vec<Effect>, OrchestratorError> {
        match event {
            Event::SelectionMoved(direction) => {
                if self.phase == Phase::Selecting {
                    self.move_selection(direction);
                }
                Ok(Vec::new())
            }
            Event::Confirmed => Ok(match self.phase {
                Phase::Selecting => self.start_run(),
                Phase::Running => Vec::new(),
                Phase::Finished => vec![Effect::Exit],
            }),
            Event::CancelRequested => Ok(match self.phase {
                Phase::Running => {
                    debug!("cancel ignored while a task is running");
                    Vec::new()
                }
                Phase::Selecting | Phase::Finished => vec![Effect::Exit],
            }),
            Event::RestartRequested => {
                if self.phase == Phase::Finished {
                    self.reset();
                }
                Ok(Vec::new())
            }
            Event::TaskCompleted { index, result } => self.complete(index, result),
            Event::Tick => {
                if self.phase == Phase::Running {
                    self.frame = self.frame.wrapping_add(1);
                }
                Ok(Vec::new())
            }
        }
    }

    fn move_selection(&mut self, direction: Direction) {
        let current = Mode::ALL
            .iter()
            .position(|mode| *mode == self.selected)
            .unwrap_or(0);
        let next = match direction {
            Direction::Up => current.saturating_sub(1),
            Direction::Down => (current + 1).min(Mode::ALL.len() - 1),
        };
        self.selected = Mode::ALL[next];
    }

    fn start_run(&mut self) -> Vec<Effect> {
        self.pipeline = (self.planner)(self.selected);
        self.errors.clear();
        self.frame = 0;
        self.phase = Phase::Running;
        info!(
            mode = self.selected.label(),
            tasks = self.pipeline.len(),
            "starting run"
        );
        self.activate(0)
    }

    fn activate(&mut self, index: usize) -> Vec<Effect> {
        let Some(task) = self.pipeline.get_mut(index) else {
            self.finish();
            return Vec::new();
        };
        task.status = TaskStatus::Running;
        self.active = Some(index);
        debug!(index, task = %task.name, "task started");
        vec![Effect::Execute(ExecutionRequest {
            index,
            name: task.name.clone(),
            work: Arc::clone(&task.work),
        })]
    }

    fn complete(
        &mut self,
        index: usize,
        result: Result<(), String>,
    ) -> Result<Vec<Effect>, OrchestratorError> {
        let active = match (self.phase, self.active) {
            (Phase::Running, Some(active)) => active,
            _ => return Err(OrchestratorError::NoActiveTask { index }),
        };
        if index != active {
            return Err(OrchestratorError::UnexpectedCompletion { index, active });
        }

        let task = &mut self.pipeline[index];
        match result {
            Ok(()) => {
                task.status = TaskStatus::Complete;
                info!(task = %task.name, "task complete");
            }
            Err(message) if task.optional => {
                task.status = TaskStatus::Skipped;
                warn!(task = %task.name, %message, "optional task failed; skipping");
                self.errors.push(ErrorRecord {
                    task: task.name.clone(),
                    message,
                    fatal: false,
                });
            }
            Err(message) => {
                task.status = TaskStatus::Failed;
                warn!(task = %task.name, %message, "task failed; halting run");
                self.errors.push(ErrorRecord {
                    task: task.name.clone(),
                    message,
                    fatal: true,
                });
                self.finish();
                return Ok(Vec::new());
            }
        }

        Ok(self.activate(index + 1))
    }

    fn finish(&mut self) {
        self.phase = Phase::Finished;
        self.active = None;
        info!(outcome = ?Outcome::from_errors(&self.errors), "run finished");
    }

    fn reset(&mut self) {
        self.phase = Phase::Selecting;
        self.pipeline.clear();
        self.errors.clear();
        self.active = None;
        self.frame = 0;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use anyhow::{anyhow, Result};

    use super::*;
    use crate::actions::RunContext;

    struct Scripted {
        failure: Option<&'static str>,
        calls: Arc<AtomicUsize>,
    }

    impl Work for Scripted {
        fn execute(&self, _ctx: &RunContext) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.failure {
                Some(message) => Err(anyhow!(message)),
                None => Ok(()),
            }
        }
    }

    /// (name, optional, failure message) per task.
    type Script = Vec<(&'static str, bool, Option<&'static str>)>;

    struct Harness {
        orchestrator: Orchestrator,
        calls: Arc<AtomicUsize>,
    }

    impl Harness {
        fn new(install: Script, uninstall: Script) -> Self {
            let calls = Arc::new(AtomicUsize::new(0));
            let counter = Arc::clone(&calls);
            let orchestrator = Orchestrator::with_planner(move |mode| {
                let script = match mode {
                    Mode::Install => &install,
                    Mode::Uninstall => &uninstall,
                };
                script
                    .iter()
                    .map(|(name, optional, failure)| {
                        Task::new(
                            *name,
                            format!("running {name}"),
                            *optional,
                            Arc::new(Scripted {
                                failure: *failure,
                                calls: Arc::clone(&counter),
                            }),
                        )
                    })
                    .collect()
            });
            Self {
                orchestrator,
                calls,
            }
        }

        /// Feeds `event` and executes every requested task inline until the
        /// queue drains, checking the pipeline invariants after each step.
        fn run(&mut self, event: Event) -> Vec<Effect> {
            let ctx = RunContext {
                repo_root: PathBuf::from("/src"),
                prefix: PathBuf::from("/usr/local/bin"),
                profile: "release".to_string(),
            };
            let mut queue = VecDeque::from([event]);
            let mut leftovers = Vec::new();
            while let Some(event) = queue.pop_front() {
                let effects = self.orchestrator.reduce(event).expect("reduce");
                assert_invariants(&self.orchestrator);
                assert!(effects.len() <= 1, "more than one effect per event");
                for effect in effects {
                    match effect {
                        Effect::Execute(request) => {
                            assert!(
                                queue.is_empty(),
                                "second request while one is outstanding"
                            );
                            let result = request.work.execute(&ctx).map_err(|err| err.to_string());
                            queue.push_back(Event::TaskCompleted {
                                index: request.index,
                                result,
                            });
                        }
                        other => leftovers.push(other),
                    }
                }
            }
            leftovers
        }

        fn statuses(&self) -> Vec<TaskStatus> {
            self.orchestrator
                .tasks()
                .iter()
                .map(|task| task.status())
                .collect()
        }
    }

    fn assert_invariants(orchestrator: &Orchestrator) {
        let running = orchestrator
            .tasks()
            .iter()
            .filter(|task| task.status() == TaskStatus::Running)
            .count();
        match orchestrator.phase() {
            Phase::Running => {
                assert_eq!(running, 1);
                let active = orchestrator.active_index().expect("active index");
                for (index, task) in orchestrator.tasks().iter().enumerate() {
                    if index < active {
                        assert!(task.status().is_resolved());
                    } else if index > active {
                        assert_eq!(task.status(), TaskStatus::Pending);
                    }
                }
            }
            Phase::Selecting | Phase::Finished => {
                assert_eq!(running, 0);
                assert_eq!(orchestrator.active_index(), None);
            }
        }
    }

    fn install_script(failure_at: Option<(usize, &'static str)>) -> Script {
        let names = [
            "Check privileges",
            "Build hoist",
            "Build hoistctl",
            "Install hoist",
            "Install hoistctl",
        ];
        names
            .iter()
            .enumerate()
            .map(|(index, name)| {
                let failure = failure_at
                    .filter(|(at, _)| *at == index)
                    .map(|(_, message)| message);
                (*name, false, failure)
            })
            .collect()
    }

    fn uninstall_script(first: Option<&'static str>, second: Option<&'static str>) -> Script {
        vec![
            ("Check privileges", false, None),
            ("Remove hoist", true, first),
            ("Remove hoistctl", true, second),
        ]
    }

    #[test]
    fn starts_in_selecting_with_install() {
        let orchestrator = Orchestrator::new(BinaryPair::default());
        assert_eq!(orchestrator.phase(), Phase::Selecting);
        assert_eq!(orchestrator.selected_mode(), Mode::Install);
        assert!(orchestrator.tasks().is_empty());
        assert!(orchestrator.errors().is_empty());
        assert_eq!(orchestrator.outcome(), None);
    }

    #[test]
    fn selection_is_clamped() {
        let mut orchestrator = Orchestrator::new(BinaryPair::default());
        orchestrator
            .reduce(Event::SelectionMoved(Direction::Up))
            .expect("reduce");
        assert_eq!(orchestrator.selected_mode(), Mode::Install);
        orchestrator
            .reduce(Event::SelectionMoved(Direction::Down))
            .expect("reduce");
        orchestrator
            .reduce(Event::SelectionMoved(Direction::Down))
            .expect("reduce");
        assert_eq!(orchestrator.selected_mode(), Mode::Uninstall);
        orchestrator
            .reduce(Event::SelectionMoved(Direction::Up))
            .expect("reduce");
        assert_eq!(orchestrator.selected_mode(), Mode::Install);
    }

    #[test]
    fn confirm_requests_exactly_the_first_task() {
        let mut orchestrator = Orchestrator::new(BinaryPair::default());
        let effects = orchestrator.reduce(Event::Confirmed).expect("reduce");
        assert_eq!(orchestrator.phase(), Phase::Running);
        assert_eq!(orchestrator.active_index(), Some(0));
        assert_eq!(orchestrator.tasks().len(), 5);
        assert_eq!(orchestrator.tasks()[0].status(), TaskStatus::Running);
        match effects.as_slice() {
            [Effect::Execute(request)] => {
                assert_eq!(request.index, 0);
                assert_eq!(request.name, "Check privileges");
            }
            other => panic!("unexpected effects: {other:?}"),
        }
        assert_invariants(&orchestrator);
    }

    #[test]
    fn install_all_succeed() {
        let mut harness = Harness::new(install_script(None), Vec::new());
        harness.run(Event::Confirmed);

        let orchestrator = &harness.orchestrator;
        assert_eq!(orchestrator.phase(), Phase::Finished);
        assert_eq!(harness.statuses(), vec![TaskStatus::Complete; 5]);
        assert!(orchestrator.errors().is_empty());
        assert_eq!(orchestrator.outcome(), Some(Outcome::Success));
        assert_eq!(harness.calls.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn privilege_failure_halts_install() {
        let mut harness = Harness::new(
            install_script(Some((0, "installer must be run with sudo or as root"))),
            Vec::new(),
        );
        harness.run(Event::Confirmed);

        let orchestrator = &harness.orchestrator;
        assert_eq!(orchestrator.phase(), Phase::Finished);
        assert_eq!(
            harness.statuses(),
            [
                TaskStatus::Failed,
                TaskStatus::Pending,
                TaskStatus::Pending,
                TaskStatus::Pending,
                TaskStatus::Pending,
            ]
        );
        assert_eq!(
            orchestrator.errors(),
            [ErrorRecord {
                task: "Check privileges".to_string(),
                message: "installer must be run with sudo or as root".to_string(),
                fatal: true,
            }]
        );
        assert_eq!(orchestrator.outcome(), Some(Outcome::Failed));
        assert_eq!(harness.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn fatal_failure_mid_pipeline_leaves_rest_pending() {
        let mut harness = Harness::new(install_script(Some((2, "cargo exited 101"))), Vec::new());
        harness.run(Event::Confirmed);

        assert_eq!(
            harness.statuses(),
            [
                TaskStatus::Complete,
                TaskStatus::Complete,
                TaskStatus::Failed,
                TaskStatus::Pending,
                TaskStatus::Pending,
            ]
        );
        assert_eq!(harness.orchestrator.errors().len(), 1);
        assert_eq!(harness.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn uninstall_skips_missing_binary_and_continues() {
        let mut harness = Harness::new(Vec::new(), uninstall_script(Some("not found"), None));
        harness
            .orchestrator
            .reduce(Event::SelectionMoved(Direction::Down))
            .expect("reduce");
        harness.run(Event::Confirmed);

        let orchestrator = &harness.orchestrator;
        assert_eq!(
            harness.statuses(),
            [
                TaskStatus::Complete,
                TaskStatus::Skipped,
                TaskStatus::Complete,
            ]
        );
        assert_eq!(
            orchestrator.errors(),
            [ErrorRecord {
                task: "Remove hoist".to_string(),
                message: "not found".to_string(),
                fatal: false,
            }]
        );
        assert_eq!(orchestrator.outcome(), Some(Outcome::CompletedWithCaveats));
    }

    #[test]
    fn repeated_uninstall_is_safe() {
        let mut harness = Harness::new(
            Vec::new(),
            uninstall_script(Some("not found"), Some("not found")),
        );
        harness
            .orchestrator
            .reduce(Event::SelectionMoved(Direction::Down))
            .expect("reduce");
        harness.run(Event::Confirmed);

        let orchestrator = &harness.orchestrator;
        assert_eq!(
            harness.statuses(),
            [
                TaskStatus::Complete,
                TaskStatus::Skipped,
                TaskStatus::Skipped,
            ]
        );
        assert_eq!(orchestrator.errors().len(), 2);
        assert!(orchestrator.errors().iter().all(|record| !record.fatal));
        assert_eq!(orchestrator.outcome(), Some(Outcome::CompletedWithCaveats));
    }

    #[test]
    fn skipped_last_task_finishes_run() {
        let mut harness = Harness::new(Vec::new(), uninstall_script(None, Some("not found")));
        harness
            .orchestrator
            .reduce(Event::SelectionMoved(Direction::Down))
            .expect("reduce");
        harness.run(Event::Confirmed);
        assert_eq!(harness.orchestrator.phase(), Phase::Finished);
        assert_eq!(harness.statuses()[2], TaskStatus::Skipped);
    }

    #[test]
    fn cancel_is_dropped_while_running() {
        let mut orchestrator = Orchestrator::new(BinaryPair::default());
        orchestrator.reduce(Event::Confirmed).expect("reduce");

        let effects = orchestrator.reduce(Event::CancelRequested).expect("reduce");
        assert!(effects.is_empty());
        assert_eq!(orchestrator.phase(), Phase::Running);
        assert_eq!(orchestrator.active_index(), Some(0));
    }

    #[test]
    fn cancel_exits_outside_running() {
        let mut orchestrator = Orchestrator::new(BinaryPair::default());
        let effects = orchestrator.reduce(Event::CancelRequested).expect("reduce");
        assert!(matches!(effects.as_slice(), [Effect::Exit]));

        let mut harness = Harness::new(install_script(Some((0, "denied"))), Vec::new());
        harness.run(Event::Confirmed);
        let leftovers = harness.run(Event::CancelRequested);
        assert!(matches!(leftovers.as_slice(), [Effect::Exit]));
    }

    #[test]
    fn confirm_after_finish_exits() {
        let mut harness = Harness::new(install_script(None), Vec::new());
        harness.run(Event::Confirmed);
        let leftovers = harness.run(Event::Confirmed);
        assert!(matches!(leftovers.as_slice(), [Effect::Exit]));
        assert_eq!(harness.orchestrator.phase(), Phase::Finished);
    }

    #[test]
    fn completion_for_wrong_index_is_rejected() {
        let mut orchestrator = Orchestrator::new(BinaryPair::default());
        orchestrator.reduce(Event::Confirmed).expect("reduce");

        let err = orchestrator
            .reduce(Event::TaskCompleted {
                index: 1,
                result: Ok(()),
            })
            .unwrap_err();
        assert_eq!(
            err,
            OrchestratorError::UnexpectedCompletion {
                index: 1,
                active: 0
            }
        );
        assert_eq!(orchestrator.tasks()[0].status(), TaskStatus::Running);
        assert_eq!(orchestrator.tasks()[1].status(), TaskStatus::Pending);
        assert_invariants(&orchestrator);
    }

    #[test]
    fn completion_outside_running_is_rejected() {
        let mut orchestrator = Orchestrator::new(BinaryPair::default());
        let err = orchestrator
            .reduce(Event::TaskCompleted {
                index: 0,
                result: Ok(()),
            })
            .unwrap_err();
        assert_eq!(err, OrchestratorError::NoActiveTask { index: 0 });

        let mut harness = Harness::new(install_script(Some((0, "denied"))), Vec::new());
        harness.run(Event::Confirmed);
        let err = harness
            .orchestrator
            .reduce(Event::TaskCompleted {
                index: 0,
                result: Ok(()),
            })
            .unwrap_err();
        assert_eq!(err, OrchestratorError::NoActiveTask { index: 0 });
        assert_eq!(harness.orchestrator.tasks()[0].status(), TaskStatus::Failed);
    }

    #[test]
    fn restart_builds_a_fresh_pipeline() {
        let mut harness = Harness::new(
            install_script(Some((0, "denied"))),
            uninstall_script(None, None),
        );
        harness.run(Event::Confirmed);
        assert_eq!(harness.orchestrator.errors().len(), 1);

        harness.run(Event::RestartRequested);
        assert_eq!(harness.orchestrator.phase(), Phase::Selecting);
        assert!(harness.orchestrator.tasks().is_empty());
        assert!(harness.orchestrator.errors().is_empty());

        harness
            .orchestrator
            .reduce(Event::SelectionMoved(Direction::Down))
            .expect("reduce");
        harness.run(Event::Confirmed);
        assert_eq!(harness.statuses(), vec![TaskStatus::Complete; 3]);
        assert_eq!(harness.orchestrator.outcome(), Some(Outcome::Success));
    }

    #[test]
    fn restart_is_ignored_before_finish() {
        let mut orchestrator = Orchestrator::new(BinaryPair::default());
        orchestrator.reduce(Event::Confirmed).expect("reduce");
        orchestrator
            .reduce(Event::RestartRequested)
            .expect("reduce");
        assert_eq!(orchestrator.phase(), Phase::Running);
        assert_eq!(orchestrator.tasks().len(), 5);
    }

    #[test]
    fn ticks_only_animate_while_running() {
        let mut orchestrator = Orchestrator::new(BinaryPair::default());
        orchestrator.reduce(Event::Tick).expect("reduce");
        assert_eq!(orchestrator.frame(), 0);

        orchestrator.reduce(Event::Confirmed).expect("reduce");
        orchestrator.reduce(Event::Tick).expect("reduce");
        orchestrator.reduce(Event::Tick).expect("reduce");
        assert_eq!(orchestrator.frame(), 2);
    }

    #[test]
    fn selection_is_frozen_while_running() {
        let mut orchestrator = Orchestrator::new(BinaryPair::default());
        orchestrator.reduce(Event::Confirmed).expect("reduce");
        orchestrator
            .reduce(Event::SelectionMoved(Direction::Down))
            .expect("reduce");
        assert_eq!(orchestrator.selected_mode(), Mode::Install);
        assert!(orchestrator
            .reduce(Event::Confirmed)
            .expect("reduce")
            .is_empty());
    }

    #[test]
    fn empty_pipeline_finishes_immediately() {
        let mut harness = Harness::new(Vec::new(), Vec::new());
        let leftovers = harness.run(Event::Confirmed);
        assert!(leftovers.is_empty());
        assert_eq!(harness.orchestrator.phase(), Phase::Finished);
        assert_eq!(harness.orchestrator.outcome(), Some(Outcome::Success));
    }
}
