//! Frontend state: the orchestrator plus the log pane it does not own.

use std::sync::Arc;

use hoist_core::{
    Config, Effect, Event, Orchestrator, OrchestratorError, Phase, RunContext, Summary,
};

// Bound log memory usage by trimming old entries.
const MAX_LOG_LINES: usize = 200;

pub struct App {
    pub orchestrator: Orchestrator,
    pub config: Config,
    pub ctx: Arc<RunContext>,
    pub logs: Vec<String>,
}

impl App {
    pub fn new(config: Config, ctx: Arc<RunContext>) -> Self {
        Self {
            orchestrator: Orchestrator::new(config.binaries.clone()),
            config,
            ctx,
            logs: Vec::new(),
        }
    }

    /// Forward an event to the orchestrator, starting a fresh log for each new run.
    pub fn handle(&mut self, event: Event) -> Result<Vec<Effect>, OrchestratorError> {
        let before = self.orchestrator.phase();
        let effects = self.orchestrator.reduce(event)?;
        if before != Phase::Running && self.orchestrator.phase() == Phase::Running {
            self.logs.clear();
        }
        Ok(effects)
    }

    pub fn push_log(&mut self, line: String) {
        self.logs.push(line);
        if self.logs.len() > MAX_LOG_LINES {
            let excess = self.logs.len() - MAX_LOG_LINES;
            self.logs.drain(0..excess);
        }
    }

    pub fn summary(&self) -> Option<Summary> {
        Summary::from_run(&self.orchestrator, &self.ctx.prefix)
    }
}
