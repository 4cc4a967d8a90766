//! Core types, work units, and the run state machine for the hoist installer.

pub mod actions;
pub mod config;
pub mod executor;
pub mod model;
pub mod orchestrator;
pub mod paths;
pub mod pipeline;
pub mod summary;

pub use actions::{RunContext, Work};
pub use config::*;
pub use executor::{dispatch, TaskCompletion};
pub use model::*;
pub use orchestrator::{Effect, Event, ExecutionRequest, Orchestrator, OrchestratorError};
pub use summary::Summary;
