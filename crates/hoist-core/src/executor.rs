//! Off-loop execution of scheduled tasks.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::actions::RunContext;
use crate::orchestrator::{Event, ExecutionRequest};

/// Result of one task, reported back through the frontend's event queue.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TaskCompletion {
    pub index: usize,
    pub result: Result<(), String>,
}

impl From<TaskCompletion> for Event {
    fn from(completion: TaskCompletion) -> Self {
        Event::TaskCompleted {
            index: completion.index,
            result: completion.result,
        }
    }
}

/// Run `request` on its own thread and hand the outcome to `report`.
///
/// The event loop never waits on the returned handle; a panicking task is
/// reported as a failure so the run cannot stall.
pub fn dispatch<F>(request: ExecutionRequest, ctx: Arc<RunContext>, report: F) -> JoinHandle<()>
where
    F: FnOnce(TaskCompletion) + Send + 'static,
{
    thread::spawn(move || {
        let ExecutionRequest { index, name, work } = request;
        let result = match panic::catch_unwind(AssertUnwindSafe(|| work.execute(&ctx))) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(format!("{:#}", err)),
            Err(payload) => Err(panic_message(payload.as_ref())),
        };
        if let Err(message) = &result {
            tracing::debug!(index, task = %name, %message, "task reported failure");
        }
        report(TaskCompletion { index, result });
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    let detail = if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    };
    format!("task panicked: {}", detail)
}
