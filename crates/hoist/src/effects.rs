//! Turns reduced events into running work for the interactive loop.

use std::sync::mpsc::Sender;
use std::sync::Arc;

use anyhow::Result;
use hoist_core::{dispatch, Effect, Event};

use crate::app::App;
use crate::events::UiMessage;

/// Reduce one event and carry out its effects; returns true when the app should exit.
///
/// Task completions come back on `ui_tx` as [`UiMessage::Task`]. A completion the
/// orchestrator rejects is an error when `strict` is set, otherwise it is logged
/// and the loop keeps going.
pub fn apply_event(
    app: &mut App,
    ui_tx: &Sender<UiMessage>,
    event: Event,
    strict: bool,
) -> Result<bool> {
    let effects = match app.handle(event) {
        Ok(effects) => effects,
        Err(err) if strict => return Err(err.into()),
        Err(err) => {
            tracing::error!(%err, "ignoring out-of-sequence task completion");
            return Ok(false);
        }
    };

    for effect in effects {
        match effect {
            Effect::Execute(request) => {
                let ui_tx = ui_tx.clone();
                dispatch(request, Arc::clone(&app.ctx), move |completion| {
                    // Receiver is gone once the UI loop exits.
                    let _ = ui_tx.send(UiMessage::Task(completion));
                });
            }
            Effect::Exit => return Ok(true),
        }
    }
    Ok(false)
}
