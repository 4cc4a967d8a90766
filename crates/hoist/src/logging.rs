//! Tracing setup that routes formatted events into the log pane.
//!
//! The terminal is owned by ratatui while the installer runs, so log output
//! travels through the UI channel instead of stderr.

use std::io;
use std::sync::mpsc::Sender;

use hoist_core::Config;
use tracing_subscriber::EnvFilter;

use crate::events::UiMessage;

pub fn init_tracing(config: &Config, ui_tx: Sender<UiMessage>) {
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
        .with_writer(move || PaneWriter::new(ui_tx.clone()))
        .with_ansi(false)
        .with_target(false)
        .without_time()
        .init();
}

/// Buffers one formatted event and sends its lines when dropped.
struct PaneWriter {
    tx: Sender<UiMessage>,
    buffer: Vec<u8>,
}

impl PaneWriter {
    fn new(tx: Sender<UiMessage>) -> Self {
        Self {
            tx,
            buffer: Vec::new(),
        }
    }
}

impl io::Write for PaneWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for PaneWriter {
    fn drop(&mut self) {
        let text = String::from_utf8_lossy(&self.buffer);
        for line in text.lines().map(str::trim_end) {
            if line.trim().is_empty() {
                continue;
            }
            // Receiver is gone once the UI loop exits.
            let _ = self.tx.send(UiMessage::Log(line.trim_start().to_string()));
        }
    }
}
