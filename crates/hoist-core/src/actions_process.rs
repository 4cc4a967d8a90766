//! Subprocess execution with line-by-line log streaming.

use std::io::{BufRead, BufReader};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;

use anyhow::{anyhow, Context, Result};

pub fn run_command(label: &str, mut command: Command, cwd: Option<&Path>) -> Result<()> {
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }

    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("command failed to start: {}", label))?;

    let stdout_handle = child
        .stdout
        .take()
        .map(|stream| thread::spawn(move || read_stream(stream)));
    let stderr_handle = child
        .stderr
        .take()
        .map(|stream| thread::spawn(move || read_stream(stream)));

    let status = child
        .wait()
        .with_context(|| format!("command failed to run: {}", label))?;

    if let Some(handle) = stdout_handle {
        let _ = handle.join();
    }
    if let Some(handle) = stderr_handle {
        let _ = handle.join();
    }

    if status.success() {
        Ok(())
    } else {
        Err(anyhow!("command failed: {} ({})", label, status))
    }
}

fn sanitize_log_line(line: &str) -> String {
    line.replace('\r', "")
}

fn read_stream(stream: impl std::io::Read) {
    let reader = BufReader::new(stream);
    for line in reader.lines().map_while(Result::ok) {
        tracing::info!(target: "hoist::command", "{}", sanitize_log_line(&line));
    }
}
