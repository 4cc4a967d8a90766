//! Planning for install and uninstall runs.
//!
//! Keeps the sequencing in one place: later steps rely on the side effects
//! of earlier ones (installs read the artifacts the build steps produced).

use std::sync::Arc;

use crate::actions::{BuildBinary, InstallBinary, PrivilegeCheck, RemoveBinary};
use crate::config::BinaryPair;
use crate::model::{Mode, Task};

pub fn build(mode: Mode, binaries: &BinaryPair) -> Vec<Task> {
    let mut tasks = vec![privilege_check()];
    match mode {
        Mode::Install => {
            tasks.extend(binaries.iter().map(|spec| {
                Task::new(
                    format!("Build {}", spec.name),
                    format!("Building {} from package {}", spec.name, spec.package),
                    false,
                    Arc::new(BuildBinary::new(spec.clone())),
                )
                .with_target(&spec.name)
            }));
            tasks.extend(binaries.iter().map(|spec| {
                Task::new(
                    format!("Install {}", spec.name),
                    format!("Copying {} into the install prefix", spec.name),
                    false,
                    Arc::new(InstallBinary::new(spec.clone())),
                )
                .with_target(&spec.name)
            }));
        }
        Mode::Uninstall => {
            // Missing binaries are expected here, so removal never halts the run.
            tasks.extend(binaries.iter().map(|spec| {
                Task::new(
                    format!("Remove {}", spec.name),
                    format!("Removing {} from the install prefix", spec.name),
                    true,
                    Arc::new(RemoveBinary::new(spec.clone())),
                )
                .with_target(&spec.name)
            }));
        }
    }
    tasks
}

/// Numbered, human-readable listing of the plan for `mode`.
pub fn describe(mode: Mode, binaries: &BinaryPair) -> Vec<String> {
    build(mode, binaries)
        .iter()
        .enumerate()
        .map(|(index, task)| {
            let suffix = if task.optional { " (optional)" } else { "" };
            format!("{}. {}{}", index + 1, task.name, suffix)
        })
        .collect()
}

fn privilege_check() -> Task {
    Task::new(
        "Check privileges",
        "Checking for root privileges",
        false,
        Arc::new(PrivilegeCheck),
    )
}
