//! Installer work units and the shared context they run against.

#[path = "actions_build.rs"]
mod actions_build;
#[path = "actions_install.rs"]
mod actions_install;
#[path = "actions_privilege.rs"]
mod actions_privilege;
#[path = "actions_process.rs"]
mod actions_process;

use std::path::PathBuf;

use anyhow::Result;

use crate::config::Config;

pub use actions_build::BuildBinary;
pub use actions_install::{InstallBinary, RemoveBinary};
pub use actions_privilege::PrivilegeCheck;

pub(super) use actions_process::run_command;

/// A single fallible operation the orchestrator can schedule.
///
/// Implementations must not retain state between calls; each task runs its work
/// at most once per run.
pub trait Work: Send + Sync {
    fn execute(&self, ctx: &RunContext) -> Result<()>;
}

/// Immutable inputs shared by every task in a run.
#[derive(Clone, Debug)]
pub struct RunContext {
    pub repo_root: PathBuf,
    pub prefix: PathBuf,
    pub profile: String,
}

impl RunContext {
    pub fn new(repo_root: PathBuf, config: &Config) -> Self {
        Self {
            repo_root,
            prefix: config.prefix.clone(),
            profile: config.profile.clone(),
        }
    }

    /// Directory cargo writes artifacts to for the configured profile.
    ///
    /// The built-in `dev` and `test` profiles land in `target/debug`, `bench`
    /// in `target/release`; custom profiles use their own name.
    pub fn artifact_dir(&self) -> PathBuf {
        let dir = match self.profile.as_str() {
            "dev" | "test" | "debug" => "debug",
            "bench" | "release" => "release",
            custom => custom,
        };
        self.repo_root.join("target").join(dir)
    }
}
