//! Cargo build step for one installable binary.

use std::process::Command;

use anyhow::Result;

use crate::config::BinarySpec;

use super::{run_command, RunContext, Work};

#[derive(Debug)]
pub struct BuildBinary {
    pub spec: BinarySpec,
}

impl BuildBinary {
    pub fn new(spec: BinarySpec) -> Self {
        Self { spec }
    }

    pub(crate) fn command(&self, ctx: &RunContext) -> Command {
        let mut build = Command::new("cargo");
        build.arg("build");
        match ctx.profile.as_str() {
            "release" => {
                build.arg("--release");
            }
            // `debug` is the directory name of the default `dev` profile.
            "dev" | "debug" => {}
            custom => {
                build.args(["--profile", custom]);
            }
        }
        build.args([
            "-p",
            self.spec.package.as_str(),
            "--bin",
            self.spec.name.as_str(),
        ]);
        build
    }
}

impl Work for BuildBinary {
    fn execute(&self, ctx: &RunContext) -> Result<()> {
        tracing::info!(binary = %self.spec.name, profile = %ctx.profile, "building");
        let label = format!(
            "cargo build -p {} --bin {}",
            self.spec.package, self.spec.name
        );
        run_command(&label, self.command(ctx), Some(&ctx.repo_root))
    }
}
