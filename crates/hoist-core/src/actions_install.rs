//! Copy built binaries into the prefix and remove them again.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use anyhow::{anyhow, Context, Result};

use crate::config::BinarySpec;

use super::{RunContext, Work};

const BINARY_MODE: u32 = 0o755;

#[derive(Debug)]
pub struct InstallBinary {
    pub spec: BinarySpec,
}

impl InstallBinary {
    pub fn new(spec: BinarySpec) -> Self {
        Self { spec }
    }
}

impl Work for InstallBinary {
    fn execute(&self, ctx: &RunContext) -> Result<()> {
        fs::create_dir_all(&ctx.prefix).with_context(|| {
            format!(
                "failed to create install directory {}",
                ctx.prefix.display()
            )
        })?;

        let source = ctx.artifact_dir().join(&self.spec.name);
        let destination = ctx.prefix.join(&self.spec.name);
        copy_binary(&source, &destination)
    }
}

#[derive(Debug)]
pub struct RemoveBinary {
    pub spec: BinarySpec,
}

impl RemoveBinary {
    pub fn new(spec: BinarySpec) -> Self {
        Self { spec }
    }
}

impl Work for RemoveBinary {
    fn execute(&self, ctx: &RunContext) -> Result<()> {
        let path = ctx.prefix.join(&self.spec.name);
        // symlink_metadata so a dangling link still counts as installed.
        if fs::symlink_metadata(&path).is_err() {
            return Err(anyhow!("{} not found", path.display()));
        }
        fs::remove_file(&path).with_context(|| format!("failed to remove {}", path.display()))?;
        tracing::info!("Removed {}", path.display());
        Ok(())
    }
}

fn copy_binary(source: &Path, destination: &Path) -> Result<()> {
    if !source.is_file() {
        return Err(anyhow!("missing build artifact: {}", source.display()));
    }

    // Stage next to the destination and rename so a running binary is replaced, not rewritten.
    let file_name = destination
        .file_name()
        .unwrap_or_default()
        .to_string_lossy();
    let staged = destination.with_file_name(format!(".{}.hoist-new", file_name));
    let result = stage_and_replace(source, &staged, destination);
    if result.is_err() {
        let _ = fs::remove_file(&staged);
    }
    result?;

    tracing::info!("Installed {} -> {}", file_name, destination.display());
    Ok(())
}

fn stage_and_replace(source: &Path, staged: &Path, destination: &Path) -> Result<()> {
    fs::copy(source, staged).map_err(|err| {
        anyhow!(
            "failed to install {} -> {}: {}",
            source.display(),
            destination.display(),
            err
        )
    })?;
    fs::set_permissions(staged, fs::Permissions::from_mode(BINARY_MODE))
        .with_context(|| format!("failed to set permissions on {}", staged.display()))?;
    fs::rename(staged, destination)
        .with_context(|| format!("failed to replace {}", destination.display()))
}
