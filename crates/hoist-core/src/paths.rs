//! Repository root discovery for build steps.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};

use crate::config::CONFIG_FILE_NAME;

pub const REPO_ROOT_ENV: &str = "HOIST_REPO_ROOT";

/// Resolve the workspace to build from: explicit override, `$HOIST_REPO_ROOT`,
/// then the nearest ancestor of the current directory that looks like one.
pub fn find_repo_root(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(root) = explicit {
        if root.join("Cargo.toml").is_file() {
            return Ok(root.to_path_buf());
        }
        return Err(anyhow!("no Cargo.toml in {}", root.display()));
    }

    if let Ok(root) = env::var(REPO_ROOT_ENV) {
        let root_path = PathBuf::from(root);
        if is_hoist_repo(&root_path) {
            return Ok(root_path);
        }
    }

    let mut dir = env::current_dir()?;
    loop {
        if is_hoist_repo(&dir) {
            return Ok(dir);
        }
        if !dir.pop() {
            break;
        }
    }

    Err(anyhow!(
        "repository root not found (set {} or run from a workspace with {})",
        REPO_ROOT_ENV,
        CONFIG_FILE_NAME
    ))
}

fn is_hoist_repo(dir: &Path) -> bool {
    let cargo_toml = dir.join("Cargo.toml");
    if !cargo_toml.is_file() {
        return false;
    }
    if dir.join(CONFIG_FILE_NAME).is_file() {
        return true;
    }
    let Ok(contents) = fs::read_to_string(&cargo_toml) else {
        return false;
    };
    let markers = ["crates/hoist-core", "name = \"hoist-core\""];
    markers.iter().any(|marker| contents.contains(marker))
}
