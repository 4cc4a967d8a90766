//! Configuration types and defaults for hoist.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level configuration loaded from hoist.toml.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    /// Directory the binaries are installed into.
    pub prefix: PathBuf,
    /// Cargo profile used for builds; see `RunContext::artifact_dir` for where artifacts land.
    pub profile: String,
    pub binaries: BinaryPair,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: None,
            prefix: PathBuf::from("/usr/local/bin"),
            profile: "release".to_string(),
            binaries: BinaryPair::default(),
        }
    }
}

/// The two binaries a run builds and installs, in pipeline order.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct BinaryPair {
    pub first: BinarySpec,
    pub second: BinarySpec,
}

impl BinaryPair {
    pub fn iter(&self) -> impl Iterator<Item = &BinarySpec> {
        [&self.first, &self.second].into_iter()
    }
}

impl Default for BinaryPair {
    fn default() -> Self {
        Self {
            first: BinarySpec::new("hoist", "hoist"),
            second: BinarySpec::new("hoistctl", "hoistctl"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct BinarySpec {
    /// Binary target name, also the installed file name.
    pub name: String,
    /// Cargo package that owns the binary target.
    pub package: String,
}

impl BinarySpec {
    pub fn new(name: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package: package.into(),
        }
    }
}
