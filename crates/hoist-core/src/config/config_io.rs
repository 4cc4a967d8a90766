//! Configuration loading and validation.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::Config;

pub const CONFIG_FILE_NAME: &str = "hoist.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },
    #[error("failed to parse config: {0}")]
    ParseFailed(String),
    #[error("invalid binary name {0:?}: must be a non-empty file name")]
    InvalidBinary(String),
    #[error("binary {0:?} is listed twice")]
    DuplicateBinary(String),
    #[error("build profile must not be empty")]
    EmptyProfile,
}

impl Config {
    /// Load configuration from a specific path.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|err| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        let config = Self::parse(&contents)?;
        tracing::debug!(path = %path.display(), "configuration read");
        Ok(config)
    }

    /// Load `hoist.toml` from the repository root, falling back to built-in defaults.
    pub fn load_default(repo_root: &Path) -> Result<Self, ConfigError> {
        let path = Self::default_config_path(repo_root);
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from_path(&path)
    }

    /// Load an explicit config file when given, otherwise the repository default.
    pub fn load(explicit: Option<&Path>, repo_root: &Path) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load_from_path(path),
            None => Self::load_default(repo_root),
        }
    }

    pub fn default_config_path(repo_root: &Path) -> PathBuf {
        repo_root.join(CONFIG_FILE_NAME)
    }

    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let config: Config =
            toml::from_str(contents).map_err(|err| ConfigError::ParseFailed(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.profile.trim().is_empty() {
            return Err(ConfigError::EmptyProfile);
        }
        for binary in self.binaries.iter() {
            if !is_plain_file_name(&binary.name) {
                return Err(ConfigError::InvalidBinary(binary.name.clone()));
            }
            if binary.package.trim().is_empty() {
                return Err(ConfigError::InvalidBinary(binary.name.clone()));
            }
        }
        if self.binaries.first.name == self.binaries.second.name {
            return Err(ConfigError::DuplicateBinary(
                self.binaries.first.name.clone(),
            ));
        }
        Ok(())
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.trim().is_empty()
        && name != "."
        && name != ".."
        && !name.contains(std::path::MAIN_SEPARATOR)
        && !name.contains('/')
}
