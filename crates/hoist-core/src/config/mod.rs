//! Configuration module wiring for hoist.
//!
//! Keeps schema types separate from file loading and validation.

mod config_io;
mod config_types;

pub use config_io::{ConfigError, CONFIG_FILE_NAME};
pub use config_types::*;
