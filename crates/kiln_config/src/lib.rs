//! Parsing and validation of `kiln.toml` configuration files.
//!
//! This crate reads the build configuration and produces a strongly-typed
//! [`KilnConfig`]: the change tracking switch, history location, diagnostic
//! threshold, and the declared units of work with their input and output
//! file sets.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE};
pub use resolve::{resolve_work, ResolvedWork};
pub use types::*;
