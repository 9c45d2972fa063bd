//! Storage infrastructure: configuration file loading.
//!
//! The `config` sub-module handles:
//!
//! - Locating the TOML configuration file under the XDG config directory.
//! - Providing sensible defaults when the file does not exist yet.
//! - Validating values the daemon cannot run with.

pub mod config;
