//! Configuration system for lapse.
//!
//! Provides TOML-based configuration with:
//! - A `[session]` section for the store's TTL, sweep interval and expiry policy
//! - A `[logging]` section for the CLI's log filter and log file
//! - Config file layering (user config dir + project-local overrides)

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{LoadedConfig, load_config, load_config_file, user_config_dir};
pub use error::{ConfigError, Result};
pub use types::*;
