//! Config file discovery and layered merging.
//!
//! Resolution order (later overrides earlier):
//! 1. `~/.config/lapse/config.toml` (user config)
//! 2. `./lapse.toml` (project-local)
//! 3. CLI arguments (handled externally)
//!
//! Layers are merged key by key before anything is validated, so a project
//! file may set a single field and inherit the rest from the user config.

use std::path::{Path, PathBuf};

use toml::{Table, Value};

use crate::{ConfigError, LapseConfig, Result};

/// Default config filename for project-local config.
const PROJECT_CONFIG_FILE: &str = "lapse.toml";

/// Default config filename within the user config directory.
const USER_CONFIG_FILE: &str = "config.toml";

/// Application name for config directory resolution.
const APP_NAME: &str = "lapse";

/// Environment variable to override the config directory.
const CONFIG_DIR_ENV: &str = "LAPSE_CONFIG_DIR";

/// Result of config discovery and loading.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The merged and validated configuration.
    pub config: LapseConfig,
    /// Files that contributed a layer, lowest precedence first.
    pub sources: Vec<PathBuf>,
}

/// Discover the user and project config files and merge them.
///
/// Missing files are skipped. A file that exists but cannot be read or
/// parsed is an error, as is a merged result that fails validation.
pub fn load_config() -> Result<LoadedConfig> {
    let mut candidates = Vec::new();
    if let Some(path) = user_config_path() {
        candidates.push(path);
    }
    candidates.push(PathBuf::from(PROJECT_CONFIG_FILE));

    load_layers(&candidates)
}

/// Load config from a specific file path (no discovery).
pub fn load_config_file(path: &Path) -> Result<LapseConfig> {
    into_config(read_table(path)?)
}

/// Get the user config directory for lapse.
///
/// Checks `LAPSE_CONFIG_DIR` first, then falls back to the platform default
/// (`~/.config/lapse` on Linux, `~/Library/Application Support/lapse` on macOS).
pub fn user_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV)
        && !dir.is_empty()
    {
        return Some(PathBuf::from(dir));
    }
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

fn user_config_path() -> Option<PathBuf> {
    user_config_dir().map(|d| d.join(USER_CONFIG_FILE))
}

/// Merge every existing file in `candidates`, in order, then validate once.
fn load_layers(candidates: &[PathBuf]) -> Result<LoadedConfig> {
    let mut merged = Table::new();
    let mut sources = Vec::new();

    for path in candidates {
        if !path.is_file() {
            continue;
        }
        merge_tables(&mut merged, read_table(path)?);
        sources.push(path.clone());
    }

    Ok(LoadedConfig {
        config: into_config(merged)?,
        sources,
    })
}

fn read_table(path: &Path) -> Result<Table> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;
    contents
        .parse::<Table>()
        .map_err(|e| ConfigError::ParseFile {
            path: path.display().to_string(),
            source: e,
        })
}

fn into_config(table: Table) -> Result<LapseConfig> {
    let config: LapseConfig = Value::Table(table).try_into()?;
    config.validate()?;
    Ok(config)
}

/// Overlay `overlay` onto `base`. Nested tables merge recursively; any other
/// value replaces what was there.
fn merge_tables(base: &mut Table, overlay: Table) {
    for (key, value) in overlay {
        match value {
            Value::Table(incoming) => match base.get_mut(&key) {
                Some(Value::Table(existing)) => merge_tables(existing, incoming),
                _ => {
                    base.insert(key, Value::Table(incoming));
                }
            },
            value => {
                base.insert(key, value);
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
