//! Configuration types.

use std::time::Duration;

use lapse_session::{ExpiryPolicy, HasStoreConfig, MAX_TTL};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Root configuration.
///
/// Maps to the full TOML config file. All sections are optional so that
/// partial configs (e.g., project-local overrides) can be layered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LapseConfig {
    /// Session store configuration.
    pub session: Option<SessionConfig>,

    /// CLI logging configuration.
    pub logging: Option<LoggingConfig>,
}

impl LapseConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(toml_str: &str) -> crate::Result<Self> {
        let config: LapseConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> crate::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Session settings, falling back to defaults when the section is absent.
    pub fn session(&self) -> SessionConfig {
        self.session.clone().unwrap_or_default()
    }

    /// Logging settings, falling back to defaults when the section is absent.
    pub fn logging(&self) -> LoggingConfig {
        self.logging.clone().unwrap_or_default()
    }

    /// Check that every present section holds usable values.
    pub fn validate(&self) -> crate::Result<()> {
        if let Some(ref session) = self.session {
            session.validate()?;
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Session store configuration.
///
/// ```toml
/// [session]
/// ttl_secs = 5
/// sweep_interval_secs = 1
/// expiry = "physical"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Seconds a session lives after its last create or update.
    pub ttl_secs: u64,
    /// Seconds between background sweeps.
    pub sweep_interval_secs: u64,
    /// `physical` (found until swept) or `logical` (gone exactly at TTL).
    pub expiry: ExpiryPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 5,
            sweep_interval_secs: 1,
            expiry: ExpiryPolicy::Physical,
        }
    }
}

impl SessionConfig {
    /// Check that both durations are non-zero and no longer than
    /// [`MAX_TTL`].
    pub fn validate(&self) -> crate::Result<()> {
        check_secs("session.ttl_secs", self.ttl_secs)?;
        check_secs("session.sweep_interval_secs", self.sweep_interval_secs)
    }
}

fn check_secs(field: &str, secs: u64) -> crate::Result<()> {
    let reason = if secs == 0 {
        "must be greater than zero".to_string()
    } else if secs > MAX_TTL.as_secs() {
        format!("must be at most {}", MAX_TTL.as_secs())
    } else {
        return Ok(());
    };
    Err(ConfigError::Invalid {
        field: field.to_string(),
        reason,
    })
}

impl HasStoreConfig for SessionConfig {
    fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    fn expiry_policy(&self) -> ExpiryPolicy {
        self.expiry
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Logging Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// CLI logging configuration.
///
/// ```toml
/// [logging]
/// filter = "lapse=debug,lapse_session=debug,info"
/// file = true
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Console `EnvFilter` directive. `None` uses the CLI's built-in default.
    pub filter: Option<String>,
    /// Also write JSON logs to a daily rolling file in the config directory.
    pub file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: None,
            file: true,
        }
    }
}
