//! Configuration for the session store.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default time-to-live after a session's last update.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5);

/// Default interval between background sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Longest TTL the store honours (100 years). Longer values are clamped so
/// expiry instants stay representable.
pub const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// How lookups treat a session whose TTL has elapsed but which the sweeper
/// has not removed yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpiryPolicy {
    /// A session is found until the sweeper physically removes it.
    ///
    /// Observable lifetime is `[ttl, ttl + sweep_interval]` after the last
    /// update.
    #[default]
    Physical,

    /// Lookups also compare the expiry instant against the clock, so a
    /// session is gone exactly `ttl` after its last update. Expired entries
    /// found this way are removed on the spot.
    Logical,
}

/// Configuration for the session store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Time-to-live after the last create or update.
    pub ttl: Duration,

    /// Interval between background sweeps.
    pub sweep_interval: Duration,

    /// Treatment of expired-but-not-yet-swept sessions.
    pub expiry: ExpiryPolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            expiry: ExpiryPolicy::default(),
        }
    }
}

impl StoreConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a configuration from any settings provider.
    pub fn from_settings<C: HasStoreConfig>(settings: &C) -> Self {
        Self {
            ttl: settings.session_ttl(),
            sweep_interval: settings.sweep_interval(),
            expiry: settings.expiry_policy(),
        }
    }

    /// Set the session TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the sweep interval.
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Set the expiry policy.
    pub fn with_expiry(mut self, expiry: ExpiryPolicy) -> Self {
        self.expiry = expiry;
        self
    }
}

/// Session store settings supplied by an external configuration source.
///
/// Lets a config crate hand its values to the store without the store
/// depending on the config format.
pub trait HasStoreConfig {
    /// Time-to-live after the last create or update.
    fn session_ttl(&self) -> Duration;

    /// Interval between background sweeps.
    fn sweep_interval(&self) -> Duration;

    /// Treatment of expired-but-not-yet-swept sessions.
    fn expiry_policy(&self) -> ExpiryPolicy {
        ExpiryPolicy::Physical
    }
}
