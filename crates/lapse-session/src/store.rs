//! Session store: the public face of the guarded table and its sweeper.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, trace};

use crate::config::{ExpiryPolicy, StoreConfig};
use crate::error::Result;
use crate::id::{IdGenerator, SessionId, UuidGenerator};
use crate::sweep::Sweeper;
use crate::table::{SessionData, SessionTable};

/// Concurrent in-memory session store with TTL expiry.
///
/// This store provides:
/// - Session creation with identifiers from an [`IdGenerator`]
/// - Copy-out reads that never extend a session's lifetime
/// - Updates that replace the data and reset the TTL atomically
/// - A background sweeper that removes expired sessions every
///   `sweep_interval`
///
/// Clones share the same table. The sweeper stops when [`shutdown`] is
/// called or the last clone is dropped.
///
/// [`shutdown`]: SessionStore::shutdown
pub struct SessionStore<G: IdGenerator = UuidGenerator> {
    table: Arc<SessionTable>,
    generator: Arc<G>,
    sweeper: Arc<Sweeper>,
    config: StoreConfig,
}

impl SessionStore<UuidGenerator> {
    /// Create a store that issues random UUID identifiers.
    ///
    /// Fails with [`Error::NoRuntime`](crate::Error::NoRuntime) outside a Tokio
    /// runtime.
    pub fn new(config: StoreConfig) -> Result<Self> {
        Self::with_generator(config, UuidGenerator)
    }
}

impl<G: IdGenerator> SessionStore<G> {
    /// Create a store with a custom identifier generator.
    ///
    /// Fails with [`Error::NoRuntime`](crate::Error::NoRuntime) outside a Tokio
    /// runtime.
    pub fn with_generator(config: StoreConfig, generator: G) -> Result<Self> {
        let table = Arc::new(SessionTable::new(config.ttl, config.expiry));
        let sweeper = Sweeper::spawn(Arc::clone(&table), config.sweep_interval)?;

        debug!(
            ttl_ms = u64::try_from(table.ttl().as_millis()).unwrap_or(u64::MAX),
            sweep_interval_ms = u64::try_from(config.sweep_interval.as_millis()).unwrap_or(u64::MAX),
            expiry = ?config.expiry,
            "Session store started"
        );

        Ok(Self {
            table,
            generator: Arc::new(generator),
            sweeper: Arc::new(sweeper),
            config,
        })
    }

    /// Get the store configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Create an empty session and return its identifier.
    ///
    /// A generator failure is returned as-is and leaves the table untouched.
    pub fn create(&self) -> Result<SessionId> {
        let id = SessionId::new(self.generator.generate()?);
        self.table.insert(id.clone())?;

        debug!(session_id = %id, "Session created");
        Ok(id)
    }

    /// Get a copy of a session's data.
    ///
    /// Reading does not extend the session's lifetime.
    pub fn get(&self, id: &SessionId) -> Result<SessionData> {
        let data = self.table.get(id)?;
        trace!(session_id = %id, "Session read");
        Ok(data)
    }

    /// Replace a session's data and restart its TTL.
    pub fn update(&self, id: &SessionId, data: SessionData) -> Result<()> {
        self.table.update(id, data)?;
        trace!(session_id = %id, "Session updated");
        Ok(())
    }

    /// Check whether a session is reachable, without copying its data.
    pub fn contains(&self, id: &SessionId) -> bool {
        self.table.contains(id)
    }

    /// Run one sweep now, in addition to the background schedule.
    ///
    /// Returns the number of sessions evicted.
    pub fn sweep(&self) -> usize {
        let evicted = self.table.sweep();
        if evicted > 0 {
            debug!(evicted = evicted, "Session sweep completed");
        }
        evicted
    }

    /// Number of sessions physically held, including expired sessions the
    /// sweeper has not reached yet.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Check if the store holds no sessions.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stop the background sweeper. Sessions are no longer evicted afterwards
    /// (unless [`sweep`](Self::sweep) is called by hand).
    pub fn shutdown(&self) {
        self.sweeper.stop();
    }

    /// Whether the background sweeper task is still alive.
    pub fn is_sweeping(&self) -> bool {
        self.sweeper.is_running()
    }

    /// Get store statistics.
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            sessions: self.table.len(),
            ttl: self.table.ttl(),
            sweep_interval: self.config.sweep_interval,
            expiry: self.table.expiry(),
        }
    }
}

impl<G: IdGenerator> Clone for SessionStore<G> {
    fn clone(&self) -> Self {
        Self {
            table: Arc::clone(&self.table),
            generator: Arc::clone(&self.generator),
            sweeper: Arc::clone(&self.sweeper),
            config: self.config.clone(),
        }
    }
}

/// Store statistics.
#[derive(Debug, Clone)]
pub struct StoreStats {
    /// Sessions physically held.
    pub sessions: usize,

    /// Configured time-to-live.
    pub ttl: Duration,

    /// Configured sweep interval.
    pub sweep_interval: Duration,

    /// Configured expiry policy.
    pub expiry: ExpiryPolicy,
}
