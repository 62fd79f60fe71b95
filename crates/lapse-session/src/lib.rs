//! In-memory session store with TTL expiry.
//!
//! This crate provides a session table that:
//! - Hands out opaque session identifiers from a pluggable [`IdGenerator`]
//! - Stores an opaque JSON object per session, returned by copy
//! - Resets a session's TTL on every update (reads never refresh it)
//! - Runs a background sweeper that evicts expired sessions on a fixed cadence
//!
//! A session becomes unreachable no earlier than `ttl` and no later than
//! `ttl + sweep_interval` after its last update.
//!
//! # Example
//!
//! ```rust,ignore
//! use lapse_session::{SessionStore, StoreConfig};
//!
//! let store = SessionStore::new(StoreConfig::default())?;
//! let id = store.create()?;
//! store.update(&id, data)?;
//! let data = store.get(&id)?;
//! ```

mod config;
mod error;
mod id;
mod store;
mod sweep;
mod table;

pub use config::{
    DEFAULT_SWEEP_INTERVAL, DEFAULT_TTL, ExpiryPolicy, HasStoreConfig, MAX_TTL, StoreConfig,
};
pub use error::{Error, Result};
pub use id::{IdGenerationError, IdGenerator, SessionId, UuidGenerator};
pub use store::{SessionStore, StoreStats};
pub use table::SessionData;
