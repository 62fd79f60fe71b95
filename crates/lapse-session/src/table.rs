//! The guarded session table.
//!
//! Every read, write and scan of the table happens under one mutex. Existence
//! checks are never split from the mutation they guard.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

use crate::config::{ExpiryPolicy, MAX_TTL};
use crate::error::{Error, Result};
use crate::id::{IdGenerationError, SessionId};

/// Opaque session payload. The store never inspects it.
pub type SessionData = serde_json::Map<String, serde_json::Value>;

/// A stored session record.
#[derive(Debug, Clone)]
struct Session {
    data: SessionData,
    expires_at: Instant,
}

impl Session {
    fn is_expired_at(&self, now: Instant) -> bool {
        self.expires_at <= now
    }
}

/// Session records keyed by identifier, behind a single lock.
#[derive(Debug)]
pub(crate) struct SessionTable {
    sessions: Mutex<HashMap<SessionId, Session>>,
    ttl: Duration,
    expiry: ExpiryPolicy,
}

impl SessionTable {
    pub(crate) fn new(ttl: Duration, expiry: ExpiryPolicy) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl: ttl.min(MAX_TTL),
            expiry,
        }
    }

    /// Insert a fresh session with empty data.
    ///
    /// An identifier that is already live is rejected rather than clobbering
    /// another caller's session.
    pub(crate) fn insert(&self, id: SessionId) -> Result<()> {
        let mut sessions = self.sessions.lock();
        let now = Instant::now();

        if let Some(existing) = sessions.get(&id)
            && !existing.is_expired_at(now)
        {
            return Err(Error::IdGeneration(IdGenerationError::new(format!(
                "generator returned an identifier already in use: {id}"
            ))));
        }

        sessions.insert(
            id,
            Session {
                data: SessionData::new(),
                expires_at: self.expiry_from(now),
            },
        );
        Ok(())
    }

    /// Copy out a session's data. Does not extend its TTL.
    pub(crate) fn get(&self, id: &SessionId) -> Result<SessionData> {
        let mut sessions = self.sessions.lock();
        let now = Instant::now();

        match sessions.get(id) {
            Some(session) if self.is_live(session, now) => Ok(session.data.clone()),
            Some(_) => {
                sessions.remove(id);
                Err(Error::NotFound(id.clone()))
            }
            None => Err(Error::NotFound(id.clone())),
        }
    }

    /// Replace a session's data and reset its TTL.
    pub(crate) fn update(&self, id: &SessionId, data: SessionData) -> Result<()> {
        let mut sessions = self.sessions.lock();
        let now = Instant::now();

        match sessions.get_mut(id) {
            Some(session) if self.is_live(session, now) => {
                session.data = data;
                session.expires_at = self.expiry_from(now);
                Ok(())
            }
            Some(_) => {
                sessions.remove(id);
                Err(Error::NotFound(id.clone()))
            }
            None => Err(Error::NotFound(id.clone())),
        }
    }

    pub(crate) fn contains(&self, id: &SessionId) -> bool {
        let sessions = self.sessions.lock();
        sessions
            .get(id)
            .is_some_and(|session| self.is_live(session, Instant::now()))
    }

    /// Remove every session whose expiry instant is at or before now.
    /// Returns the number removed.
    pub(crate) fn sweep(&self) -> usize {
        let mut sessions = self.sessions.lock();
        let now = Instant::now();
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired_at(now));
        before - sessions.len()
    }

    /// Number of physically present sessions, expired or not.
    pub(crate) fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub(crate) fn ttl(&self) -> Duration {
        self.ttl
    }

    pub(crate) fn expiry(&self) -> ExpiryPolicy {
        self.expiry
    }

    /// Expiry instant for a session touched at `now`. Saturates at `MAX_TTL`
    /// when the platform clock cannot represent `now + ttl`.
    fn expiry_from(&self, now: Instant) -> Instant {
        now.checked_add(self.ttl)
            .or_else(|| now.checked_add(MAX_TTL))
            .unwrap_or(now)
    }

    fn is_live(&self, session: &Session, now: Instant) -> bool {
        match self.expiry {
            ExpiryPolicy::Physical => true,
            ExpiryPolicy::Logical => !session.is_expired_at(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(key: &str, value: serde_json::Value) -> SessionData {
        let mut data = SessionData::new();
        data.insert(key.to_string(), value);
        data
    }

    #[tokio::test(start_paused = true)]
    async fn test_insert_starts_empty() {
        let table = SessionTable::new(Duration::from_secs(5), ExpiryPolicy::Physical);
        let id = SessionId::from("s1");
        table.insert(id.clone()).unwrap();

        assert!(table.get(&id).unwrap().is_empty());
        assert_eq!(table.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_insert_rejects_live_duplicate() {
        let table = SessionTable::new(Duration::from_secs(5), ExpiryPolicy::Physical);
        let id = SessionId::from("s1");
        table.insert(id.clone()).unwrap();
        table.update(&id, data("user", json!("ada"))).unwrap();

        let result = table.insert(id.clone());
        assert!(matches!(result, Err(Error::IdGeneration(_))));
        // Original session untouched
        assert_eq!(table.get(&id).unwrap(), data("user", json!("ada")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_missing_is_not_found() {
        let table = SessionTable::new(Duration::from_secs(5), ExpiryPolicy::Physical);
        let id = SessionId::from("ghost");

        let result = table.update(&id, data("k", json!(1)));
        assert!(matches!(result, Err(Error::NotFound(ref missing)) if *missing == id));
        assert_eq!(table.len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_removes_only_expired() {
        let table = SessionTable::new(Duration::from_secs(5), ExpiryPolicy::Physical);
        table.insert(SessionId::from("old")).unwrap();

        tokio::time::advance(Duration::from_secs(3)).await;
        table.insert(SessionId::from("new")).unwrap();

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(table.sweep(), 1);
        assert!(!table.contains(&SessionId::from("old")));
        assert!(table.contains(&SessionId::from("new")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_physical_policy_finds_expired_until_swept() {
        let table = SessionTable::new(Duration::from_secs(5), ExpiryPolicy::Physical);
        let id = SessionId::from("s1");
        table.insert(id.clone()).unwrap();

        tokio::time::advance(Duration::from_secs(6)).await;
        assert!(table.get(&id).is_ok());

        table.sweep();
        assert!(matches!(table.get(&id), Err(Error::NotFound(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_logical_policy_hides_expired() {
        let table = SessionTable::new(Duration::from_secs(5), ExpiryPolicy::Logical);
        let id = SessionId::from("s1");
        table.insert(id.clone()).unwrap();

        tokio::time::advance(Duration::from_millis(4900)).await;
        assert!(table.contains(&id));

        tokio::time::advance(Duration::from_millis(100)).await;
        assert!(!table.contains(&id));
        assert!(matches!(table.update(&id, SessionData::new()), Err(Error::NotFound(_))));
        // Removed on access
        assert_eq!(table.len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_ttl_is_clamped() {
        let table = SessionTable::new(Duration::from_secs(u64::MAX), ExpiryPolicy::Logical);
        let id = SessionId::from("s1");
        table.insert(id.clone()).unwrap();
        table.update(&id, data("k", json!(1))).unwrap();

        assert_eq!(table.ttl(), MAX_TTL);
        tokio::time::advance(Duration::from_secs(24 * 60 * 60)).await;
        assert!(table.contains(&id));
        assert_eq!(table.sweep(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_returns_copy() {
        let table = SessionTable::new(Duration::from_secs(5), ExpiryPolicy::Physical);
        let id = SessionId::from("s1");
        table.insert(id.clone()).unwrap();
        table.update(&id, data("website", json!("example.org"))).unwrap();

        let mut copy = table.get(&id).unwrap();
        copy.insert("website".to_string(), json!("changed"));

        assert_eq!(table.get(&id).unwrap(), data("website", json!("example.org")));
    }
}
